use chrono::{
  NaiveDate,
  Utc
};
use chrono_tz::Tz;

use crate::jalali::JalaliDate;

pub const DEFAULT_REFERENCE_TIMEZONE:
  &str = "Asia/Tehran";

/// Source of "today" in the calendar's
/// reference timezone.
pub trait Clock {
  fn today(&self) -> NaiveDate;

  fn today_jalali(&self) -> JalaliDate {
    JalaliDate::from(self.today())
  }
}

#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
  timezone: Tz
}

impl ZonedClock {
  pub fn new(timezone: Tz) -> Self {
    Self { timezone }
  }

  pub fn timezone(&self) -> Tz {
    self.timezone
  }
}

impl Default for ZonedClock {
  fn default() -> Self {
    Self::new(
      parse_timezone(
        DEFAULT_REFERENCE_TIMEZONE,
        "default"
      )
      .unwrap_or(chrono_tz::UTC)
    )
  }
}

impl Clock for ZonedClock {
  fn today(&self) -> NaiveDate {
    today_in_timezone(self.timezone)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate {
    self.0
  }
}

pub fn today_in_timezone(
  timezone: Tz
) -> NaiveDate {
  Utc::now()
    .with_timezone(&timezone)
    .date_naive()
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "resolved reference timezone"
      );
      Some(tz)
    }
    | Err(error) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %error,
        "invalid timezone id"
      );
      None
    }
  }
}
