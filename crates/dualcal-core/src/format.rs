//! Human readable and form-field renderings of due dates.
//!
//! None of these functions fail: an unparseable date comes back as the
//! input string (display helpers) or as an empty string (conversions used by
//! forms, where empty means "do not submit").

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::jalali::{GregorianDate, JalaliDate, persian_month_name, to_latin_digits, to_persian_digits};

pub const TODAY_TEXT: &str = "امروز";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Today,
    Overdue,
    Upcoming,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::Today => "today",
            DueStatus::Overdue => "overdue",
            DueStatus::Upcoming => "upcoming",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeDue {
    pub text: String,
    pub status: DueStatus,
}

/// Splits `Y-M-D` into three non-zero integers.
fn split_ymd(raw: &str) -> Option<(i32, u32, u32)> {
    let mut parts = raw.split('-');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() || year == 0 || month == 0 || day == 0 {
        return None;
    }
    Some((year, month, day))
}

/// Parses a Gregorian `YYYY-MM-DD`; `None` unless it names a real date on or
/// after 1600-01-01.
pub fn parse_iso_date(raw: &str) -> Option<GregorianDate> {
    let (year, month, day) = split_ymd(raw)?;
    let date = GregorianDate::new(year, month, day);
    date.is_valid().then_some(date)
}

/// Parses a Jalali `Y-MM-DD`, accepting Persian digits.
pub fn parse_jalali_date(raw: &str) -> Option<JalaliDate> {
    let (year, month, day) = split_ymd(&to_latin_digits(raw))?;
    let date = JalaliDate::new(year, month, day);
    date.is_valid().then_some(date)
}

/// `<day> <month name> <year>` in Persian digits.
pub fn format_jalali_label(date: JalaliDate) -> String {
    format!(
        "{} {} {}",
        to_persian_digits(date.day),
        persian_month_name(date.month),
        to_persian_digits(date.year)
    )
}

/// `<month name> <year>` in Persian digits, used as a month title.
pub fn format_jalali_month_title(year: i32, month: u32) -> String {
    format!("{} {}", persian_month_name(month), to_persian_digits(year))
}

pub fn format_jalali_date(iso: &str) -> String {
    match parse_iso_date(iso) {
        Some(date) => format_jalali_label(date.to_jalali()),
        None => iso.to_string(),
    }
}

/// Formats the date part of `YYYY-MM-DDTHH:MM:SS`.
pub fn format_jalali_date_time(iso: &str) -> String {
    if iso.is_empty() {
        return String::new();
    }
    let date_part = iso.split('T').next().unwrap_or(iso);
    format_jalali_date(date_part)
}

/// Gregorian ISO to the Jalali `Y-MM-DD` shown in editable fields.
pub fn iso_to_jalali_string(iso: &str) -> String {
    parse_iso_date(iso)
        .map(|date| date.to_jalali().key())
        .unwrap_or_default()
}

/// Jalali `Y-MM-DD` back to Gregorian ISO, or `""` when invalid.
pub fn jalali_to_iso_string(jalali: &str) -> String {
    parse_jalali_date(jalali)
        .and_then(|date| date.to_gregorian_checked())
        .map(|date| date.to_iso())
        .unwrap_or_default()
}

/// Gregorian ISO for a Jalali day, e.g. to pre-fill a new task's due date.
pub fn jalali_date_to_iso(date: JalaliDate) -> String {
    date.to_gregorian().to_iso()
}

pub fn relative_due_text(iso: &str, today: NaiveDate) -> RelativeDue {
    let Some(due) = parse_iso_date(iso).and_then(|date| date.to_naive()) else {
        return RelativeDue {
            text: String::new(),
            status: DueStatus::Upcoming,
        };
    };

    let diff_days = (due - today).num_days();
    if diff_days == 0 {
        RelativeDue {
            text: TODAY_TEXT.to_string(),
            status: DueStatus::Today,
        }
    } else if diff_days < 0 {
        RelativeDue {
            text: format!("{} روز پیش", to_persian_digits(diff_days.abs())),
            status: DueStatus::Overdue,
        }
    } else {
        RelativeDue {
            text: format!("{} روز مانده", to_persian_digits(diff_days)),
            status: DueStatus::Upcoming,
        }
    }
}
