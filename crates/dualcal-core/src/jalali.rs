//! Jalali (Persian solar Hijri) and Gregorian calendar arithmetic.
//!
//! The conversions count days from the proleptic Gregorian epoch
//! 1600-01-01 and the matching Jalali year 979. Inputs are assumed to be
//! in range (month 1-12, day within the month, Gregorian year >= 1600);
//! out-of-range components are folded arithmetically into some other date
//! rather than rejected. Use [`GregorianDate::is_valid`],
//! [`JalaliDate::is_valid`] or [`JalaliDate::to_gregorian_checked`] when the
//! input comes from a user.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const GREGORIAN_EPOCH_YEAR: i32 = 1600;
const JALALI_EPOCH_YEAR: i32 = 979;
/// Last Jalali year whose days all fall inside chrono's date range.
const JALALI_MAX_YEAR: i32 = 261_000;
/// Days between 1600-01-01 and 979-01-01 (Jalali).
const EPOCH_OFFSET_DAYS: i64 = 79;

const DAYS_PER_400_YEARS: i64 = 146_097;
const DAYS_PER_100_YEARS: i64 = 36_524;
const DAYS_PER_4_YEARS: i64 = 1_461;
const DAYS_PER_33_YEARS: i64 = 12_053;

const GREGORIAN_MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const JALALI_MONTH_DAYS: [u32; 12] = [31, 31, 31, 31, 31, 31, 30, 30, 30, 30, 30, 29];

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

const PERSIAN_MONTH_NAMES: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

const GREGORIAN_MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GregorianDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl GregorianDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// A real calendar date on or after the conversion epoch.
    pub fn is_valid(&self) -> bool {
        self.year >= GREGORIAN_EPOCH_YEAR && self.to_naive().is_some()
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn to_jalali(&self) -> JalaliDate {
        gregorian_to_jalali(self.year, self.month, self.day)
    }

    /// `YYYY-MM-DD`, zero padded.
    pub fn to_iso(&self) -> String {
        format!("{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for GregorianDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for GregorianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Components in range and the date survives a round trip through the
    /// Gregorian calendar unchanged.
    pub fn is_valid(&self) -> bool {
        if !(JALALI_EPOCH_YEAR..=JALALI_MAX_YEAR).contains(&self.year)
            || !(1..=12).contains(&self.month)
            || !(1..=31).contains(&self.day)
        {
            return false;
        }
        self.to_gregorian().to_jalali() == *self
    }

    pub fn to_gregorian(&self) -> GregorianDate {
        jalali_to_gregorian(self.year, self.month, self.day)
    }

    pub fn to_gregorian_checked(&self) -> Option<GregorianDate> {
        if !self.is_valid() {
            return None;
        }
        let greg = self.to_gregorian();
        greg.is_valid().then_some(greg)
    }

    /// Bucket key form: `Y-MM-DD`.
    pub fn key(&self) -> String {
        format!("{}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// First day of the month before this one.
    pub fn prev_month(&self) -> Self {
        if self.month <= 1 {
            Self::new(self.year - 1, 12, 1)
        } else {
            Self::new(self.year, self.month - 1, 1)
        }
    }

    /// First day of the month after this one.
    pub fn next_month(&self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1, 1)
        } else {
            Self::new(self.year, self.month + 1, 1)
        }
    }
}

impl From<NaiveDate> for JalaliDate {
    fn from(date: NaiveDate) -> Self {
        gregorian_to_jalali(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

pub fn is_leap_gregorian(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Jalali leap year by the 2820-year grand cycle.
pub fn is_leap_jalali(year: i32) -> bool {
    let year = i64::from(year);
    ((year - 474).rem_euclid(2820) + 474 + 38) * 682 % 2816 < 682
}

/// Length of a Jalali month; month 12 follows [`is_leap_jalali`].
pub fn days_in_jalali_month(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 if is_leap_jalali(year) => 30,
        12 => 29,
        _ => 0,
    }
}

pub fn days_in_gregorian_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_gregorian(year) => 29,
        1..=12 => GREGORIAN_MONTH_DAYS[month as usize - 1],
        _ => 0,
    }
}

pub fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> JalaliDate {
    let years = i64::from(gy) - i64::from(GREGORIAN_EPOCH_YEAR);
    let mut day_no = 365 * years + (years + 3).div_euclid(4) - (years + 99).div_euclid(100)
        + (years + 399).div_euclid(400);
    for days in GREGORIAN_MONTH_DAYS.iter().take(gm.saturating_sub(1) as usize) {
        day_no += i64::from(*days);
    }
    if gm > 2 && is_leap_gregorian(gy) {
        day_no += 1;
    }
    day_no += i64::from(gd) - 1;

    let mut j_day_no = day_no - EPOCH_OFFSET_DAYS;
    let cycles = j_day_no.div_euclid(DAYS_PER_33_YEARS);
    j_day_no = j_day_no.rem_euclid(DAYS_PER_33_YEARS);

    let mut jy = i64::from(JALALI_EPOCH_YEAR) + 33 * cycles + 4 * (j_day_no / DAYS_PER_4_YEARS);
    j_day_no %= DAYS_PER_4_YEARS;
    if j_day_no >= 366 {
        jy += (j_day_no - 1) / 365;
        j_day_no = (j_day_no - 1) % 365;
    }

    let (jm, jd) = if j_day_no < 186 {
        (1 + j_day_no / 31, 1 + j_day_no % 31)
    } else {
        (7 + (j_day_no - 186) / 30, 1 + (j_day_no - 186) % 30)
    };

    JalaliDate::new(jy as i32, jm as u32, jd as u32)
}

pub fn jalali_to_gregorian(jy: i32, jm: u32, jd: u32) -> GregorianDate {
    let years = i64::from(jy) - i64::from(JALALI_EPOCH_YEAR);
    let mut j_day_no = 365 * years + years.div_euclid(33) * 8 + (years.rem_euclid(33) + 3) / 4;
    for days in JALALI_MONTH_DAYS.iter().take(jm.saturating_sub(1) as usize) {
        j_day_no += i64::from(*days);
    }
    j_day_no += i64::from(jd) - 1;

    let mut g_day_no = j_day_no + EPOCH_OFFSET_DAYS;
    let mut gy = i64::from(GREGORIAN_EPOCH_YEAR) + 400 * g_day_no.div_euclid(DAYS_PER_400_YEARS);
    g_day_no = g_day_no.rem_euclid(DAYS_PER_400_YEARS);

    let mut leap = true;
    // first year of each 400-year block is leap, later century years are not
    if g_day_no >= DAYS_PER_100_YEARS + 1 {
        g_day_no -= 1;
        gy += 100 * (g_day_no / DAYS_PER_100_YEARS);
        g_day_no %= DAYS_PER_100_YEARS;
        if g_day_no >= 365 {
            g_day_no += 1;
        } else {
            leap = false;
        }
    }

    gy += 4 * (g_day_no / DAYS_PER_4_YEARS);
    g_day_no %= DAYS_PER_4_YEARS;
    if g_day_no >= 366 {
        leap = false;
        g_day_no -= 1;
        gy += g_day_no / 365;
        g_day_no %= 365;
    }

    let mut gm = 0;
    while gm < 12 {
        let days = i64::from(GREGORIAN_MONTH_DAYS[gm]) + i64::from(gm == 1 && leap);
        if g_day_no < days {
            break;
        }
        g_day_no -= days;
        gm += 1;
    }

    GregorianDate::new(gy as i32, gm as u32 + 1, g_day_no as u32 + 1)
}

/// Replaces ASCII digits with Persian digits; everything else passes through.
pub fn to_persian_digits(value: impl fmt::Display) -> String {
    value
        .to_string()
        .chars()
        .map(|ch| match ch.to_digit(10) {
            Some(digit) => PERSIAN_DIGITS[digit as usize],
            None => ch,
        })
        .collect()
}

/// Inverse of [`to_persian_digits`], also accepting Arabic-Indic digits.
pub fn to_latin_digits(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            '۰'..='۹' => char::from(b'0' + (ch as u32 - '۰' as u32) as u8),
            '٠'..='٩' => char::from(b'0' + (ch as u32 - '٠' as u32) as u8),
            _ => ch,
        })
        .collect()
}

pub fn persian_month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| PERSIAN_MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

pub fn greg_month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| GREGORIAN_MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}
