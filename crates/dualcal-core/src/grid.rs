//! Month grid for the Jalali calendar.
//!
//! Weeks start on Saturday. The grid always holds whole weeks, so a month
//! spans five or six rows with days of the neighbouring months filling the
//! first and last row.

use chrono::Datelike;
use serde::Serialize;

use crate::bucket::{BucketedTask, DayBucketMap, IndicatorState, indicator_state_for_tasks};
use crate::format::{TODAY_TEXT, format_jalali_month_title};
use crate::jalali::{JalaliDate, days_in_jalali_month, to_persian_digits};

pub const WEEKDAY_INITIALS: [&str; 7] = ["ش", "ی", "د", "س", "چ", "پ", "ج"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Current,
    Other,
}

/// What a click on a cell does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClick {
    OpenDay,
    CreateTask,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub state: IndicatorState,
    pub count: usize,
    pub label: String,
}

impl Indicator {
    pub fn class(&self) -> String {
        format!("dualcal-indicator dualcal-indicator--{}", self.state.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: JalaliDate,
    pub kind: CellKind,
    pub past: bool,
    pub today: bool,
    /// Day number in Persian digits.
    pub label: String,
    pub indicator: Option<Indicator>,
    pub click: Option<DayClick>,
}

impl DayCell {
    pub fn key(&self) -> String {
        self.date.key()
    }

    pub fn clickable(&self) -> bool {
        self.click.is_some()
    }

    pub fn classes(&self) -> Vec<String> {
        let mut classes = vec!["dualcal-day".to_string()];
        if self.kind == CellKind::Other {
            classes.push("dualcal-day--other".to_string());
        }
        if let Some(indicator) = &self.indicator {
            classes.push("dualcal-day--has".to_string());
            classes.push(format!("dualcal-day--{}", indicator.state.as_str()));
        }
        if self.clickable() {
            classes.push("clickable".to_string());
        }
        if self.today {
            classes.push("dualcal-day--today".to_string());
        } else if self.past {
            classes.push("dualcal-day--past".to_string());
        }
        classes
    }

    pub fn today_label(&self) -> Option<&'static str> {
        self.today.then_some(TODAY_TEXT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub title: String,
    /// Saturday-first weekday offset of day 1.
    pub offset: usize,
    pub days_in_month: u32,
    pub cells: Vec<DayCell>,
}

impl MonthView {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: &JalaliDate) -> Option<&DayCell> {
        self.cells.iter().find(|cell| cell.date == *date)
    }
}

pub fn task_count_label(count: usize) -> String {
    if count == 1 {
        "1 task".to_string()
    } else {
        format!("{count} tasks")
    }
}

/// Saturday-first offset of the first day of a Jalali month.
pub fn month_offset(year: i32, month: u32) -> usize {
    let start = JalaliDate::new(year, month, 1).to_gregorian();
    // month 1..=12 and day 1 always name a real Gregorian day in range
    let weekday = start
        .to_naive()
        .map(|date| date.weekday().num_days_from_sunday())
        .unwrap_or(0);
    ((weekday + 1) % 7) as usize
}

/// Days of a Jalali month as laid out on the grid. Esfand has a 30th day
/// exactly when that day converts to a Gregorian date and back, so cell
/// keys always line up with the keys of bucketed tasks.
pub fn grid_month_length(year: i32, month: u32) -> u32 {
    if month == 12 {
        if JalaliDate::new(year, 12, 30).is_valid() {
            30
        } else {
            29
        }
    } else {
        days_in_jalali_month(year, month)
    }
}

pub fn render_month(year: i32, month: u32, tasks: &DayBucketMap, today: JalaliDate) -> MonthView {
    let offset = month_offset(year, month);
    let days_in_month = grid_month_length(year, month);
    let prev = JalaliDate::new(year, month, 1).prev_month();
    let next = JalaliDate::new(year, month, 1).next_month();
    let days_prev = grid_month_length(prev.year, prev.month);
    let in_month = days_in_month as usize;
    let total = (offset + in_month).div_ceil(7) * 7;

    let cells = (0..total)
        .map(|idx| {
            let (date, kind) = if idx < offset {
                let day = days_prev as usize + idx + 1 - offset;
                (JalaliDate::new(prev.year, prev.month, day as u32), CellKind::Other)
            } else if idx < offset + in_month {
                let day = idx - offset + 1;
                (JalaliDate::new(year, month, day as u32), CellKind::Current)
            } else {
                let day = idx - (offset + in_month) + 1;
                (JalaliDate::new(next.year, next.month, day as u32), CellKind::Other)
            };
            build_cell(date, kind, tasks.get(&date), today)
        })
        .collect();

    MonthView {
        year,
        month,
        title: format_jalali_month_title(year, month),
        offset,
        days_in_month,
        cells,
    }
}

fn build_cell(date: JalaliDate, kind: CellKind, day_tasks: &[BucketedTask], today: JalaliDate) -> DayCell {
    let past = date < today;
    let indicator = (!day_tasks.is_empty()).then(|| Indicator {
        state: indicator_state_for_tasks(day_tasks),
        count: day_tasks.len(),
        label: task_count_label(day_tasks.len()),
    });

    let click = match kind {
        CellKind::Current if !day_tasks.is_empty() => Some(DayClick::OpenDay),
        CellKind::Current if !past => Some(DayClick::CreateTask),
        _ => None,
    };

    DayCell {
        date,
        kind,
        past,
        today: kind == CellKind::Current && date == today,
        label: to_persian_digits(date.day),
        indicator,
        click,
    }
}
