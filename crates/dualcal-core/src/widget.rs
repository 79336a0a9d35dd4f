use std::rc::Rc;

use serde::Serialize;

use crate::bucket::{BucketedTask, DayBucketMap};
use crate::clock::Clock;
use crate::format::format_jalali_label;
use crate::grid::{DayClick, MonthView, render_month};
use crate::jalali::JalaliDate;

/// Render target for one calendar.
pub trait CalendarMount {
    fn id(&self) -> &str;

    fn draw(&mut self, view: &MonthView);
}

/// Day-click callbacks supplied by the task side.
pub trait DayActions {
    fn open_day(&self, date: JalaliDate, tasks: &[BucketedTask]);

    fn create_task(&self, date: JalaliDate);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Prev,
    Next,
    Today,
}

impl NavAction {
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim() {
            "prev" => Some(Self::Prev),
            "next" => Some(Self::Next),
            "today" => Some(Self::Today),
            _ => None,
        }
    }
}

pub struct CalendarWidget {
    mount: Box<dyn CalendarMount>,
    clock: Rc<dyn Clock>,
    actions: Rc<dyn DayActions>,
    tasks: Rc<DayBucketMap>,
    year: i32,
    month: u32,
    view: Option<MonthView>,
}

impl CalendarWidget {
    /// Builds a widget showing the current month and renders it.
    pub fn new(
        mount: Box<dyn CalendarMount>,
        tasks: Rc<DayBucketMap>,
        clock: Rc<dyn Clock>,
        actions: Rc<dyn DayActions>,
    ) -> Self {
        let today = clock.today_jalali();
        let mut widget = Self {
            mount,
            clock,
            actions,
            tasks,
            year: today.year,
            month: today.month,
            view: None,
        };
        tracing::debug!(mount = widget.mount.id(), year = today.year, month = today.month, "calendar mounted");
        widget.render();
        widget
    }

    pub fn id(&self) -> &str {
        self.mount.id()
    }

    pub fn current(&self) -> (i32, u32) {
        (self.year, self.month)
    }

    pub fn view(&self) -> Option<&MonthView> {
        self.view.as_ref()
    }

    pub fn set_tasks(&mut self, tasks: Rc<DayBucketMap>) {
        self.tasks = tasks;
        self.render();
    }

    pub fn navigate(&mut self, action: NavAction) {
        match action {
            NavAction::Prev => self.shift_month(-1),
            NavAction::Next => self.shift_month(1),
            NavAction::Today => self.set_today(),
        }
    }

    pub fn prev(&mut self) {
        self.navigate(NavAction::Prev);
    }

    pub fn next(&mut self) {
        self.navigate(NavAction::Next);
    }

    pub fn today(&mut self) {
        self.navigate(NavAction::Today);
    }

    /// Jumps straight to a Jalali month, outside the prev/next/today
    /// navigation. Used by the CLI to open a given day; out-of-range months
    /// are ignored.
    pub fn show_month(&mut self, year: i32, month: u32) {
        if !(1..=12).contains(&month) {
            return;
        }
        self.year = year;
        self.month = month;
        self.render();
    }

    fn set_today(&mut self) {
        let today = self.clock.today_jalali();
        self.year = today.year;
        self.month = today.month;
        self.render();
    }

    fn shift_month(&mut self, delta: i32) {
        let mut year = self.year;
        let mut month = self.month as i32 + delta;
        while month < 1 {
            month += 12;
            year -= 1;
        }
        while month > 12 {
            month -= 12;
            year += 1;
        }
        self.year = year;
        self.month = month as u32;
        self.render();
    }

    pub fn render(&mut self) {
        let today = self.clock.today_jalali();
        let view = render_month(self.year, self.month, &self.tasks, today);
        tracing::trace!(
            mount = self.mount.id(),
            year = self.year,
            month = self.month,
            cells = view.cells.len(),
            "calendar rendered"
        );
        self.mount.draw(&view);
        self.view = Some(view);
    }

    /// Clicks a day of the rendered grid. Returns the action taken, or
    /// `None` when the day is not on screen or not clickable.
    pub fn click(&self, date: JalaliDate) -> Option<DayClick> {
        let cell = self.view.as_ref()?.cell(&date)?;
        let click = cell.click?;
        match click {
            DayClick::OpenDay => self.actions.open_day(date, self.tasks.get(&date)),
            DayClick::CreateTask => self.actions.create_task(date),
        }
        Some(click)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDetailRow {
    pub id: Option<u64>,
    pub title: String,
    pub due: String,
    pub status: String,
}

/// What the day view shows for a clicked day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDetail {
    pub heading: String,
    pub rows: Vec<DayDetailRow>,
}

impl DayDetail {
    pub fn new(date: JalaliDate, tasks: &[BucketedTask]) -> Self {
        let rows = tasks
            .iter()
            .map(|entry| DayDetailRow {
                id: entry.task.id,
                title: entry.task.title.clone(),
                due: format!("تاریخ سررسید: {}", entry.jalali_display),
                status: day_status_label(entry).to_string(),
            })
            .collect();

        Self {
            heading: format!("تاریخ: {}", format_jalali_label(date)),
            rows,
        }
    }
}

fn day_status_label(entry: &BucketedTask) -> &'static str {
    if entry.task.status == "done" {
        "✔ تایید شده"
    } else if entry.task.approval_pending {
        "در انتظار تایید"
    } else {
        "فعال"
    }
}


#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::testing::{Recorded, RecordingActions, RecordingMount};
    use super::*;
    use crate::bucket::build_task_map;
    use crate::clock::FixedClock;
    use crate::task::TaskDueRecord;

    fn clock() -> Rc<FixedClock> {
        Rc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"),
        ))
    }

    fn widget_with(tasks: DayBucketMap) -> (CalendarWidget, Rc<std::cell::RefCell<Vec<MonthView>>>, Rc<RecordingActions>) {
        let (mount, views) = RecordingMount::new("main");
        let actions = Rc::new(RecordingActions::default());
        let widget = CalendarWidget::new(Box::new(mount), Rc::new(tasks), clock(), actions.clone());
        (widget, views, actions)
    }

    #[test]
    fn starts_on_the_current_month_and_renders() {
        let (widget, views, _) = widget_with(DayBucketMap::new());
        assert_eq!(widget.current(), (1405, 7));
        assert_eq!(views.borrow().len(), 1);
        assert_eq!(widget.id(), "main");
    }

    #[test]
    fn navigation_wraps_across_years() {
        let (mut widget, views, _) = widget_with(DayBucketMap::new());
        for _ in 0..7 {
            widget.prev();
        }
        assert_eq!(widget.current(), (1404, 12));
        widget.next();
        assert_eq!(widget.current(), (1405, 1));
        widget.today();
        assert_eq!(widget.current(), (1405, 7));
        assert_eq!(views.borrow().len(), 10);
        assert_eq!(views.borrow().last().map(|view| view.month), Some(7));
    }

    #[test]
    fn show_month_jumps_and_ignores_bad_months() {
        let (mut widget, views, _) = widget_with(DayBucketMap::new());
        widget.show_month(1403, 1);
        assert_eq!(widget.current(), (1403, 1));
        widget.show_month(1403, 13);
        assert_eq!(widget.current(), (1403, 1));
        assert_eq!(views.borrow().len(), 2);
    }

    #[test]
    fn nav_actions_parse_from_keys() {
        assert_eq!(NavAction::from_key("prev"), Some(NavAction::Prev));
        assert_eq!(NavAction::from_key("today"), Some(NavAction::Today));
        assert_eq!(NavAction::from_key("later"), None);
    }

    #[test]
    fn set_tasks_replaces_the_map_and_rerenders() {
        let (mut widget, views, _) = widget_with(DayBucketMap::new());
        let map = build_task_map(&[TaskDueRecord::new("x", "2026-10-20", "pending")]);
        widget.set_tasks(Rc::new(map));

        assert_eq!(views.borrow().len(), 2);
        let latest = widget.view().expect("rendered view");
        let cell = latest.cell(&JalaliDate::new(1405, 7, 28)).expect("cell");
        assert!(cell.indicator.is_some());
    }

    #[test]
    fn clicks_dispatch_to_day_actions() {
        let tasks = vec![
            TaskDueRecord::new("old", "2026-10-01", "done"),
            TaskDueRecord::new("soon", "2026-10-20", "pending"),
        ];
        let (widget, _, actions) = widget_with(build_task_map(&tasks));

        assert_eq!(widget.click(JalaliDate::new(1405, 7, 9)), Some(DayClick::OpenDay));
        assert_eq!(widget.click(JalaliDate::new(1405, 7, 28)), Some(DayClick::OpenDay));
        assert_eq!(widget.click(JalaliDate::new(1405, 7, 29)), Some(DayClick::CreateTask));
        assert_eq!(widget.click(JalaliDate::new(1405, 7, 10)), None);
        assert_eq!(widget.click(JalaliDate::new(1405, 9, 1)), None);

        assert_eq!(
            *actions.calls.borrow(),
            vec![
                Recorded::Open(JalaliDate::new(1405, 7, 9), vec!["old".to_string()]),
                Recorded::Open(JalaliDate::new(1405, 7, 28), vec!["soon".to_string()]),
                Recorded::Create(JalaliDate::new(1405, 7, 29)),
            ]
        );
    }

    #[test]
    fn day_detail_labels_rows() {
        let mut pending = TaskDueRecord::new("review", "2026-10-20", "pending");
        pending.approval_pending = true;
        let tasks = vec![
            TaskDueRecord::new("ship", "2026-10-20", "done"),
            pending,
            TaskDueRecord::new("write", "2026-10-20", "pending"),
        ];
        let map = build_task_map(&tasks);
        let date = JalaliDate::new(1405, 7, 28);
        let detail = DayDetail::new(date, map.get(&date));

        assert_eq!(detail.heading, "تاریخ: ۲۸ مهر ۱۴۰۵");
        assert_eq!(detail.rows.len(), 3);
        assert_eq!(detail.rows[0].status, "✔ تایید شده");
        assert_eq!(detail.rows[1].status, "در انتظار تایید");
        assert_eq!(detail.rows[2].status, "فعال");
        assert_eq!(detail.rows[2].due, "تاریخ سررسید: ۲۸ مهر ۱۴۰۵");
    }
}
