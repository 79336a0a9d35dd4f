use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::{format_jalali_label, parse_iso_date};
use crate::jalali::JalaliDate;
use crate::task::TaskDueRecord;

/// A task placed on its Jalali due day, with the display string precomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedTask {
    pub task: TaskDueRecord,
    pub date: JalaliDate,
    pub jalali_display: String,
}

/// Tasks grouped by Jalali due day, keyed `Y-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayBucketMap {
    days: BTreeMap<String, Vec<BucketedTask>>,
}

impl DayBucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: &JalaliDate) -> &[BucketedTask] {
        self.get_key(&date.key())
    }

    pub fn get_key(&self, key: &str) -> &[BucketedTask] {
        self.days.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<BucketedTask>)> {
        self.days.iter()
    }

    fn push(&mut self, entry: BucketedTask) {
        self.days.entry(entry.date.key()).or_default().push(entry);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorState {
    Overdue,
    Active,
    Done,
}

impl IndicatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorState::Overdue => "overdue",
            IndicatorState::Active => "active",
            IndicatorState::Done => "done",
        }
    }
}

/// Badge counts over a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub overdue: usize,
    pub active: usize,
}

/// Groups tasks by their Jalali due day. Tasks without a parseable
/// `due_date` are left out; the input slice is not modified.
pub fn build_task_map(tasks: &[TaskDueRecord]) -> DayBucketMap {
    let mut map = DayBucketMap::new();
    let mut skipped = 0_usize;

    for task in tasks {
        let Some(due) = task.due_date.as_deref().and_then(parse_iso_date) else {
            skipped += 1;
            continue;
        };
        let date = due.to_jalali();
        map.push(BucketedTask {
            task: task.clone(),
            date,
            jalali_display: format_jalali_label(date),
        });
    }

    tracing::debug!(
        total_tasks = tasks.len(),
        skipped,
        days = map.len(),
        "task map built"
    );
    map
}

pub fn indicator_state_for_tasks(tasks: &[BucketedTask]) -> IndicatorState {
    if tasks
        .iter()
        .any(|entry| entry.task.overdue && !entry.task.is_done_like())
    {
        return IndicatorState::Overdue;
    }
    // an empty day reads as available
    if tasks.is_empty() || tasks.iter().any(|entry| !entry.task.is_done_like()) {
        return IndicatorState::Active;
    }
    IndicatorState::Done
}

pub fn summarize_tasks(tasks: &[TaskDueRecord]) -> TaskCounts {
    tasks
        .iter()
        .filter(|task| !task.is_done_like())
        .fold(TaskCounts::default(), |mut counts, task| {
            if task.overdue {
                counts.overdue += 1;
            } else {
                counts.active += 1;
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, due: &str, status: &str, overdue: bool) -> TaskDueRecord {
        TaskDueRecord {
            overdue,
            ..TaskDueRecord::new(title, due, status)
        }
    }

    fn bucketed(status: &str, overdue: bool) -> BucketedTask {
        BucketedTask {
            task: task("t", "2024-03-20", status, overdue),
            date: JalaliDate::new(1403, 1, 1),
            jalali_display: String::new(),
        }
    }

    #[test]
    fn tasks_on_the_same_day_share_a_bucket_in_input_order() {
        let tasks = vec![
            task("first", "2024-03-20", "pending", false),
            task("second", "2024-03-20", "done", false),
        ];
        let map = build_task_map(&tasks);

        assert_eq!(map.len(), 1);
        let bucket = map.get_key("1403-01-01");
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].task.title, "first");
        assert_eq!(bucket[1].task.title, "second");
        assert_eq!(bucket[0].jalali_display, "۱ فروردین ۱۴۰۳");
        assert_eq!(indicator_state_for_tasks(bucket), IndicatorState::Active);
    }

    #[test]
    fn tasks_without_usable_due_dates_are_skipped() {
        let mut no_due = task("none", "", "pending", false);
        no_due.due_date = None;
        let tasks = vec![
            no_due,
            task("empty", "", "pending", false),
            task("bad", "2024-02-31", "pending", false),
            task("ok", "2024-03-21", "pending", false),
        ];
        let map = build_task_map(&tasks);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&JalaliDate::new(1403, 1, 2)).len(), 1);
        assert_eq!(tasks.len(), 4);
    }

    #[test]
    fn indicator_prefers_overdue_then_active() {
        assert_eq!(indicator_state_for_tasks(&[]), IndicatorState::Active);
        assert_eq!(
            indicator_state_for_tasks(&[bucketed("done", false), bucketed("pending", true)]),
            IndicatorState::Overdue
        );
        assert_eq!(
            indicator_state_for_tasks(&[bucketed("done-overdue", true), bucketed("pending", false)]),
            IndicatorState::Active
        );
        assert_eq!(
            indicator_state_for_tasks(&[bucketed("done", false), bucketed("DONE-OVERDUE", true)]),
            IndicatorState::Done
        );
    }

    #[test]
    fn missing_days_have_no_tasks() {
        let map = build_task_map(&[]);
        assert!(map.is_empty());
        assert!(map.get_key("1403-01-01").is_empty());
    }

    #[test]
    fn bucket_map_serializes_as_an_object() {
        let map = build_task_map(&[task("first", "2024-03-20", "pending", false)]);
        let value = serde_json::to_value(&map).expect("serialize map");
        assert_eq!(value["1403-01-01"][0]["task"]["title"], "first");
        assert_eq!(value["1403-01-01"][0]["date"]["month"], 1);
    }

    #[test]
    fn summary_counts_open_tasks() {
        let tasks = vec![
            task("a", "2024-03-20", "pending", true),
            task("b", "2024-03-20", "pending", false),
            task("c", "2024-03-20", "done-overdue", true),
            task("d", "2024-03-20", "done", false),
            task("e", "2024-03-20", "pending", false),
        ];
        assert_eq!(
            summarize_tasks(&tasks),
            TaskCounts {
                overdue: 1,
                active: 2
            }
        );
    }
}
