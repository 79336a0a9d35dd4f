use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

/// Statuses that count as finished for calendar indicators and badges.
pub const DONE_LIKE_STATUSES: [&str; 2] = ["done", "done-overdue"];

/// A task as served by the backend. Only the fields the calendar reads are
/// typed; everything else is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskDueRecord {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Gregorian `YYYY-MM-DD`.
    #[serde(default)]
    pub due_date: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub overdue: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub approval_pending: bool,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TaskDueRecord {
    pub fn new(title: impl Into<String>, due_date: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: Some(due_date.into()),
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn is_done_like(&self) -> bool {
        let status = self.status.trim();
        DONE_LIKE_STATUSES
            .iter()
            .any(|done| status.eq_ignore_ascii_case(done))
    }
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a JSON array of task records, the shape of `GET /api/tasks`.
#[tracing::instrument]
pub fn load_tasks(path: &Path) -> anyhow::Result<Vec<TaskDueRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read tasks file {}", path.display()))?;
    let tasks: Vec<TaskDueRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse tasks file {}", path.display()))?;
    tracing::debug!(count = tasks.len(), "loaded tasks");
    Ok(tasks)
}
