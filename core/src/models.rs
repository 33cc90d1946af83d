//! Outgoing request shapes.
//!
//! Every optional field is skipped when absent so partial updates carry only
//! what the caller supplied. Incoming entities are not modeled here: they stay
//! JSON objects so unknown remote fields reach the caller untouched.

use serde::Serialize;
use thiserror::Error;

/// Page size the remote API is asked for when the caller gives none.
pub const DEFAULT_MAX_COUNT: u64 = 100;

/// Integer code outside an enum's documented range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} must be one of {allowed}, got {value}")]
pub struct InvalidCode {
    pub kind: &'static str,
    pub allowed: &'static str,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn from_code(code: i64) -> Result<Self, InvalidCode> {
        match code {
            0 => Ok(Priority::High),
            1 => Ok(Priority::Normal),
            2 => Ok(Priority::Low),
            _ => Err(InvalidCode {
                kind: "priority",
                allowed: "0 (high), 1 (normal), 2 (low)",
                value: code,
            }),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.code()
    }
}

/// Progress recorded against a habit for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum HabitProgress {
    NoChange,
    /// Not done, but the streak is kept.
    Skipped,
    #[default]
    Done,
}

impl HabitProgress {
    pub fn from_code(code: i64) -> Result<Self, InvalidCode> {
        match code {
            0 => Ok(HabitProgress::NoChange),
            1 => Ok(HabitProgress::Skipped),
            2 => Ok(HabitProgress::Done),
            _ => Err(InvalidCode {
                kind: "progress",
                allowed: "0 (no change), 1 (not done, keep streak), 2 (done)",
                value: code,
            }),
        }
    }

    pub fn from_done(done: bool) -> Self {
        if done {
            HabitProgress::Done
        } else {
            HabitProgress::Skipped
        }
    }

    pub fn code(self) -> u8 {
        match self {
            HabitProgress::NoChange => 0,
            HabitProgress::Skipped => 1,
            HabitProgress::Done => 2,
        }
    }
}

impl From<HabitProgress> for u8 {
    fn from(value: HabitProgress) -> Self {
        value.code()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Parent task id; set for subtasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Partial task update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Full replacement of the task's tag set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Completion date (`YYYY-MM-DD`). Setting it completes the task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_date: Option<String>,
}

impl TaskPatch {
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    pub fn completion(date: String) -> Self {
        Self {
            journal_date: Some(date),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewProject {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Hex color such as `#ad1457`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Emoji code point in hex such as `1f49e`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewHabit {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Color name such as `red` or `green`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitProgressMark {
    pub habit: String,
    pub date: String,
    pub progress: HabitProgress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTag {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChecklistItem {
    pub title: String,
    /// Owning task id.
    pub parent: String,
}

fn flag(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

fn push_max_count(pairs: &mut Vec<(String, String)>, max_count: Option<u64>) {
    if let Some(count) = max_count.filter(|count| *count > 0) {
        pairs.push(("maxCount".to_string(), count.to_string()));
    }
}

/// Filters for `GET /task`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub project_id: Option<String>,
    pub tag_ids: Vec<String>,
    pub include_archived: bool,
    pub include_removed: bool,
    /// Sent only when set; `Some(false)` suppresses recurring-instance expansion.
    pub include_all_recurrence_instances: Option<bool>,
    pub start_date_from: Option<String>,
    pub start_date_to: Option<String>,
    pub max_count: Option<u64>,
}

impl TaskQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("includeArchived".to_string(), flag(self.include_archived)),
            ("includeRemoved".to_string(), flag(self.include_removed)),
        ];
        if let Some(expand) = self.include_all_recurrence_instances {
            pairs.push(("includeAllRecurrenceInstances".to_string(), flag(expand)));
        }
        if let Some(project_id) = &self.project_id {
            pairs.push(("projectId".to_string(), project_id.clone()));
        }
        if !self.tag_ids.is_empty() {
            pairs.push(("tagIds".to_string(), self.tag_ids.join(",")));
        }
        if let Some(from) = &self.start_date_from {
            pairs.push(("startDateFrom".to_string(), from.clone()));
        }
        if let Some(to) = &self.start_date_to {
            pairs.push(("startDateTo".to_string(), to.clone()));
        }
        push_max_count(&mut pairs, self.max_count);
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectQuery {
    pub include_archived: bool,
    pub include_removed: bool,
    pub max_count: Option<u64>,
}

impl ProjectQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("includeArchived".to_string(), flag(self.include_archived)),
            ("includeRemoved".to_string(), flag(self.include_removed)),
        ];
        push_max_count(&mut pairs, self.max_count);
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitQuery {
    pub max_count: Option<u64>,
}

impl HabitQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_max_count(&mut pairs, self.max_count);
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagQuery {
    pub include_removed: bool,
    pub max_count: Option<u64>,
}

impl TagQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("includeRemoved".to_string(), flag(self.include_removed))];
        push_max_count(&mut pairs, self.max_count);
        pairs
    }
}
