//! Identifier conventions.
//!
//! Remote identifiers are opaque strings. Tasks are conventionally `T-<id>` and
//! projects `P-<id>`, but a mismatch is only ever a warning: the remote API is
//! the authority on what an identifier means.

use std::fmt;

/// Resource kinds whose identifiers carry a documented prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Task,
    Project,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Task => "T-",
            IdKind::Project => "P-",
        }
    }

    fn label(self) -> &'static str {
        match self {
            IdKind::Task => "task",
            IdKind::Project => "project",
        }
    }
}

/// A malformed-looking but non-fatal input. The call proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Returns a warning when `id` does not follow the prefix convention for `kind`.
pub fn check_prefix(field: &str, id: &str, kind: IdKind) -> Option<ValidationWarning> {
    if id.starts_with(kind.prefix()) {
        None
    } else {
        Some(ValidationWarning::new(
            field,
            format!(
                "'{id}' does not look like a {} id (expected {}<id>)",
                kind.label(),
                kind.prefix()
            ),
        ))
    }
}

/// Outcome of deciding whether a task should reference a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectAttachment {
    /// Send this id as the task's `project` field.
    Attach(String),
    /// Send no project field. Carries a warning when the caller supplied something unusable.
    Omit(Option<ValidationWarning>),
}

impl ProjectAttachment {
    /// A project is attached only when the id is non-empty after trimming and
    /// `P-`-prefixed. Anything else degrades to "no project" and never fails the call.
    pub fn resolve(field: &str, raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ProjectAttachment::Omit(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ProjectAttachment::Omit(Some(ValidationWarning::new(
                field,
                "empty project id; task will have no project",
            )));
        }
        match check_prefix(field, trimmed, IdKind::Project) {
            None => ProjectAttachment::Attach(trimmed.to_string()),
            Some(warning) => ProjectAttachment::Omit(Some(ValidationWarning::new(
                warning.field,
                format!("{}; task will have no project", warning.message),
            ))),
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            ProjectAttachment::Attach(id) => Some(id),
            ProjectAttachment::Omit(_) => None,
        }
    }

    pub fn warning(&self) -> Option<&ValidationWarning> {
        match self {
            ProjectAttachment::Attach(_) => None,
            ProjectAttachment::Omit(warning) => warning.as_ref(),
        }
    }
}
