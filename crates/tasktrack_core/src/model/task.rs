//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted in the `tasks` table.
//! - Enforce description and timestamp invariants before persistence.
//!
//! # Invariants
//! - `id` is `None` until the store assigns a row id, then never changes.
//! - `description` is non-empty after trimming.
//! - `created_at` is immutable; `updated_at` is never earlier than it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned task identifier.
///
/// Wraps the positive integer row id of the `tasks` table. This is the only
/// identifier a task has; there is no separate pre-insert key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TaskId(i64);

impl TaskId {
    /// Wraps a row id, rejecting zero and negative values.
    pub fn new(value: i64) -> Result<Self, TaskValidationError> {
        if value <= 0 {
            return Err(TaskValidationError::NonPositiveId(value));
        }
        Ok(Self(value))
    }

    /// Parses caller-supplied text. Returns `None` for anything that is not
    /// a positive integer.
    pub fn parse(value: &str) -> Option<Self> {
        value
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|raw| Self::new(raw).ok())
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TaskValidationError::MalformedId(s.to_string()))
    }
}

impl TryFrom<i64> for TaskId {
    type Error = TaskValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for i64 {
    fn from(value: TaskId) -> Self {
        value.0
    }
}

/// Task lifecycle state.
///
/// No transition graph is enforced; any status may move to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    Todo,
    /// Work is in progress.
    InProgress,
    /// Completed.
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Returns the persisted text form (`TODO`, `IN_PROGRESS`, `DONE`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    /// Parses the persisted text form. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TODO" => Some(Self::Todo),
            "IN_PROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskValidationError;

    /// Accepts the persisted form case-insensitively, with `-` allowed in
    /// place of `_` (`in-progress`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::parse(&normalized).ok_or_else(|| TaskValidationError::UnknownStatus(s.to_string()))
    }
}

/// Validation failures for task construction and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyDescription,
    NonPositiveId(i64),
    MalformedId(String),
    UnknownStatus(String),
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::NonPositiveId(value) => write!(f, "task id must be positive, got {value}"),
            Self::MalformedId(value) => write!(f, "task id must be a positive integer, got `{value}`"),
            Self::UnknownStatus(value) => {
                write!(f, "unknown status `{value}`; expected TODO|IN_PROGRESS|DONE")
            }
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Row id; `None` until saved.
    pub id: Option<TaskId>,
    pub description: String,
    pub status: TaskStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed by the store on every update.
    pub updated_at: i64,
}

impl Task {
    /// Creates an unsaved task with status `TODO`.
    pub fn new(description: impl Into<String>) -> Result<Self, TaskValidationError> {
        Self::with_status(description, TaskStatus::Todo)
    }

    /// Creates an unsaved task with an explicit status.
    ///
    /// # Invariants
    /// - `created_at == updated_at` at construction.
    pub fn with_status(
        description: impl Into<String>,
        status: TaskStatus,
    ) -> Result<Self, TaskValidationError> {
        let now = now_epoch_ms();
        let task = Self {
            id: None,
            description: description.into(),
            status,
            created_at: now,
            updated_at: now,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record invariants. Called on every write and every decoded row.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.description.trim().is_empty() {
            return Err(TaskValidationError::EmptyDescription);
        }
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Returns whether this task has been persisted.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
