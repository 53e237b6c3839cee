//! Task use-case commands.
//!
//! # Responsibility
//! - Provide one callable object per task use case (create, get-by-id,
//!   update, delete, list).
//! - Validate caller input before any storage access.
//! - Translate repository absence into a typed `NotFound` failure.
//!
//! # Invariants
//! - Every command performs at most one logical repository operation.
//! - Commands borrow the caller's connection and never commit or close it.
//! - `InvalidArgument` is always returned before the store is touched.

use crate::db::DbError;
use crate::model::page::Page;
use crate::model::task::{Task, TaskId, TaskStatus, TaskValidationError};
use crate::repo::task_repo::{RepoError, SqliteTaskRepository, TaskListQuery, TaskRepository};
use log::{debug, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CommandResult<T> = Result<T, CommandError>;

/// Caller-visible failure kinds for task commands.
#[derive(Debug)]
pub enum CommandError {
    /// Input was malformed or out of range; storage was not touched.
    InvalidArgument(String),
    /// The targeted task does not exist.
    NotFound(TaskId),
    /// The underlying store failed.
    StorageFailure(RepoError),
}

impl CommandError {
    /// Stable machine-readable kind, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::StorageFailure(_) => "storage_failure",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::StorageFailure(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            RepoError::Validation(err) => Self::InvalidArgument(err.to_string()),
            RepoError::MissingId => Self::InvalidArgument(RepoError::MissingId.to_string()),
            other => Self::StorageFailure(other),
        }
    }
}

impl From<DbError> for CommandError {
    fn from(value: DbError) -> Self {
        Self::StorageFailure(RepoError::Db(value))
    }
}

impl From<TaskValidationError> for CommandError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

/// A single validated use-case call.
pub trait Command {
    type Output;

    fn execute(&self) -> CommandResult<Self::Output>;
}

/// Task identifier as handed to a command: already typed, or raw text from
/// an outer boundary that still needs checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIdArg {
    Typed(TaskId),
    Raw(Option<String>),
}

impl TaskIdArg {
    fn resolve(&self) -> CommandResult<TaskId> {
        match self {
            Self::Typed(id) => Ok(*id),
            Self::Raw(None) => Err(CommandError::InvalidArgument(
                "task id is required".to_string(),
            )),
            Self::Raw(Some(text)) => Ok(text.parse::<TaskId>()?),
        }
    }
}

impl From<TaskId> for TaskIdArg {
    fn from(value: TaskId) -> Self {
        Self::Typed(value)
    }
}

impl From<&str> for TaskIdArg {
    fn from(value: &str) -> Self {
        Self::Raw(Some(value.to_string()))
    }
}

impl From<String> for TaskIdArg {
    fn from(value: String) -> Self {
        Self::Raw(Some(value))
    }
}

impl From<Option<&str>> for TaskIdArg {
    fn from(value: Option<&str>) -> Self {
        Self::Raw(value.map(str::to_string))
    }
}

/// Creates and persists a new task.
pub struct CreateTask<'conn> {
    conn: &'conn Connection,
    description: String,
    status: Option<TaskStatus>,
}

impl<'conn> CreateTask<'conn> {
    pub fn new(
        conn: &'conn Connection,
        description: impl Into<String>,
        status: Option<TaskStatus>,
    ) -> Self {
        Self {
            conn,
            description: description.into(),
            status,
        }
    }
}

impl Command for CreateTask<'_> {
    type Output = Task;

    /// Returns the persisted task with its store-assigned id.
    fn execute(&self) -> CommandResult<Task> {
        let result = (|| -> CommandResult<Task> {
            let mut task =
                Task::with_status(self.description.clone(), self.status.unwrap_or_default())?;
            let repo = SqliteTaskRepository::try_new(self.conn)?;
            task.id = Some(repo.save(&task)?);
            Ok(task)
        })();
        log_outcome("create", &result);
        result
    }
}

/// Fetches one task by id, failing with `NotFound` when absent.
pub struct TaskQueryById<'conn> {
    conn: &'conn Connection,
    id: TaskIdArg,
}

impl<'conn> TaskQueryById<'conn> {
    pub fn new(conn: &'conn Connection, id: impl Into<TaskIdArg>) -> Self {
        Self {
            conn,
            id: id.into(),
        }
    }
}

impl Command for TaskQueryById<'_> {
    type Output = Task;

    fn execute(&self) -> CommandResult<Task> {
        let result = (|| -> CommandResult<Task> {
            let id = self.id.resolve()?;
            let repo = SqliteTaskRepository::try_new(self.conn)?;
            repo.get_by_id(id)?.ok_or(CommandError::NotFound(id))
        })();
        log_outcome("get_by_id", &result);
        result
    }
}

/// Field changes applied by [`UpdateTask`]. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            description: None,
            status: Some(status),
        }
    }

    fn validate(&self) -> CommandResult<()> {
        if self.description.is_none() && self.status.is_none() {
            return Err(CommandError::InvalidArgument(
                "update requires a description or a status".to_string(),
            ));
        }
        if let Some(description) = self.description.as_deref() {
            if description.trim().is_empty() {
                return Err(TaskValidationError::EmptyDescription.into());
            }
        }
        Ok(())
    }
}

/// Applies [`TaskChanges`] to an existing task in one statement and returns
/// the stored result.
pub struct UpdateTask<'conn> {
    conn: &'conn Connection,
    id: TaskIdArg,
    changes: TaskChanges,
}

impl<'conn> UpdateTask<'conn> {
    pub fn new(conn: &'conn Connection, id: impl Into<TaskIdArg>, changes: TaskChanges) -> Self {
        Self {
            conn,
            id: id.into(),
            changes,
        }
    }
}

impl Command for UpdateTask<'_> {
    type Output = Task;

    fn execute(&self) -> CommandResult<Task> {
        let result = (|| -> CommandResult<Task> {
            let id = self.id.resolve()?;
            self.changes.validate()?;

            let repo = SqliteTaskRepository::try_new(self.conn)?;
            Ok(repo.update_fields(
                id,
                self.changes.description.as_deref(),
                self.changes.status,
            )?)
        })();
        log_outcome("update", &result);
        result
    }
}

/// Hard-deletes one task.
pub struct DeleteTask<'conn> {
    conn: &'conn Connection,
    id: TaskIdArg,
}

impl<'conn> DeleteTask<'conn> {
    pub fn new(conn: &'conn Connection, id: impl Into<TaskIdArg>) -> Self {
        Self {
            conn,
            id: id.into(),
        }
    }
}

impl Command for DeleteTask<'_> {
    type Output = TaskId;

    /// Returns the id of the deleted task.
    fn execute(&self) -> CommandResult<TaskId> {
        let result = (|| -> CommandResult<TaskId> {
            let id = self.id.resolve()?;
            let repo = SqliteTaskRepository::try_new(self.conn)?;
            repo.delete(id)?;
            Ok(id)
        })();
        log_outcome("delete", &result);
        result
    }
}

/// Lists one page of tasks with optional search and status filter.
pub struct ListTasks<'conn> {
    conn: &'conn Connection,
    query: TaskListQuery,
}

impl<'conn> ListTasks<'conn> {
    pub fn new(conn: &'conn Connection, query: TaskListQuery) -> Self {
        Self { conn, query }
    }
}

impl Command for ListTasks<'_> {
    type Output = Page<Task>;

    fn execute(&self) -> CommandResult<Page<Task>> {
        let result = (|| -> CommandResult<Page<Task>> {
            self.query.pagination()?;
            let repo = SqliteTaskRepository::try_new(self.conn)?;
            Ok(repo.list(&self.query)?)
        })();
        log_outcome("list", &result);
        result
    }
}

fn log_outcome<T>(op: &'static str, result: &CommandResult<T>) {
    match result {
        Ok(_) => debug!("event=task_command module=command op={op} status=ok"),
        Err(CommandError::StorageFailure(err)) => warn!(
            "event=task_command module=command op={op} status=error error_kind=storage_failure error={err}"
        ),
        Err(err) => debug!(
            "event=task_command module=command op={op} status=error error_kind={}",
            err.kind()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandError, TaskChanges, TaskIdArg};
    use crate::model::task::TaskId;

    #[test]
    fn raw_id_resolution_distinguishes_missing_and_malformed() {
        assert!(matches!(
            TaskIdArg::from(None::<&str>).resolve(),
            Err(CommandError::InvalidArgument(message)) if message.contains("required")
        ));
        assert!(matches!(
            TaskIdArg::from("fake id").resolve(),
            Err(CommandError::InvalidArgument(_))
        ));
        assert_eq!(
            TaskIdArg::from("12").resolve().unwrap(),
            TaskId::new(12).unwrap()
        );
    }

    #[test]
    fn empty_change_set_is_rejected() {
        assert!(matches!(
            TaskChanges::default().validate(),
            Err(CommandError::InvalidArgument(_))
        ));
        let blank = TaskChanges {
            description: Some("  ".to_string()),
            status: None,
        };
        assert!(matches!(
            blank.validate(),
            Err(CommandError::InvalidArgument(_))
        ));
    }
}
