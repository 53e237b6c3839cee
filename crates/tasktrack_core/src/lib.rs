//! Core domain logic for tasktrack.
//! This crate owns task persistence and the use-case commands built on it.

pub mod command;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use command::task_commands::{
    Command, CommandError, CommandResult, CreateTask, DeleteTask, ListTasks, TaskChanges,
    TaskIdArg, TaskQueryById, UpdateTask,
};
pub use db::{open_db, open_db_in_memory, unit_of_work, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::page::Page;
pub use model::task::{Task, TaskId, TaskStatus, TaskValidationError};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository, DEFAULT_PER_PAGE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
