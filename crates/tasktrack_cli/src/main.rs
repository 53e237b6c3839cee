//! Command-line front end for tasktrack.
//!
//! # Responsibility
//! - Own the database connection for the lifetime of one invocation.
//! - Map subcommands onto core commands and print results as JSON.
//! - Exit with a distinct status per failure kind.

use clap::{Parser, Subcommand};
use log::error;
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tasktrack_core::{
    default_log_level, init_logging, open_db, Command, CommandError, CreateTask, DeleteTask,
    ListTasks, Page, Task, TaskChanges, TaskId, TaskListQuery, TaskQueryById, TaskStatus,
    UpdateTask,
};

#[derive(Debug, Parser)]
#[command(name = "tasktrack", version, about = "Track tasks in a local SQLite store")]
struct Cli {
    /// SQLite database file; created on first use.
    #[arg(long, env = "TASKTRACK_DB", default_value = "tasktrack.db")]
    db: PathBuf,

    /// trace|debug|info|warn|error. Defaults per build mode.
    #[arg(long, env = "TASKTRACK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotated log files. Logging is off when unset.
    #[arg(long, env = "TASKTRACK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a task.
    Add {
        description: String,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Show one task.
    Show { id: String },
    /// Change description and/or status.
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Mark a task as DONE.
    Done { id: String },
    /// Delete a task.
    Delete { id: String },
    /// List tasks, optionally searching and filtering.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    value.parse::<TaskStatus>().map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let conn = match open_db(&cli.db) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error: cannot open {}: {err}", cli.db.display());
            return ExitCode::from(1);
        }
    };

    match run(&conn, cli.command) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(rendered) => {
                println!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: cannot render output: {err}");
                ExitCode::from(1)
            }
        },
        Err(err) => {
            error!("event=cli_command module=cli status=error error_kind={}", err.kind());
            eprintln!("error[{}]: {err}", err.kind());
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Successful command result, rendered as JSON.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Task(Task),
    Page(Page<Task>),
    Deleted { deleted: TaskId },
}

fn run(conn: &Connection, command: Commands) -> Result<Output, CommandError> {
    let output = match command {
        Commands::Add {
            description,
            status,
        } => Output::Task(CreateTask::new(conn, description, status).execute()?),
        Commands::Show { id } => Output::Task(TaskQueryById::new(conn, id).execute()?),
        Commands::Update {
            id,
            description,
            status,
        } => {
            let changes = TaskChanges {
                description,
                status,
            };
            Output::Task(UpdateTask::new(conn, id, changes).execute()?)
        }
        Commands::Done { id } => Output::Task(
            UpdateTask::new(conn, id, TaskChanges::status(TaskStatus::Done)).execute()?,
        ),
        Commands::Delete { id } => Output::Deleted {
            deleted: DeleteTask::new(conn, id).execute()?,
        },
        Commands::List {
            search,
            status,
            page,
            per_page,
        } => {
            let query = TaskListQuery {
                search,
                status,
                page,
                per_page,
            };
            Output::Page(ListTasks::new(conn, query).execute()?)
        }
    };
    Ok(output)
}

fn exit_code(err: &CommandError) -> u8 {
    match err {
        CommandError::StorageFailure(_) => 1,
        CommandError::InvalidArgument(_) => 2,
        CommandError::NotFound(_) => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::{exit_code, run, Cli, Commands};
    use clap::Parser;
    use tasktrack_core::{open_db_in_memory, CommandError, TaskId, TaskStatus};

    #[test]
    fn parses_status_flags_leniently() {
        let cli = Cli::try_parse_from(["tasktrack", "add", "buy milk", "--status", "in-progress"])
            .unwrap();
        match cli.command {
            Commands::Add { status, .. } => assert_eq!(status, Some(TaskStatus::InProgress)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_then_done_roundtrips_through_json() {
        let conn = open_db_in_memory().unwrap();

        let created = run(
            &conn,
            Commands::Add {
                description: "buy milk".to_string(),
                status: None,
            },
        )
        .unwrap();
        let created = serde_json::to_value(&created).unwrap();
        assert_eq!(created["id"], 1);
        assert_eq!(created["status"], "TODO");

        let done = run(&conn, Commands::Done { id: "1".to_string() }).unwrap();
        assert_eq!(serde_json::to_value(&done).unwrap()["status"], "DONE");

        let deleted = run(&conn, Commands::Delete { id: "1".to_string() }).unwrap();
        assert_eq!(serde_json::to_value(&deleted).unwrap()["deleted"], 1);
    }

    #[test]
    fn delete_with_malformed_id_is_an_invalid_argument() {
        let conn = open_db_in_memory().unwrap();
        let err = run(&conn, Commands::Delete { id: "abc".to_string() }).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument(_)));
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn exit_codes_differ_per_error_kind() {
        let conn = open_db_in_memory().unwrap();
        let err = run(&conn, Commands::Show { id: "1".to_string() }).unwrap_err();
        assert_eq!(exit_code(&err), 3);

        let invalid = CommandError::InvalidArgument("bad".to_string());
        let missing = CommandError::NotFound(TaskId::new(1).unwrap());
        assert_ne!(exit_code(&invalid), exit_code(&missing));
    }
}
