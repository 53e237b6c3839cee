//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/get/update/delete/list over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate their input before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - The repository borrows its connection and never commits or closes it;
//!   transaction scope belongs to the caller (see `db::unit_of_work`).
//! - `update` bumps `updated_at` to `max(now, previous + 1)` in the same
//!   statement that writes `description` and `status`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::page::{page_offset, Page};
use crate::model::task::{now_epoch_ms, Task, TaskId, TaskStatus, TaskValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size used when a list query leaves `per_page` unset.
pub const DEFAULT_PER_PAGE: u32 = 20;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    description,
    status,
    created_at,
    updated_at
FROM tasks";

const REQUIRED_COLUMNS: [&str; 5] = ["id", "description", "status", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    /// Write targeted a row id that does not exist.
    NotFound(TaskId),
    /// `update` was called with an unsaved task.
    MissingId,
    /// Query parameters are out of range (e.g. `page == 0`).
    InvalidArgument(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::MissingId => write!(f, "task has no id; save it before updating"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Search, filter, and pagination options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// Case-insensitive (ASCII) substring match on `description`. The text is
    /// matched as given, surrounding whitespace included. Blank text means no
    /// search.
    pub search: Option<String>,
    /// Exact status filter.
    pub status: Option<TaskStatus>,
    /// 1-based page number. Defaults to 1.
    pub page: Option<u32>,
    /// Page size. Defaults to [`DEFAULT_PER_PAGE`].
    pub per_page: Option<u32>,
}

impl TaskListQuery {
    /// Resolves defaults and rejects zero page/per_page.
    pub fn pagination(&self) -> RepoResult<(u32, u32)> {
        let page = self.page.unwrap_or(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page == 0 {
            return Err(RepoError::InvalidArgument(
                "page must be >= 1".to_string(),
            ));
        }
        if per_page == 0 {
            return Err(RepoError::InvalidArgument(
                "per_page must be a positive integer".to_string(),
            ));
        }
        Ok((page, per_page))
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|term| !term.trim().is_empty())
    }

    /// Appends WHERE clauses for search/status and returns their bindings.
    fn push_filters(&self, sql: &mut String) -> Vec<Value> {
        let mut bind_values = Vec::new();

        if let Some(term) = self.search_term() {
            sql.push_str(" AND instr(lower(description), lower(?)) > 0");
            bind_values.push(Value::Text(term.to_string()));
        }

        if let Some(status) = self.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        bind_values
    }
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Inserts a new row and returns the store-assigned id.
    fn save(&self, task: &Task) -> RepoResult<TaskId>;
    /// Returns `Ok(None)` when no row has this id.
    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Overwrites description and status, refreshing `updated_at`.
    fn update(&self, task: &Task) -> RepoResult<()>;
    fn delete(&self, id: TaskId) -> RepoResult<()>;
    fn list(&self, query: &TaskListQuery) -> RepoResult<Page<Task>>;
}

/// SQLite-backed task repository over a borrowed connection.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is behind.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one this crate writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Looks up a task by caller-supplied text.
    ///
    /// Text that is not a positive integer yields `Ok(None)`, same as an
    /// unmatched id.
    pub fn get_by_raw_id(&self, raw_id: &str) -> RepoResult<Option<Task>> {
        match TaskId::parse(raw_id) {
            Some(id) => self.get_by_id(id),
            None => Ok(None),
        }
    }

    /// Applies a partial change in one statement and returns the stored row.
    ///
    /// `None` fields keep their stored value, so a concurrent change to the
    /// other field is not overwritten. `updated_at` is bumped as in `update`.
    ///
    /// # Errors
    /// - `Validation` when `description` is blank.
    /// - `NotFound` when no row has this id.
    pub fn update_fields(
        &self,
        id: TaskId,
        description: Option<&str>,
        status: Option<TaskStatus>,
    ) -> RepoResult<Task> {
        if description.is_some_and(|text| text.trim().is_empty()) {
            return Err(TaskValidationError::EmptyDescription.into());
        }

        let mut stmt = self.conn.prepare_cached(
            "UPDATE tasks
             SET
                description = COALESCE(?1, description),
                status = COALESCE(?2, status),
                updated_at = MAX(?3, updated_at + 1)
             WHERE id = ?4
             RETURNING id, description, status, created_at, updated_at;",
        )?;

        let mut rows = stmt.query(params![
            description,
            status.map(TaskStatus::as_str),
            now_epoch_ms(),
            id.get(),
        ])?;
        match rows.next()? {
            Some(row) => parse_task_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    /// Counts rows matching the query's search/status, ignoring pagination.
    pub fn count(&self, query: &TaskListQuery) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM tasks WHERE 1 = 1");
        let bind_values = query.push_filters(&mut sql);
        let total: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn save(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                description,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                task.description.as_str(),
                task.status.as_str(),
                task.created_at,
                task.updated_at,
            ],
        )?;

        let row_id = self.conn.last_insert_rowid();
        TaskId::new(row_id).map_err(|_| {
            RepoError::InvalidData(format!("store assigned non-positive row id {row_id}"))
        })
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn update(&self, task: &Task) -> RepoResult<()> {
        let id = task.id.ok_or(RepoError::MissingId)?;
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                description = ?1,
                status = ?2,
                updated_at = MAX(?3, updated_at + 1)
             WHERE id = ?4;",
            params![
                task.description.as_str(),
                task.status.as_str(),
                now_epoch_ms(),
                id.get(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.get()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list(&self, query: &TaskListQuery) -> RepoResult<Page<Task>> {
        let (page, per_page) = query.pagination()?;
        // Offsets past i64 are past the end of any table.
        let offset = i64::try_from(page_offset(page, per_page)).unwrap_or(i64::MAX);

        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values = query.push_filters(&mut sql);

        sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(per_page)));
        bind_values.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(Page::new(tasks, page, per_page))
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let raw_id: i64 = row.get("id")?;
    let id = TaskId::new(raw_id)
        .map_err(|_| RepoError::InvalidData(format!("invalid id `{raw_id}` in tasks.id")))?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let task = Task {
        id: Some(id),
        description: row.get("description")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()
        .map_err(|err| RepoError::InvalidData(format!("task {id}: {err}")))?;
    Ok(task)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{RepoError, TaskListQuery, DEFAULT_PER_PAGE};
    use rusqlite::types::Value;

    #[test]
    fn pagination_defaults_to_first_page() {
        let query = TaskListQuery::default();
        assert_eq!(query.pagination().unwrap(), (1, DEFAULT_PER_PAGE));
    }

    #[test]
    fn pagination_rejects_zero_values() {
        let zero_page = TaskListQuery {
            page: Some(0),
            ..TaskListQuery::default()
        };
        assert!(matches!(
            zero_page.pagination(),
            Err(RepoError::InvalidArgument(_))
        ));

        let zero_size = TaskListQuery {
            per_page: Some(0),
            ..TaskListQuery::default()
        };
        assert!(matches!(
            zero_size.pagination(),
            Err(RepoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn search_text_is_bound_untrimmed() {
        let query = TaskListQuery {
            search: Some(" milk".to_string()),
            ..TaskListQuery::default()
        };
        let mut sql = String::new();
        let bound = query.push_filters(&mut sql);
        assert_eq!(bound, vec![Value::Text(" milk".to_string())]);
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = TaskListQuery {
            search: Some("   ".to_string()),
            ..TaskListQuery::default()
        };
        let mut sql = String::new();
        assert!(query.push_filters(&mut sql).is_empty());
        assert!(sql.is_empty());
    }
}
