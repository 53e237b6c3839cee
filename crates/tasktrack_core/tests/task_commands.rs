use tasktrack_core::db::open_db_in_memory;
use tasktrack_core::{
    Command, CommandError, CreateTask, DeleteTask, ListTasks, TaskChanges, TaskId,
    TaskListQuery, TaskQueryById, TaskStatus, UpdateTask, DEFAULT_PER_PAGE,
};

#[test]
fn create_then_query_by_id_roundtrips() {
    let conn = open_db_in_memory().unwrap();

    let created = CreateTask::new(&conn, "buy milk", None).execute().unwrap();
    let id = created.id.unwrap();
    assert_eq!(created.status, TaskStatus::Todo);

    let found = TaskQueryById::new(&conn, id).execute().unwrap();
    assert_eq!(found, created);

    let by_text = TaskQueryById::new(&conn, id.to_string()).execute().unwrap();
    assert_eq!(by_text, created);
}

#[test]
fn create_rejects_blank_description_without_touching_storage() {
    let conn = open_db_in_memory().unwrap();

    let err = CreateTask::new(&conn, " \t", None).execute().unwrap_err();
    assert!(matches!(err, CommandError::InvalidArgument(_)));
    assert_eq!(err.kind(), "invalid_argument");

    let page = ListTasks::new(&conn, TaskListQuery::default())
        .execute()
        .unwrap();
    assert!(page.is_empty());
}

#[test]
fn query_by_id_distinguishes_invalid_argument_from_not_found() {
    let conn = open_db_in_memory().unwrap();
    CreateTask::new(&conn, "test", None).execute().unwrap();

    for raw in [None, Some("fake id"), Some("0"), Some("-3")] {
        let err = TaskQueryById::new(&conn, raw).execute().unwrap_err();
        assert!(
            matches!(err, CommandError::InvalidArgument(_)),
            "unexpected error for {raw:?}: {err}"
        );
    }

    let missing = TaskId::new(404).unwrap();
    let err = TaskQueryById::new(&conn, missing).execute().unwrap_err();
    assert!(matches!(err, CommandError::NotFound(id) if id == missing));
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn update_applies_partial_changes_and_returns_stored_task() {
    let conn = open_db_in_memory().unwrap();
    let created = CreateTask::new(&conn, "draft", None).execute().unwrap();
    let id = created.id.unwrap();

    let started = UpdateTask::new(&conn, id, TaskChanges::status(TaskStatus::InProgress))
        .execute()
        .unwrap();
    assert_eq!(started.description, "draft");
    assert_eq!(started.status, TaskStatus::InProgress);
    assert_eq!(started.created_at, created.created_at);
    assert!(started.updated_at > created.updated_at);

    let renamed = UpdateTask::new(
        &conn,
        id,
        TaskChanges {
            description: Some("final".to_string()),
            status: None,
        },
    )
    .execute()
    .unwrap();
    assert_eq!(renamed.description, "final");
    assert_eq!(renamed.status, TaskStatus::InProgress);
    assert!(renamed.updated_at > started.updated_at);
}

#[test]
fn update_failures_are_typed() {
    let conn = open_db_in_memory().unwrap();
    let id = CreateTask::new(&conn, "test", None)
        .execute()
        .unwrap()
        .id
        .unwrap();

    let empty = UpdateTask::new(&conn, id, TaskChanges::default())
        .execute()
        .unwrap_err();
    assert!(matches!(empty, CommandError::InvalidArgument(_)));

    let malformed = UpdateTask::new(&conn, "abc", TaskChanges::status(TaskStatus::Done))
        .execute()
        .unwrap_err();
    assert!(matches!(malformed, CommandError::InvalidArgument(_)));

    let missing = TaskId::new(99).unwrap();
    let absent = UpdateTask::new(&conn, missing, TaskChanges::status(TaskStatus::Done))
        .execute()
        .unwrap_err();
    assert!(matches!(absent, CommandError::NotFound(found) if found == missing));
}

#[test]
fn delete_then_delete_again_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let id = CreateTask::new(&conn, "test", None)
        .execute()
        .unwrap()
        .id
        .unwrap();

    assert_eq!(DeleteTask::new(&conn, id).execute().unwrap(), id);

    let lookup = TaskQueryById::new(&conn, id).execute().unwrap_err();
    assert!(matches!(lookup, CommandError::NotFound(_)));
    let again = DeleteTask::new(&conn, id).execute().unwrap_err();
    assert!(matches!(again, CommandError::NotFound(found) if found == id));
}

#[test]
fn list_validates_pagination_and_filters() {
    let conn = open_db_in_memory().unwrap();
    let milk = CreateTask::new(&conn, "buy milk", None).execute().unwrap();
    CreateTask::new(&conn, "write report", Some(TaskStatus::Done))
        .execute()
        .unwrap();

    let page = ListTasks::new(
        &conn,
        TaskListQuery {
            status: Some(TaskStatus::Todo),
            ..TaskListQuery::default()
        },
    )
    .execute()
    .unwrap();
    assert_eq!(page.items, vec![milk]);
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, DEFAULT_PER_PAGE);

    let err = ListTasks::new(
        &conn,
        TaskListQuery {
            per_page: Some(0),
            ..TaskListQuery::default()
        },
    )
    .execute()
    .unwrap_err();
    assert!(matches!(err, CommandError::InvalidArgument(_)));
}

#[test]
fn storage_failures_surface_as_storage_failure() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();

    let err = CreateTask::new(&conn, "no schema", None)
        .execute()
        .unwrap_err();
    assert!(matches!(err, CommandError::StorageFailure(_)));
    assert_eq!(err.kind(), "storage_failure");
}
