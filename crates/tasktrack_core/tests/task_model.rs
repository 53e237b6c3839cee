use tasktrack_core::{Page, Task, TaskId, TaskStatus, TaskValidationError};

#[test]
fn task_new_sets_defaults() {
    let task = Task::new("hello").unwrap();

    assert_eq!(task.id, None);
    assert!(!task.is_persisted());
    assert_eq!(task.description, "hello");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.created_at, task.updated_at);
    assert!(task.created_at > 0);
}

#[test]
fn task_rejects_blank_description() {
    assert_eq!(
        Task::new("   ").unwrap_err(),
        TaskValidationError::EmptyDescription
    );
}

#[test]
fn validate_rejects_updated_before_created() {
    let mut task = Task::with_status("meeting", TaskStatus::Done).unwrap();
    task.updated_at = task.created_at - 1;

    assert_eq!(
        task.validate().unwrap_err(),
        TaskValidationError::UpdatedBeforeCreated {
            created_at: task.created_at,
            updated_at: task.created_at - 1,
        }
    );
}

#[test]
fn task_id_rejects_non_positive_values() {
    assert_eq!(
        TaskId::new(0).unwrap_err(),
        TaskValidationError::NonPositiveId(0)
    );
    assert!("fake id".parse::<TaskId>().is_err());
    assert_eq!("3".parse::<TaskId>().unwrap().get(), 3);
}

#[test]
fn status_text_forms_are_stable() {
    for status in TaskStatus::ALL {
        assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(TaskStatus::InProgress.to_string(), "IN_PROGRESS");
    assert_eq!(TaskStatus::default(), TaskStatus::Todo);
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let mut task = Task::with_status("ship it", TaskStatus::InProgress).unwrap();
    task.id = Some(TaskId::new(5).unwrap());

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], 5);
    assert_eq!(json["description"], "ship it");
    assert_eq!(json["status"], "IN_PROGRESS");
    assert_eq!(json["created_at"], task.created_at);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn deserialize_rejects_non_positive_id_and_unknown_status() {
    let bad_id = serde_json::json!({
        "id": 0,
        "description": "x",
        "status": "TODO",
        "created_at": 1,
        "updated_at": 1
    });
    assert!(serde_json::from_value::<Task>(bad_id).is_err());

    let bad_status = serde_json::json!({
        "id": 1,
        "description": "x",
        "status": "BLOCKED",
        "created_at": 1,
        "updated_at": 1
    });
    assert!(serde_json::from_value::<Task>(bad_status).is_err());
}

#[test]
fn page_reports_its_offset() {
    let page: Page<Task> = Page::new(Vec::new(), 3, 10);
    assert!(page.is_empty());
    assert_eq!(page.offset(), 20);
}
