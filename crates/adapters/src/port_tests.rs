use super::*;

#[test]
fn task_fields_default_uses_needs_action_status() {
    let fields = TaskFields::default();
    assert_eq!(fields.status, TaskStatus::NeedsAction);
    assert_eq!(fields.priority, 0);
}
