use tempfile::TempDir;

use super::*;

fn backend() -> (TempDir, PlainMarkdownBackend) {
    let dir = tempfile::tempdir().unwrap();
    let backend = PlainMarkdownBackend::new("notes", dir.path());
    (dir, backend)
}

fn fields(summary: &str) -> TaskFields {
    TaskFields { summary: summary.to_string(), ..TaskFields::default() }
}

#[tokio::test]
async fn create_then_list_round_trips() {
    let (_dir, backend) = backend();
    backend.create_list("groceries").await.unwrap();
    let created = backend.create_task("groceries.md", &fields("Buy milk")).await.unwrap();
    assert_eq!(created.remote_id, "1");
    assert_eq!(created.status, TaskStatus::NeedsAction);

    let tasks = backend.list_tasks("groceries.md").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].summary, "Buy milk");
}

#[tokio::test]
async fn update_marks_completed() {
    let (_dir, backend) = backend();
    backend.create_list("groceries").await.unwrap();
    let created = backend.create_task("groceries.md", &fields("Buy milk")).await.unwrap();
    let mut update = fields("Buy milk");
    update.status = TaskStatus::Completed;
    let updated = backend.update_task("groceries.md", &created.remote_id, &update).await.unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
}

#[tokio::test]
async fn delete_blanks_line_without_shifting_others() {
    let (_dir, backend) = backend();
    backend.create_list("groceries").await.unwrap();
    let first = backend.create_task("groceries.md", &fields("Buy milk")).await.unwrap();
    let second = backend.create_task("groceries.md", &fields("Buy eggs")).await.unwrap();

    backend.delete_task("groceries.md", &first.remote_id).await.unwrap();

    assert!(backend.get_task("groceries.md", &first.remote_id).await.unwrap().is_none());
    let still_there = backend.get_task("groceries.md", &second.remote_id).await.unwrap().unwrap();
    assert_eq!(still_there.summary, "Buy eggs");
}

#[tokio::test]
async fn etag_changes_when_line_text_changes() {
    let (_dir, backend) = backend();
    backend.create_list("groceries").await.unwrap();
    let created = backend.create_task("groceries.md", &fields("Buy milk")).await.unwrap();
    let mut update = fields("Buy oat milk");
    update.status = TaskStatus::NeedsAction;
    let updated = backend.update_task("groceries.md", &created.remote_id, &update).await.unwrap();
    assert_ne!(created.etag, updated.etag);
}

#[tokio::test]
async fn list_lists_only_returns_markdown_files() {
    let (dir, backend) = backend();
    backend.create_list("groceries").await.unwrap();
    std::fs::write(dir.path().join("README.txt"), "ignore me").unwrap();

    let lists = backend.list_lists().await.unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "groceries");
}

#[test]
fn capabilities_are_minimal() {
    let (_dir, backend) = backend();
    assert_eq!(backend.capabilities(), Capabilities::minimal());
}
