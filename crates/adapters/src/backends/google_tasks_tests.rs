use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::transport::TransportConfig;

fn backend(server: &MockServer) -> GoogleTasksBackend {
    let transport = Transport::new("gmail", reqwest::Client::new(), TransportConfig::default());
    GoogleTasksBackend::with_api_base("gmail", server.uri(), "access-token", transport)
}

fn google_task_json(id: &str, status: &str, due: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": "Call dentist",
        "notes": null,
        "status": status,
        "due": due,
        "etag": "etag-1",
        "updated": "2026-07-01T00:00:00Z",
    })
}

#[tokio::test]
async fn list_tasks_maps_needs_action_status_and_due_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [google_task_json("t1", "needsAction", Some("2026-08-05T00:00:00.000Z"))],
        })))
        .mount(&server)
        .await;

    let tasks = backend(&server).list_tasks("l1").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::NeedsAction);
    assert_eq!(tasks[0].remote_list_id, "l1");
    assert_eq!(tasks[0].due_at.unwrap().date_naive(), chrono::NaiveDate::from_ymd_opt(2026, 8, 5).unwrap());
}

#[tokio::test]
async fn list_tasks_maps_completed_status_and_missing_due() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [google_task_json("t2", "completed", None)],
        })))
        .mount(&server)
        .await;

    let tasks = backend(&server).list_tasks("l1").await.unwrap();
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert!(tasks[0].due_at.is_none());
}

#[tokio::test]
async fn auth_failure_is_classified_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/users/@me/lists")).respond_with(ResponseTemplate::new(401)).mount(&server).await;

    let err = backend(&server).list_lists().await.unwrap_err();
    assert_eq!(err.kind, tsk_core::ErrorKind::Auth);
}

#[test]
fn capabilities_exclude_priorities_and_start_dates() {
    let transport = Transport::new("gmail", reqwest::Client::new(), TransportConfig::default());
    let caps = GoogleTasksBackend::new("gmail", "token", transport).capabilities();
    assert!(!caps.priorities);
    assert!(!caps.start_dates);
    assert!(caps.subtasks);
}
