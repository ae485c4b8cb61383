use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn fast_config() -> TransportConfig {
    TransportConfig { base_delay: Duration::from_millis(1), max_delay: Duration::from_millis(10), max_retries: 3, jitter: false }
}

#[test]
fn parse_retry_after_accepts_integer_seconds() {
    assert_eq!(parse_retry_after("5"), Some(Duration::from_secs(5)));
}

#[test]
fn parse_retry_after_rejects_garbage() {
    assert_eq!(parse_retry_after("not-a-duration"), None);
}

#[test]
fn parse_retry_after_collapses_past_dates_to_zero() {
    let past = "Sun, 06 Nov 1994 08:49:37 GMT";
    assert_eq!(parse_retry_after(past), Some(Duration::ZERO));
}

#[tokio::test]
async fn send_retries_on_429_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = Transport::new("home", reqwest::Client::new(), fast_config());
    let url = format!("{}/tasks", server.uri());
    let cancel = CancellationToken::new();

    let response = transport.send(|| transport.client().get(&url), &cancel).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(transport.stats().count(), 1);
}

#[tokio::test]
async fn send_fails_after_exhausting_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/tasks")).respond_with(ResponseTemplate::new(429)).mount(&server).await;

    let transport = Transport::new("home", reqwest::Client::new(), fast_config());
    let url = format!("{}/tasks", server.uri());
    let cancel = CancellationToken::new();

    let err = transport.send(|| transport.client().get(&url), &cancel).await.unwrap_err();
    assert_eq!(err.kind, tsk_core::ErrorKind::RateLimited);
    assert_eq!(transport.stats().count(), 4);
}

#[tokio::test]
async fn send_passes_through_non_429_status_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/tasks")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let transport = Transport::new("home", reqwest::Client::new(), fast_config());
    let url = format!("{}/tasks", server.uri());
    let cancel = CancellationToken::new();

    let response = transport.send(|| transport.client().get(&url), &cancel).await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn send_respects_cancellation() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/tasks")).respond_with(ResponseTemplate::new(429)).mount(&server).await;

    let transport = Transport::new("home", reqwest::Client::new(), fast_config());
    let url = format!("{}/tasks", server.uri());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = transport.send(|| transport.client().get(&url), &cancel).await.unwrap_err();
    assert_eq!(err.kind, tsk_core::ErrorKind::Cancelled);
}
