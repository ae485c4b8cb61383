use tsk_core::BackendConfig;

use super::*;

#[test]
fn plain_markdown_requires_a_path() {
    let config = BackendConfig { kind: BackendKind::PlainMarkdown, ..BackendConfig::default() };
    let err = build("notes", &config).unwrap_err();
    assert!(err.message.contains("path"));
}

#[test]
fn plain_markdown_builds_with_a_path() {
    let config = BackendConfig { kind: BackendKind::PlainMarkdown, path: Some("/tmp/tasks".to_string()), ..BackendConfig::default() };
    let backend = build("notes", &config).unwrap();
    assert_eq!(backend.id(), "notes");
}

#[test]
fn caldav_requires_host_username_and_token() {
    let config = BackendConfig { kind: BackendKind::Caldav, ..BackendConfig::default() };
    assert!(build("home", &config).is_err());

    let config = BackendConfig {
        kind: BackendKind::Caldav,
        host: Some("https://caldav.example.com".to_string()),
        username: Some("me".to_string()),
        token: Some("secret".to_string()),
        ..BackendConfig::default()
    };
    let backend = build("home", &config).unwrap();
    assert_eq!(backend.id(), "home");
}
