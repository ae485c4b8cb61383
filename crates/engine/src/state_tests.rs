use super::*;
use tsk_core::ErrorKind;

#[test]
fn display_matches_snake_case_names() {
    assert_eq!(SyncStage::Pulling.to_string(), "pulling");
    assert_eq!(SyncStage::Settling.to_string(), "settling");
}

#[test]
fn sync_error_display_names_backend_and_stage() {
    let err = SyncError::new(SyncStage::Pushing, "home-caldav", tsk_core::Error::new(ErrorKind::Auth, "token expired"));
    let text = err.to_string();
    assert!(text.contains("home-caldav"));
    assert!(text.contains("pushing"));
    assert!(text.contains("token expired"));
}
