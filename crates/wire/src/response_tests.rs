use super::*;

#[test]
fn ok_response_omits_error_only_fields() {
    let resp = Response::ok(true);
    let json = serde_json::to_string(&resp).unwrap();
    assert!(!json.contains("message"));
    assert!(json.contains(r#""running":true"#));
}

#[test]
fn error_response_round_trips() {
    let resp = Response::error("backend auth failed");
    assert!(!resp.is_ok());
    let json = serde_json::to_string(&resp).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(resp, back);
}

#[test]
fn backend_states_serializes_as_map() {
    let mut resp = Response::ok(true);
    resp.sync_count = Some(3);
    resp.backend_states = Some(BTreeMap::from([(
        "home".to_string(),
        BackendState {
            sync_count: 3,
            error_count: 0,
            last_sync: None,
            last_error: None,
            healthy: true,
        },
    )]));
    let json = serde_json::to_value(&resp).unwrap();
    assert!(json["backend_states"]["home"]["healthy"].as_bool().unwrap());
}
