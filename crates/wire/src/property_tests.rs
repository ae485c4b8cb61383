use proptest::prelude::*;

use crate::Request;

proptest! {
    #[test]
    fn notify_data_round_trips_for_any_backend_name(name in "[a-zA-Z0-9_-]{0,64}") {
        let req = Request::Notify { data: Some(name) };
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(req, back);
    }
}
