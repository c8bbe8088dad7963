//! Substitution and matching must agree for every well-formed value set.

use hermes_router::{Params, PathTemplate, Router};
use http::Method;
use proptest::prelude::*;

fn segment_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.~%/-]{1,12}"
}

proptest! {
    #[test]
    fn substitute_then_match_recovers_values(
        id in segment_value(),
        tab in proptest::option::of(segment_value()),
    ) {
        let template = PathTemplate::parse("/users/:id/:tab?").unwrap();

        let mut values = Params::new();
        values.push("id", id.clone());
        if let Some(tab) = &tab {
            values.push("tab", tab.clone());
        }

        let path = template.substitute(&values).unwrap();
        let matched = template.match_path(&path).unwrap();
        prop_assert_eq!(matched.get("id"), Some(id.as_str()));
        prop_assert_eq!(matched.get("tab"), tab.as_deref());

        let mut router = Router::new();
        router.route(Method::GET, &template, "getUser").unwrap();
        let routed = router.match_route(&Method::GET, &path).unwrap();
        prop_assert_eq!(routed.operation_id, "getUser");
        prop_assert_eq!(routed.params, matched);
    }
}

#[test]
fn test_router_mixed_api() {
    let mut router = Router::new();
    for (method, path, op) in [
        (Method::GET, "/users", "listUsers"),
        (Method::POST, "/users", "createUser"),
        (Method::GET, "/users/me", "me"),
        (Method::GET, "/users/:id/:tab?", "getUser"),
        (Method::DELETE, "/users/:id", "deleteUser"),
    ] {
        let template = PathTemplate::parse(path).unwrap();
        router.route(method, &template, op).unwrap();
    }

    assert_eq!(router.len(), 5);
    assert_eq!(
        router.match_route(&Method::GET, "/users/me").unwrap().operation_id,
        "me"
    );
    assert_eq!(
        router.match_route(&Method::GET, "/users/5/posts").unwrap().operation_id,
        "getUser"
    );
    assert_eq!(
        router.match_route(&Method::DELETE, "/users/5").unwrap().operation_id,
        "deleteUser"
    );
    assert!(router.match_route(&Method::DELETE, "/users/5/posts").is_none());
    assert_eq!(
        router.allowed_methods("/users/5"),
        Some(vec![Method::GET, Method::DELETE])
    );
}
