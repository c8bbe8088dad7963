//! Behavior of composed security values against real request heads.

use std::sync::Arc;

use hermes_security::{
    ApiKeyIn, BasicCredentials, Credential, RequestHead, Security, SecurityError,
};
use http::{HeaderMap, Method};

fn head_with(credentials: &[(&str, Credential)]) -> Arc<RequestHead> {
    let security = basic_or_key();
    let bearer = Security::bearer("bearerAuth");
    let mut headers = HeaderMap::new();
    let mut query = Vec::new();
    for (scheme, credential) in credentials {
        let doc = security
            .scheme(scheme)
            .or_else(|| bearer.scheme(scheme))
            .unwrap();
        doc.inject(credential, &mut headers, &mut query).unwrap();
    }
    let uri = if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{}", serde_urlencoded::to_string(&query).unwrap())
    };
    Arc::new(RequestHead::new(Method::GET, uri.parse().unwrap(), headers))
}

#[derive(Debug, Clone, PartialEq)]
enum Who {
    User(String),
    Key(String),
}

fn basic_or_key() -> Security<Who> {
    Security::basic("basicAuth")
        .map(|creds: BasicCredentials| Who::User(creds.user))
        .or(Security::api_key("keyAuth", "api_key", ApiKeyIn::Query).map(Who::Key))
}

#[tokio::test]
async fn or_falls_back_to_right() {
    let security = basic_or_key();
    let who = security
        .extract(head_with(&[("keyAuth", Credential::api_key("k-1"))]))
        .await
        .unwrap();
    assert_eq!(who, Who::Key("k-1".to_string()));
}

#[tokio::test]
async fn or_prefers_left() {
    let security = basic_or_key();
    let who = security
        .extract(head_with(&[
            ("basicAuth", Credential::basic("ann", "pw")),
            ("keyAuth", Credential::api_key("k-1")),
        ]))
        .await
        .unwrap();
    assert_eq!(who, Who::User("ann".to_string()));
}

#[tokio::test]
async fn or_reports_right_failure() {
    let security = basic_or_key();
    let err = security.extract(head_with(&[])).await.unwrap_err();
    assert_eq!(err.scheme, "keyAuth");
}

#[tokio::test]
async fn and_requires_both() {
    let security = Security::bearer("bearerAuth")
        .and(Security::api_key("keyAuth", "api_key", ApiKeyIn::Query));

    let err = security
        .extract(head_with(&[("bearerAuth", Credential::bearer("t"))]))
        .await
        .unwrap_err();
    assert_eq!(err.scheme, "keyAuth");

    let err = security
        .extract(head_with(&[("keyAuth", Credential::api_key("k"))]))
        .await
        .unwrap_err();
    assert_eq!(err.scheme, "bearerAuth");

    let pair = security
        .extract(head_with(&[
            ("bearerAuth", Credential::bearer("t")),
            ("keyAuth", Credential::api_key("k")),
        ]))
        .await
        .unwrap();
    assert_eq!(pair, ("t".to_string(), "k".to_string()));
}

#[tokio::test]
async fn and_reports_left_failure() {
    let security = Security::bearer("bearerAuth")
        .and(Security::api_key("keyAuth", "api_key", ApiKeyIn::Query));
    let err = security.extract(head_with(&[])).await.unwrap_err();
    assert_eq!(err.scheme, "bearerAuth");
}

#[tokio::test]
async fn as_some_makes_branch_observable() {
    let security = Security::bearer("bearerAuth")
        .as_some()
        .or(Security::none().as_value(None));

    let token = security
        .extract(head_with(&[("bearerAuth", Credential::bearer("t"))]))
        .await
        .unwrap();
    assert_eq!(token.as_deref(), Some("t"));

    let anonymous = security.extract(head_with(&[])).await.unwrap();
    assert_eq!(anonymous, None);
    assert_eq!(
        security.requirements(),
        &[vec!["bearerAuth".to_string()], Vec::new()]
    );
}

#[tokio::test]
async fn map_effect_preserves_failure_and_docs() {
    let security = Security::bearer("bearerAuth").map_effect(|token| async move {
        tokio::task::yield_now().await;
        Ok::<_, SecurityError>(token.len())
    });

    assert_eq!(security.requirements(), &[vec!["bearerAuth".to_string()]]);
    let err = security.extract(head_with(&[])).await.unwrap_err();
    assert_eq!(err.scheme, "bearerAuth");

    let len = security
        .extract(head_with(&[("bearerAuth", Credential::bearer("abcd"))]))
        .await
        .unwrap();
    assert_eq!(len, 4);
}
