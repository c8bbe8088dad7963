//! Client calls against a mock HTTP server.

use hermes_client::{Client, ClientError, ClientSideError, ReqwestTransport};
use hermes_core::{Api, Endpoint, Reply, Representation, ResponseSpec, Schema};
use hermes_security::{ApiKeyIn, Security};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize)]
struct GetUser {
    path: UserPath,
}

#[derive(Debug, Serialize)]
struct UserPath {
    id: i64,
}

#[derive(Debug, PartialEq, Deserialize)]
struct User {
    id: i64,
    name: String,
}

fn api() -> Api {
    Api::new("Users")
        .add_endpoint(
            Endpoint::get("getUser", "/users/:id")
                .path(Schema::object().field("id", Schema::integer_from_string()))
                .security(Security::api_key("keyAuth", "api_key", ApiKeyIn::Query))
                .response(
                    ResponseSpec::new(StatusCode::OK).with_body(
                        Schema::object()
                            .field("id", Schema::integer())
                            .field("name", Schema::string()),
                    ),
                )
                .build()
                .unwrap(),
        )
        .unwrap()
        .add_endpoint(
            Endpoint::post("createUser", "/users")
                .body(Schema::object().field("name", Schema::string()))
                .security(Security::basic("basicAuth"))
                .response(
                    ResponseSpec::new(StatusCode::CREATED)
                        .with_body(Schema::object().field("id", Schema::integer()))
                        .with_headers(Schema::object().field("location", Schema::string())),
                )
                .response(ResponseSpec::new(StatusCode::ACCEPTED))
                .build()
                .unwrap(),
        )
        .unwrap()
        .add_endpoint(
            Endpoint::get("motd", "/motd")
                .response(
                    ResponseSpec::new(StatusCode::OK)
                        .with_body(Schema::string())
                        .with_representations(vec![
                            Representation::plain_text(),
                            Representation::json(),
                        ]),
                )
                .build()
                .unwrap(),
        )
        .unwrap()
}

async fn client(server: &MockServer) -> Client {
    Client::new(api(), ReqwestTransport::new(server.uri()).unwrap())
}

#[tokio::test]
async fn get_with_query_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .and(query_param("api_key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "name": "Ada"})))
        .mount(&server)
        .await;

    let user: User = client(&server)
        .await
        .call("getUser")
        .input(&GetUser {
            path: UserPath { id: 42 },
        })
        .api_key("keyAuth", "secret")
        .send()
        .await
        .unwrap();
    assert_eq!(
        user,
        User {
            id: 42,
            name: "Ada".into()
        }
    );
}

#[tokio::test]
async fn post_full_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("authorization", "Basic YWRhOnB3"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Ada"})))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("location", "/users/1")
                .set_body_json(json!({"id": 1})),
        )
        .mount(&server)
        .await;

    let reply: Reply = client(&server)
        .await
        .call("createUser")
        .input(&json!({"body": {"name": "Ada"}}))
        .basic("basicAuth", "ada", "pw")
        .send()
        .await
        .unwrap();
    assert_eq!(reply.status, 201);
    assert_eq!(reply.body, json!({"id": 1}));
    assert_eq!(reply.headers, json!({"location": "/users/1"}));
}

#[tokio::test]
async fn server_failure_is_server_side() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NOT_FOUND", "message": "no user", "category": "not_found"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .call("getUser")
        .input(&json!({"path": {"id": 7}}))
        .send_value()
        .await
        .unwrap_err();
    assert!(err.is_server_side());
    assert!(!err.is_retryable());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    let ClientError::Server(server_err) = err else {
        panic!("expected server-side error");
    };
    assert_eq!(server_err.body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn undeclared_status_is_client_side() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .call("createUser")
        .input(&json!({"body": {"name": "Ada"}}))
        .send_value()
        .await
        .unwrap_err();
    match err {
        ClientError::Client(ClientSideError::UnexpectedStatus { status, allowed, .. }) => {
            assert_eq!(status, 200);
            assert_eq!(allowed, vec![201, 202]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn representation_negotiation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/motd"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello", "text/plain"))
        .mount(&server)
        .await;

    let motd: String = client(&server).await.call("motd").send().await.unwrap();
    assert_eq!(motd, "hello");
}

#[tokio::test]
async fn encode_failure_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .call("createUser")
        .input(&json!({"body": {"name": 5}}))
        .send_value()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Client(ClientSideError::Encode { .. })));
}

#[tokio::test]
async fn connection_failure_is_retryable() {
    let transport = ReqwestTransport::new("http://127.0.0.1:1").unwrap();
    let err = Client::new(api(), transport)
        .call("motd")
        .send::<Value>()
        .await
        .unwrap_err();
    assert!(err.is_client_side());
    assert!(err.is_retryable());
}
