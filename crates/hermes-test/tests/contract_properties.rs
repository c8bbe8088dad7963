//! Client and server codecs exercised against each other in memory.

use async_trait::async_trait;
use bytes::Bytes;
use hermes_client::{
    Client, ClientError, ClientSideError, RequestEncoder, Transport, TransportError,
};
use hermes_core::{
    Api, ContractError, Endpoint, ErrorReporting, ParseOptions, Reply, Representation,
    ResponseSpec, Schema,
};
use hermes_security::{ApiKeyIn, BasicCredentials, Credentials, Security};
use hermes_server::{App, HandlerError, ServerConfig};
use hermes_test::{InMemoryTransport, TestClient};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response, StatusCode};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "name")]
enum Caller {
    User(String),
    Service(String),
}

fn api() -> Api {
    Api::new("Properties")
        .add_endpoint(
            Endpoint::post("echo", "/things/:id")
                .path(Schema::object().field("id", Schema::integer_from_string()))
                .query(
                    Schema::object()
                        .field("page", Schema::integer_from_string())
                        .field("tag", Schema::array(Schema::string())),
                )
                .headers(Schema::object().field("x-trace", Schema::string()))
                .body(
                    Schema::object()
                        .field("name", Schema::string())
                        .optional_field("score", Schema::number()),
                )
                .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::any()))
                .build()
                .unwrap(),
        )
        .unwrap()
        .add_endpoint(
            Endpoint::get("getStuff", "/stuff/:param/:another?")
                .path(
                    Schema::object()
                        .field("param", Schema::string())
                        .optional_field("another", Schema::string()),
                )
                .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::any()))
                .build()
                .unwrap(),
        )
        .unwrap()
        .add_endpoint(
            Endpoint::post("createUser", "/users")
                .body(Schema::object().field("name", Schema::string()))
                .security(
                    Security::basic("basicAuth")
                        .map(|c: BasicCredentials| Caller::User(c.user))
                        .or(Security::api_key("keyAuth", "x-api-key", ApiKeyIn::Header)
                            .map(Caller::Service)),
                )
                .response(
                    ResponseSpec::new(StatusCode::CREATED)
                        .with_body(Schema::any())
                        .with_headers(Schema::object().field("location", Schema::string())),
                )
                .response(ResponseSpec::new(StatusCode::ACCEPTED))
                .build()
                .unwrap(),
        )
        .unwrap()
        .add_endpoint(
            Endpoint::delete("purge", "/purge")
                .security(
                    Security::bearer("bearerAuth")
                        .and(Security::api_key("keyAuth", "api_key", ApiKeyIn::Query)),
                )
                .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::any()))
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

fn app_with(config: ServerConfig) -> App {
    App::builder(api())
        .config(config)
        .handle("echo", |input: Value, _: ()| async move {
            Ok::<_, HandlerError>(input)
        })
        .handle("getStuff", |input: Value, _: ()| async move {
            Ok::<_, HandlerError>(input["path"].clone())
        })
        .handle("createUser", |input: Value, caller: Caller| async move {
            if input["body"]["name"] == "later" {
                return Ok::<_, HandlerError>(Reply::new(202, Value::Null));
            }
            Ok(Reply::new(201, json!(caller)).with_headers(json!({"location": "/users/1"})))
        })
        .handle("purge", |_: Value, (token, key): (String, String)| async move {
            Ok::<_, HandlerError>(json!([token, key]))
        })
        .handle("motd", |_: Value, _: ()| async { Ok::<_, HandlerError>("hello") })
        .build()
        .unwrap()
}

fn app() -> App {
    app_with(ServerConfig::default())
}

fn client() -> Client {
    TestClient::new(app()).contract()
}

/// Passes requests to an app and rewrites its responses.
struct Rewrite<F> {
    inner: InMemoryTransport,
    rewrite: F,
}

#[async_trait]
impl<F> Transport for Rewrite<F>
where
    F: Fn(&mut Response<Bytes>) + Send + Sync + 'static,
{
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let mut response = self.inner.send(request).await?;
        (self.rewrite)(&mut response);
        Ok(response)
    }
}

fn rewriting_client<F>(rewrite: F) -> Client
where
    F: Fn(&mut Response<Bytes>) + Send + Sync + 'static,
{
    let transport = Rewrite {
        inner: InMemoryTransport::new(app()),
        rewrite,
    };
    Client::new(api(), transport)
}

#[tokio::test]
async fn every_slot_round_trips() {
    let input = json!({
        "path": {"id": 42},
        "query": {"page": 2, "tag": ["a", "b"]},
        "headers": {"x-trace": "abc"},
        "body": {"name": "Ada", "score": 1.5},
    });
    let echoed = client().call("echo").input(&input).send_value().await.unwrap();
    assert_eq!(echoed, input);

    let input = json!({
        "path": {"id": 7},
        "query": {"page": 1, "tag": ["only"]},
        "headers": {"x-trace": "t"},
        "body": {"name": "Grace"},
    });
    let echoed = client().call("echo").input(&input).send_value().await.unwrap();
    assert_eq!(echoed, input);

    let input = json!({
        "path": {"id": 9},
        "query": {"page": 3, "tag": []},
        "headers": {"x-trace": "e"},
        "body": {"name": "Edsger"},
    });
    let echoed = client().call("echo").input(&input).send_value().await.unwrap();
    assert_eq!(echoed, input);
}

#[tokio::test]
async fn every_declared_status_is_reachable() {
    let reply: Reply = client()
        .call("createUser")
        .input(&json!({"body": {"name": "Ada"}}))
        .basic("basicAuth", "ada", "pw")
        .send()
        .await
        .unwrap();
    assert_eq!(reply.status, 201);
    assert_eq!(reply.body, json!({"kind": "User", "name": "ada"}));
    assert_eq!(reply.headers, json!({"location": "/users/1"}));

    let reply: Reply = client()
        .call("createUser")
        .input(&json!({"body": {"name": "later"}}))
        .basic("basicAuth", "ada", "pw")
        .send()
        .await
        .unwrap();
    assert_eq!(reply.status, 202);
    assert_eq!(reply.body, Value::Null);
}

#[tokio::test]
async fn undeclared_status_is_client_side() {
    let client = rewriting_client(|response| *response.status_mut() = StatusCode::NO_CONTENT);
    let err = client
        .call("createUser")
        .input(&json!({"body": {"name": "Ada"}}))
        .api_key("keyAuth", "k")
        .send_value()
        .await
        .unwrap_err();
    assert!(err.is_client_side());
    match err {
        ClientError::Client(ClientSideError::UnexpectedStatus { status, allowed, .. }) => {
            assert_eq!(status, 204);
            assert_eq!(allowed, vec![201, 202]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn optional_path_segment() {
    let test = TestClient::new(app());

    let absent = test
        .contract()
        .call("getStuff")
        .input(&json!({"path": {"param": "value"}}))
        .send_value()
        .await
        .unwrap();
    assert_eq!(absent, json!({"param": "value"}));

    let endpoint = test.app().api().endpoint("getStuff").unwrap().clone();
    let request = RequestEncoder::new(ParseOptions::default())
        .encode(&endpoint, &json!({"path": {"param": "value"}}), &Credentials::new())
        .unwrap();
    assert_eq!(request.uri(), "/stuff/value");

    let present = test
        .contract()
        .call("getStuff")
        .input(&json!({"path": {"param": "value", "another": "more"}}))
        .send_value()
        .await
        .unwrap();
    assert_eq!(present, json!({"param": "value", "another": "more"}));
}

#[tokio::test]
async fn query_array_coercion() {
    let test = TestClient::new(app());
    let single = test
        .post("/things/1?page=1&tag=a")
        .header("x-trace", "t")
        .json(&json!({"name": "n"}))
        .send()
        .await
        .unwrap();
    single.assert_status(StatusCode::OK);
    assert_eq!(single.json_value().unwrap()["query"]["tag"], json!(["a"]));

    let many = test
        .post("/things/1?page=1&tag=a&tag=b")
        .header("x-trace", "t")
        .json(&json!({"name": "n"}))
        .send()
        .await
        .unwrap();
    assert_eq!(many.json_value().unwrap()["query"]["tag"], json!(["a", "b"]));
}

#[tokio::test]
async fn security_or_falls_back_to_right() {
    let reply: Reply = client()
        .call("createUser")
        .input(&json!({"body": {"name": "Ada"}}))
        .api_key("keyAuth", "svc")
        .send()
        .await
        .unwrap();
    assert_eq!(reply.body, json!({"kind": "Service", "name": "svc"}));

    let err = client()
        .call("createUser")
        .input(&json!({"body": {"name": "Ada"}}))
        .send_value()
        .await
        .unwrap_err();
    assert!(err.is_server_side());
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    let ClientError::Server(server_err) = err else {
        panic!("expected server-side error");
    };
    let envelope = server_err.envelope().unwrap();
    assert_eq!(envelope.error.code, "AUTHENTICATION_ERROR");
    assert_eq!(server_err.body["error"]["details"]["scheme"], "keyAuth");
}

#[tokio::test]
async fn security_and_requires_both() {
    let pair = client()
        .call("purge")
        .bearer("bearerAuth", "t0k")
        .api_key("keyAuth", "k3y")
        .send_value()
        .await
        .unwrap();
    assert_eq!(pair, json!(["t0k", "k3y"]));

    let missing_key = client()
        .call("purge")
        .bearer("bearerAuth", "t0k")
        .send_value()
        .await
        .unwrap_err();
    assert_eq!(missing_key.status(), Some(StatusCode::UNAUTHORIZED));

    let missing_token = client()
        .call("purge")
        .api_key("keyAuth", "k3y")
        .send_value()
        .await
        .unwrap_err();
    let ClientError::Server(server_err) = missing_token else {
        panic!("expected server-side error");
    };
    assert_eq!(server_err.body["error"]["details"]["scheme"], "bearerAuth");
}

#[test]
fn duplicate_operation_id_is_rejected() {
    let err = api()
        .add_endpoint(Endpoint::get("motd", "/motd2").build().unwrap())
        .unwrap_err();
    assert!(matches!(err, ContractError::DuplicateOperationId { .. }));
}

#[tokio::test]
async fn representation_negotiation() {
    let motd: String = client().call("motd").send().await.unwrap();
    assert_eq!(motd, "hello");

    let client = rewriting_client(|response| {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
    });
    let motd: String = client.call("motd").send().await.unwrap();
    assert_eq!(motd, "hello");

    let client = rewriting_client(|response| {
        response.headers_mut().remove(CONTENT_TYPE);
    });
    let motd: String = client.call("motd").send().await.unwrap();
    assert_eq!(motd, "hello");
}

#[tokio::test]
async fn first_error_mode_reports_one_slot() {
    let test = TestClient::new(app_with(
        ServerConfig::builder().errors(ErrorReporting::First).build(),
    ));
    let response = test
        .post("/things/x?page=y")
        .json(&json!({"name": 1}))
        .send()
        .await
        .unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("VALIDATION_ERROR");
    assert_eq!(response.json_value().unwrap()["error"]["details"]["location"], "path");

    let all = TestClient::new(app())
        .post("/things/x?page=y")
        .json(&json!({"name": 1}))
        .send()
        .await
        .unwrap();
    let errors = &all.json_value().unwrap()["error"]["details"]["errors"];
    assert_eq!(errors.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn encode_failure_is_client_side() {
    let err = client()
        .call("echo")
        .input(&json!({"path": {"id": "nope"}}))
        .send_value()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Client(ClientSideError::Encode { .. })));
    assert!(!err.is_retryable());
}
