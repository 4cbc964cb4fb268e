//! Integration tests running the client against a mock HTTP server.

use std::collections::BTreeMap;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hookhttp_client::HttpClient;
use hookhttp_core::config::{BaseUrl, ClientConfig, LoggingConfig, TransportConfig};
use hookhttp_core::error::ErrorKind;
use hookhttp_core::types::{Method, RequestDescriptor};
use hookhttp_plugin::prelude::*;

fn config_for(base_url: BaseUrl) -> ClientConfig {
    ClientConfig {
        base_url: Some(base_url),
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn test_get_through_plugins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos/1"))
        .and(header("x-client", "hookhttp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "done": false })))
        .expect(1)
        .mount(&server)
        .await;

    let tag = ClosurePlugin::builder("tag")
        .on_request(|_ctx: &PluginContext, _url: &str, request: &mut RequestDescriptor| {
            request
                .headers
                .insert("x-client".to_string(), "hookhttp".to_string());
            Ok(())
        })
        .into_plugin();
    let client = HttpClient::builder()
        .config(config_for(BaseUrl::Single(server.uri())))
        .plugin(tag)
        .build()
        .expect("client");

    let response = client.get("/todos/1").await.expect("response");

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({ "id": 1, "done": false }));
}

#[tokio::test]
async fn test_service_key_selects_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/sessions"))
        .and(body_json(json!({ "user": "ada" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let services = BTreeMap::from([
        ("default".to_string(), server.uri()),
        ("auth".to_string(), format!("{}/v2/", server.uri())),
    ]);
    let client = HttpClient::new(config_for(BaseUrl::Services(services))).expect("client");

    let response = client
        .request(
            RequestDescriptor::new(Method::Post, "/sessions")
                .with_base_url("auth")
                .with_body(json!({ "user": "ada" })),
        )
        .await
        .expect("response");

    assert_eq!(response.status, 201);
    assert_eq!(response.data, json!({ "token": "abc" }));
}

#[tokio::test]
async fn test_not_found_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such todo"))
        .mount(&server)
        .await;

    let client = HttpClient::new(config_for(BaseUrl::Single(server.uri()))).expect("client");

    let err = client.get("/todos/999").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Status);
    assert_eq!(err.status, Some(404));
}

#[tokio::test]
async fn test_error_status_passes_when_not_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "missing" })))
        .mount(&server)
        .await;

    let mut config = config_for(BaseUrl::Single(server.uri()));
    config.transport.reject_error_status = false;
    let client = HttpClient::new(config).expect("client");

    let response = client.get("/todos/999").await.expect("response");

    assert_eq!(response.status, 404);
    assert_eq!(response.data, json!({ "error": "missing" }));
}

#[tokio::test]
async fn test_transport_config_headers_reach_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "up": true })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        transport: TransportConfig {
            default_headers: BTreeMap::from([("x-api-key".to_string(), "secret".to_string())]),
            ..TransportConfig::default()
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        },
        ..config_for(BaseUrl::Single(server.uri()))
    };
    let client = HttpClient::new(config).expect("client");

    let response = client.get("/health").await.expect("response");

    assert_eq!(response.data, json!({ "up": true }));
}
