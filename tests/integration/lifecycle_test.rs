//! Integration tests for the request lifecycle.

mod helpers;

use std::sync::Arc;

use serde_json::{Value, json};

use helpers::{BASE_URL, EventLog, RecordingPlugin, ScriptedTransport};
use hookhttp_core::error::{ErrorKind, HttpError};
use hookhttp_core::types::{Method, RawResponse, RequestDescriptor};
use hookhttp_plugin::prelude::*;

#[tokio::test]
async fn test_success_runs_hooks_in_order() {
    let log = EventLog::default();
    let transport = Arc::new(ScriptedTransport::new().respond(200, json!({ "id": 1 })));
    let client = helpers::client(
        transport.clone(),
        vec![RecordingPlugin::new("a", &log), RecordingPlugin::new("b", &log)],
    );

    let response = client.get("/todos/1").await.expect("response");

    assert_eq!(response.data, json!({ "id": 1 }));
    assert_eq!(
        log.events(),
        vec![
            "a.on_before",
            "b.on_before",
            "a.on_request",
            "b.on_request",
            "a.on_response",
            "b.on_response",
            "a.on_finally",
            "b.on_finally",
        ]
    );
    assert_eq!(transport.sent()[0].0, format!("{BASE_URL}/todos/1"));
}

#[tokio::test]
async fn test_transport_failure_reports_response_error() {
    let log = EventLog::default();
    let transport = Arc::new(ScriptedTransport::new().fail(HttpError::transport("connection reset")));
    let client = helpers::client(transport, vec![RecordingPlugin::new("a", &log)]);

    let err = client.get("/todos").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(err.message, "connection reset");
    assert_eq!(
        log.events(),
        vec![
            "a.on_before",
            "a.on_request",
            "a.on_error:INVALID_RESPONSE_ERROR",
            "a.on_finally",
        ]
    );
}

#[tokio::test]
async fn test_before_failure_reports_request_error() {
    let log = EventLog::default();
    let failing = ClosurePlugin::builder("reject")
        .on_before(|_ctx: &PluginContext, _request: RequestDescriptor| async {
            Err(HttpError::plugin("missing credentials"))
        })
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new());
    let client = helpers::client(
        transport.clone(),
        vec![failing, RecordingPlugin::new("a", &log)],
    );

    let err = client.get("/todos").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::PluginFailure);
    assert_eq!(err.message, "missing credentials");
    assert_eq!(transport.calls(), 0);
    assert_eq!(
        log.events(),
        vec!["a.on_error:INVALID_REQUEST_ERROR", "a.on_finally"]
    );
}

#[tokio::test]
async fn test_on_request_mutation_reaches_transport() {
    let stamp = ClosurePlugin::builder("stamp")
        .on_request(|_ctx: &PluginContext, _url: &str, request: &mut RequestDescriptor| {
            request
                .headers
                .insert("authorization".to_string(), "Bearer t0k3n".to_string());
            Ok(())
        })
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new());
    let client = helpers::client(transport.clone(), vec![stamp]);

    client.get("/me").await.expect("response");

    let (_, sent) = &transport.sent()[0];
    assert_eq!(
        sent.headers.get("authorization").map(String::as_str),
        Some("Bearer t0k3n")
    );
}

#[tokio::test]
async fn test_before_rewrite_feeds_next_plugin() {
    let rewrite = ClosurePlugin::builder("rewrite")
        .on_before(|_ctx: &PluginContext, request: RequestDescriptor| async move {
            Ok(BeforeAction::Proceed(RequestDescriptor {
                url: format!("/v1{}", request.url),
                ..request
            }))
        })
        .into_plugin();
    let paginate = ClosurePlugin::builder("paginate")
        .on_before(|_ctx: &PluginContext, request: RequestDescriptor| async move {
            Ok(BeforeAction::Proceed(request.with_query("page", "1")))
        })
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new());
    let client = helpers::client(transport.clone(), vec![rewrite, paginate]);

    client.get("/items").await.expect("response");

    let (url, sent) = &transport.sent()[0];
    assert_eq!(url, &format!("{BASE_URL}/v1/items"));
    assert_eq!(sent.query, vec![("page".to_string(), "1".to_string())]);
}

#[tokio::test]
async fn test_mock_bypass_skips_transport() {
    let log = EventLog::default();
    let mock = ClosurePlugin::builder("mock")
        .on_before(|_ctx: &PluginContext, request: RequestDescriptor| async move {
            Ok(BeforeAction::Respond(RawResponse::new(
                request,
                200,
                json!({ "mocked": true }),
            )))
        })
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new());
    let client = helpers::client(
        transport.clone(),
        vec![mock, RecordingPlugin::new("a", &log)],
    );

    let response = client.get("/todos").await.expect("response");

    assert_eq!(response.data, json!({ "mocked": true }));
    assert_eq!(transport.calls(), 0);
    assert_eq!(log.events(), vec!["a.on_response", "a.on_finally"]);
}

#[tokio::test]
async fn test_on_response_composes_in_order() {
    let wrap = ClosurePlugin::builder("wrap")
        .on_response(|_ctx: &PluginContext, data: Value, _raw: &RawResponse| async move {
            Ok(json!({ "payload": data }))
        })
        .into_plugin();
    let stamp = ClosurePlugin::builder("stamp")
        .on_response(|_ctx: &PluginContext, mut data: Value, raw: &RawResponse| {
            data["status"] = json!(raw.status);
            async move { Ok(data) }
        })
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new().respond(201, json!([1, 2])));
    let client = helpers::client(transport, vec![wrap, stamp]);

    let response = client
        .post("/items", json!({ "name": "x" }))
        .await
        .expect("response");

    assert_eq!(response.status, 201);
    assert_eq!(response.data, json!({ "payload": [1, 2], "status": 201 }));
}

#[tokio::test]
async fn test_null_from_on_response_is_kept() {
    let erase = ClosurePlugin::builder("erase")
        .on_response(|_ctx: &PluginContext, _data: Value, _raw: &RawResponse| async {
            Ok(Value::Null)
        })
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new().respond(200, json!({ "id": 3 })));
    let client = helpers::client(transport, vec![erase]);

    let response = client.get("/todos/3").await.expect("response");

    assert_eq!(response.data, Value::Null);
}

#[tokio::test]
async fn test_error_status_reaches_on_error_with_response() {
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let sink = seen.clone();
    let observer = ClosurePlugin::builder("observer")
        .on_error(
            move |_ctx: &PluginContext,
                  status: HttpErrorStatus,
                  _error: &HttpError,
                  context: &ErrorContext| {
                *sink.lock() = Some((status, context.response.as_ref().map(|r| r.status)));
                Ok(())
            },
        )
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new().respond(503, json!("unavailable")));
    let client = helpers::client(transport, vec![observer]);

    let err = client.delete("/todos/1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Status);
    assert_eq!(err.status, Some(503));
    assert_eq!(
        *seen.lock(),
        Some((HttpErrorStatus::InvalidResponseError, Some(503)))
    );
}

#[tokio::test]
async fn test_failing_error_handler_does_not_mask_error() {
    let log = EventLog::default();
    let broken = ClosurePlugin::builder("broken")
        .on_error(
            |_ctx: &PluginContext,
             _status: HttpErrorStatus,
             _error: &HttpError,
             _context: &ErrorContext| { Err(HttpError::plugin("handler exploded")) },
        )
        .into_plugin();
    let transport = Arc::new(ScriptedTransport::new().fail(HttpError::timeout("too slow")));
    let client = helpers::client(transport, vec![broken, RecordingPlugin::new("a", &log)]);

    let err = client.get("/slow").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Timeout);
    assert_eq!(log.count("a.on_finally"), 1);
    assert_eq!(log.count("a.on_error:INVALID_RESPONSE_ERROR"), 0);
}

#[tokio::test]
async fn test_plugins_added_later_apply_to_later_requests() {
    let log = EventLog::default();
    let transport = Arc::new(ScriptedTransport::new());
    let client = helpers::client(transport, vec![]);

    client.get("/first").await.expect("first");
    client.plugins().add(RecordingPlugin::with_hooks(
        "late",
        &log,
        HookSet::from([HookPoint::OnFinally]),
    ));
    client
        .request(RequestDescriptor::new(Method::Get, "/second"))
        .await
        .expect("second");

    assert_eq!(log.events(), vec!["late.on_finally"]);
}

#[tokio::test]
async fn test_destroy_tears_down_plugins() {
    let log = EventLog::default();
    let transport = Arc::new(ScriptedTransport::new());
    let client = helpers::client(
        transport,
        vec![RecordingPlugin::new("a", &log), RecordingPlugin::new("b", &log)],
    );

    client.destroy().await.expect("destroy");

    assert_eq!(log.events(), vec!["a.destroy", "b.destroy"]);
    assert!(client.plugins().is_empty());
}

#[tokio::test]
async fn test_verb_options_reach_transport() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = helpers::client(transport.clone(), vec![]);

    client
        .post_with(
            "/items",
            json!({ "name": "pen" }),
            RequestDescriptor::default().with_header("x-trace", "abc"),
        )
        .await
        .expect("response");

    let sent = transport.sent();
    let (url, request) = &sent[0];
    assert_eq!(url, &format!("{BASE_URL}/items"));
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.body, Some(json!({ "name": "pen" })));
    assert_eq!(request.headers.get("x-trace").map(String::as_str), Some("abc"));
}
