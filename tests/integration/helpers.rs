//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use hookhttp_client::HttpClient;
use hookhttp_core::config::{BaseUrl, ClientConfig};
use hookhttp_core::error::HttpError;
use hookhttp_core::result::HttpResult;
use hookhttp_core::traits::Transport;
use hookhttp_core::types::{CancelId, RawResponse, RequestDescriptor};
use hookhttp_plugin::prelude::*;

/// Base URL every test client is configured with.
pub const BASE_URL: &str = "https://api.example.com";

/// Ordered record of hook invocations shared between plugins.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == event).count()
    }
}

/// Plugin that records every hook it receives as `"<name>.<hook>"`.
///
/// `on_error` events carry the error status: `"<name>.on_error:<STATUS>"`.
#[derive(Debug)]
pub struct RecordingPlugin {
    name: String,
    log: EventLog,
    hooks: HookSet,
}

impl RecordingPlugin {
    pub fn new(name: &str, log: &EventLog) -> Arc<dyn Plugin> {
        Self::with_hooks(name, log, HookPoint::ALL.into_iter().collect())
    }

    pub fn with_hooks(name: &str, log: &EventLog, hooks: HookSet) -> Arc<dyn Plugin> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            hooks,
        })
    }

    fn record(&self, point: HookPoint) {
        self.log.push(format!("{}.{}", self.name, point));
    }
}

#[async_trait]
impl Plugin for RecordingPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo::named(self.name.clone())
    }

    fn hooks(&self) -> HookSet {
        self.hooks
    }

    async fn on_before(
        &self,
        _ctx: &PluginContext,
        request: RequestDescriptor,
    ) -> HttpResult<BeforeAction> {
        self.record(HookPoint::OnBefore);
        Ok(BeforeAction::Proceed(request))
    }

    fn on_request(
        &self,
        _ctx: &PluginContext,
        _url: &str,
        _request: &mut RequestDescriptor,
    ) -> HttpResult<()> {
        self.record(HookPoint::OnRequest);
        Ok(())
    }

    async fn on_response(
        &self,
        _ctx: &PluginContext,
        data: Value,
        _raw: &RawResponse,
    ) -> HttpResult<Value> {
        self.record(HookPoint::OnResponse);
        Ok(data)
    }

    fn on_error(
        &self,
        _ctx: &PluginContext,
        status: HttpErrorStatus,
        _error: &HttpError,
        _context: &ErrorContext,
    ) -> HttpResult<()> {
        self.log.push(format!("{}.on_error:{}", self.name, status));
        Ok(())
    }

    fn on_cancel(
        &self,
        _ctx: &PluginContext,
        _cancel_id: &CancelId,
        _reason: Option<&str>,
        _request: Option<&RequestDescriptor>,
    ) -> HttpResult<()> {
        self.record(HookPoint::OnCancel);
        Ok(())
    }

    fn on_finally(&self, _ctx: &PluginContext, _context: &FinallyContext) -> HttpResult<()> {
        self.record(HookPoint::OnFinally);
        Ok(())
    }

    async fn destroy(&self, _ctx: &PluginContext) -> HttpResult<()> {
        self.record(HookPoint::Destroy);
        Ok(())
    }
}

/// In-memory transport replaying scripted results.
///
/// Once the script runs out every request gets `200 {"ok": true}`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<HttpResult<(u16, Value)>>>,
    delay: Option<Duration>,
    sent: Mutex<Vec<(String, RequestDescriptor)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, data: Value) -> Self {
        self.script.lock().push_back(Ok((status, data)));
        self
    }

    pub fn fail(self, error: HttpError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs and descriptors as they reached the transport.
    pub fn sent(&self) -> Vec<(String, RequestDescriptor)> {
        self.sent.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, url: &str, request: &RequestDescriptor) -> HttpResult<RawResponse> {
        self.sent.lock().push((url.to_string(), request.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().pop_front();
        let (status, data) = match next {
            Some(result) => result?,
            None => (200, json!({ "ok": true })),
        };
        Ok(RawResponse::new(request.clone(), status, data))
    }
}

/// Builds a client over `transport` with the test base URL.
pub fn client(transport: Arc<ScriptedTransport>, plugins: Vec<Arc<dyn Plugin>>) -> HttpClient {
    let config = ClientConfig {
        base_url: Some(BaseUrl::Single(BASE_URL.to_string())),
        ..ClientConfig::default()
    };
    HttpClient::builder()
        .config(config)
        .transport(transport)
        .plugins(plugins)
        .build()
        .expect("Failed to build client")
}
