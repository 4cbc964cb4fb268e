//! The client facade: drives each request through the plugin lifecycle.
//!
//! Per request the hooks run in this order:
//!
//! 1. `on_before` (onion, awaited); may short-circuit with a response
//! 2. URL resolution, then `on_request` (broadcast)
//! 3. the transport exchange, raced against the request's abort handle
//! 4. `on_response` (onion, awaited) transforming the body
//! 5. `on_error` (broadcast) on any failure, tagged by phase
//! 6. `on_finally` (broadcast), exactly once
//!
//! A request future dropped before it settles still runs `on_error` and
//! `on_finally`, with a cancellation error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde_json::Value;
use tracing::{debug, warn};

use hookhttp_core::config::ClientConfig;
use hookhttp_core::error::HttpError;
use hookhttp_core::result::HttpResult;
use hookhttp_core::traits::Transport;
use hookhttp_core::types::{AbortHandle, CancelId, HttpResponse, RawResponse, RequestDescriptor};
use hookhttp_plugin::builtin::{CancelablePlugin, RequestLogPlugin};
use hookhttp_plugin::{
    BeforeAction, CancelRegistration, CancellationRegistry, ErrorContext, FinallyContext,
    HookDispatcher, HookOutcome, HookPoint, HttpErrorStatus, Plugin, PluginContext,
    PluginRegistry,
};

use crate::transport::ReqwestTransport;
use crate::url::resolve_request_url;

/// HTTP client whose request lifecycle is extended by plugins.
///
/// Cloning is cheap; clones share configuration, plugins, and the
/// cancellation table.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: Arc<ClientConfig>,
    plugins: PluginRegistry,
    dispatcher: HookDispatcher,
    cancellations: CancellationRegistry,
    transport: Arc<dyn Transport>,
}

/// Finalizes a request whose future is dropped before it settles.
struct InFlight {
    client: HttpClient,
    request: Option<RequestDescriptor>,
    started: Instant,
    sent: AtomicBool,
    settled: bool,
}

impl InFlight {
    fn new(client: HttpClient, request: RequestDescriptor, started: Instant) -> Self {
        Self {
            client,
            request: Some(request),
            started,
            sent: AtomicBool::new(false),
            settled: false,
        }
    }

    /// Records that the pre-send phase is over.
    fn mark_sent(&self) {
        self.sent.store(true, Ordering::Release);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.settled || std::thread::panicking() {
            return;
        }
        let status = if self.sent.load(Ordering::Acquire) {
            HttpErrorStatus::InvalidResponseError
        } else {
            HttpErrorStatus::InvalidRequestError
        };
        debug!(reason = %status, "Request dropped before completion");
        self.client.fail(
            status,
            HttpError::cancelled(Some("request dropped")),
            self.request.take(),
            None,
            self.started,
        );
    }
}

/// Outcome of the pre-send phase.
enum Prepared {
    Send {
        url: String,
        request: RequestDescriptor,
    },
    Respond(RawResponse),
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl HttpClientBuilder {
    /// Replaces the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `transport` instead of the reqwest-backed default.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Appends a user plugin.
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Appends several user plugins in order.
    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Builds the client.
    ///
    /// Built-in plugins enabled in the configuration are registered ahead
    /// of user plugins.
    pub fn build(self) -> HttpResult<HttpClient> {
        let config = Arc::new(self.config);
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config.transport)?),
        };

        let plugins = PluginRegistry::new();
        let cancellations = CancellationRegistry::new();
        if config.plugins.cancelable {
            plugins.add(Arc::new(CancelablePlugin::new(cancellations.clone())));
        }
        if config.plugins.request_log {
            plugins.add(Arc::new(RequestLogPlugin));
        }
        plugins.add_all(self.plugins);

        let dispatcher = HookDispatcher::new(PluginContext::new(config.clone(), plugins.clone()));

        debug!(plugin_count = plugins.size(), "HTTP client built");

        Ok(HttpClient {
            inner: Arc::new(ClientInner {
                config,
                plugins,
                dispatcher,
                cancellations,
                transport,
            }),
        })
    }
}

impl HttpClient {
    /// Returns a builder with default configuration.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Builds a client from `config` with the default transport.
    pub fn new(config: ClientConfig) -> HttpResult<Self> {
        Self::builder().config(config).build()
    }

    /// Issues `request` through the plugin lifecycle.
    ///
    /// A request carrying a cancel id is registered before this returns, so
    /// [`apply_cancel`](Self::apply_cancel) can reach it as soon as the
    /// future exists. A token already in flight fails the request here,
    /// after `on_error` and `on_finally` have run.
    ///
    /// Dropping the returned future before it completes runs `on_error`
    /// and `on_finally` with a [`Cancelled`](hookhttp_core::ErrorKind::Cancelled)
    /// error.
    pub fn request(&self, request: RequestDescriptor) -> BoxFuture<'static, HttpResult<HttpResponse>> {
        let started = Instant::now();
        let mut request = request;
        request.abort = None;

        let registration: Option<CancelRegistration> = match request.cancel_id.clone() {
            Some(cancel_id) => match self.inner.cancellations.register(cancel_id) {
                Ok(registration) => {
                    request.abort = Some(registration.handle().clone());
                    Some(registration)
                }
                Err(e) => {
                    let error = self.fail(
                        HttpErrorStatus::InvalidRequestError,
                        e,
                        Some(request),
                        None,
                        started,
                    );
                    return future::ready(Err(error)).boxed();
                }
            },
            None => None,
        };

        let client = self.clone();
        let mut in_flight = InFlight::new(self.clone(), request.clone(), started);
        async move {
            let result = client.execute(request, started, &in_flight).await;
            in_flight.settled = true;
            drop(registration);
            result
        }
        .boxed()
    }

    /// Broadcasts `on_cancel` for `cancel_id`.
    ///
    /// Unknown or already finished tokens are a no-op for the built-in
    /// cancellation plugin. A failing handler stops the broadcast and its
    /// error is returned.
    pub fn apply_cancel(&self, cancel_id: &CancelId, reason: Option<&str>) -> HttpResult<()> {
        debug!(cancel_id = %cancel_id, "Applying cancel");
        self.inner
            .dispatcher
            .run_hook(HookPoint::OnCancel, |plugin, ctx| {
                plugin.on_cancel(ctx, cancel_id, reason, None)
            })
            .map(|_| ())
    }

    /// Generates a new cancel token.
    pub fn create_cancel_id(&self) -> CancelId {
        CancellationRegistry::create_cancel_id()
    }

    /// Runs every `destroy` handler in order, then empties the registry.
    pub async fn destroy(&self) -> HttpResult<()> {
        self.inner
            .dispatcher
            .run_hook_sync(HookPoint::Destroy, |plugin, ctx| {
                async move { plugin.destroy(ctx).await }.boxed()
            })
            .await?;
        self.inner.plugins.clear();
        Ok(())
    }

    /// The plugin registry. Changes apply to requests issued afterwards.
    pub fn plugins(&self) -> &PluginRegistry {
        &self.inner.plugins
    }

    /// The hook dispatcher.
    pub fn dispatcher(&self) -> &HookDispatcher {
        &self.inner.dispatcher
    }

    /// The live cancel tokens.
    pub fn cancellations(&self) -> &CancellationRegistry {
        &self.inner.cancellations
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Runs the lifecycle. Every return path has run `on_finally`.
    async fn execute(
        &self,
        request: RequestDescriptor,
        started: Instant,
        in_flight: &InFlight,
    ) -> HttpResult<HttpResponse> {
        let (url, request) = match self.prepare(request).await {
            Ok(Prepared::Send { url, request }) => (url, request),
            Ok(Prepared::Respond(raw)) => {
                debug!(url = %raw.request.url, "Request answered by on_before");
                in_flight.mark_sent();
                return self.complete(raw, started).await;
            }
            Err((e, request)) => {
                return Err(self.fail(
                    HttpErrorStatus::InvalidRequestError,
                    e,
                    Some(request),
                    None,
                    started,
                ));
            }
        };

        in_flight.mark_sent();
        let raw = match self.send(&url, &request).await {
            Ok(raw) => raw,
            Err(e) => {
                return Err(self.fail(
                    HttpErrorStatus::InvalidResponseError,
                    e,
                    Some(request),
                    None,
                    started,
                ));
            }
        };

        if self.inner.config.transport.reject_error_status && !raw.is_success() {
            let error = HttpError::status(
                raw.status,
                format!("{} {} failed with status {}", request.method, url, raw.status),
            );
            return Err(self.fail(
                HttpErrorStatus::InvalidResponseError,
                error,
                Some(request),
                Some(raw),
                started,
            ));
        }

        self.complete(raw, started).await
    }

    /// Runs `on_before`, resolves the URL, and runs `on_request`.
    ///
    /// On failure the error is returned with the request as it stood.
    async fn prepare(
        &self,
        request: RequestDescriptor,
    ) -> Result<Prepared, (HttpError, RequestDescriptor)> {
        let abort = request.abort.clone();
        let original = request.clone();

        let mut request = match self.run_before(request).await {
            Ok(HookOutcome::NoPlugin) => original,
            Ok(HookOutcome::Value(BeforeAction::Proceed(request))) => request,
            Ok(HookOutcome::Value(BeforeAction::Respond(raw))) => return Ok(Prepared::Respond(raw)),
            Err(e) => return Err((e, original)),
        };
        request.abort = abort.clone();
        if let Some(e) = abort_error(abort.as_ref()) {
            return Err((e, request));
        }

        let url = match resolve_request_url(&self.inner.config, &request) {
            Ok(url) => url,
            Err(e) => return Err((e, request)),
        };

        if let Err(e) = self
            .inner
            .dispatcher
            .run_hook(HookPoint::OnRequest, |plugin, ctx| {
                plugin.on_request(ctx, &url, &mut request)
            })
        {
            return Err((e, request));
        }
        request.abort = abort.clone();
        if let Some(e) = abort_error(abort.as_ref()) {
            return Err((e, request));
        }

        Ok(Prepared::Send { url, request })
    }

    async fn run_before(&self, request: RequestDescriptor) -> HttpResult<HookOutcome<BeforeAction>> {
        let abort = request.abort.clone();
        let mut seed = Some(request);
        self.inner
            .dispatcher
            .run_hook_onion_sync(HookPoint::OnBefore, move |plugin, ctx, acc| {
                if let Some(e) = abort_error(abort.as_ref()) {
                    return future::ready(Err(e)).boxed();
                }
                let request = match acc.or_else(|| seed.take().map(BeforeAction::Proceed)) {
                    Some(BeforeAction::Proceed(request)) => request,
                    Some(respond) => return future::ready(Ok(respond)).boxed(),
                    None => {
                        return future::ready(Err(HttpError::internal(
                            "on_before chain lost its request",
                        )))
                        .boxed();
                    }
                };
                async move { plugin.on_before(ctx, request).await }.boxed()
            })
            .await
    }

    async fn send(&self, url: &str, request: &RequestDescriptor) -> HttpResult<RawResponse> {
        debug!(method = %request.method, url = %url, "Sending request");
        let exchange = self.inner.transport.send(url, request);
        match &request.abort {
            Some(abort) => tokio::select! {
                biased;
                _ = abort.aborted() => Err(HttpError::cancelled(abort.reason())),
                result = exchange => result,
            },
            None => exchange.await,
        }
    }

    /// Runs `on_response` and `on_finally` for a received response.
    async fn complete(&self, raw: RawResponse, started: Instant) -> HttpResult<HttpResponse> {
        match self.run_response(&raw).await {
            Ok(outcome) => {
                let data = match outcome {
                    HookOutcome::NoPlugin => raw.data.clone(),
                    HookOutcome::Value(data) => data,
                };
                let response = HttpResponse::from_raw(&raw, data);
                self.finish(FinallyContext {
                    request: Some(raw.request.clone()),
                    response: Some(raw),
                    error: None,
                    reason: None,
                    elapsed: started.elapsed(),
                });
                Ok(response)
            }
            Err(e) => {
                let request = raw.request.clone();
                Err(self.fail(
                    HttpErrorStatus::InvalidResponseError,
                    e,
                    Some(request),
                    Some(raw),
                    started,
                ))
            }
        }
    }

    async fn run_response(&self, raw: &RawResponse) -> HttpResult<HookOutcome<Value>> {
        let abort = raw.request.abort.clone();
        self.inner
            .dispatcher
            .run_hook_onion_sync(HookPoint::OnResponse, move |plugin, ctx, acc| {
                if let Some(e) = abort_error(abort.as_ref()) {
                    return future::ready(Err(e)).boxed();
                }
                let data = acc.unwrap_or_else(|| raw.data.clone());
                async move { plugin.on_response(ctx, data, raw).await }.boxed()
            })
            .await
    }

    /// Runs `on_error` then `on_finally` and hands back `error`.
    ///
    /// Handler failures on this path are logged; the request error wins.
    fn fail(
        &self,
        status: HttpErrorStatus,
        error: HttpError,
        request: Option<RequestDescriptor>,
        response: Option<RawResponse>,
        started: Instant,
    ) -> HttpError {
        let context = ErrorContext {
            request: request.clone(),
            response: response.clone(),
        };
        if let Err(hook_error) = self
            .inner
            .dispatcher
            .run_hook(HookPoint::OnError, |plugin, ctx| {
                plugin.on_error(ctx, status, &error, &context)
            })
        {
            warn!(reason = %status, error = %hook_error, "on_error handler failed");
        }

        self.finish(FinallyContext {
            request,
            response,
            error: Some(error.clone()),
            reason: Some(status),
            elapsed: started.elapsed(),
        });
        error
    }

    fn finish(&self, context: FinallyContext) {
        if let Err(e) = self
            .inner
            .dispatcher
            .run_hook(HookPoint::OnFinally, |plugin, ctx| plugin.on_finally(ctx, &context))
        {
            warn!(error = %e, "on_finally handler failed");
        }
    }
}

fn abort_error(abort: Option<&AbortHandle>) -> Option<HttpError> {
    abort
        .filter(|abort| abort.is_aborted())
        .map(|abort| HttpError::cancelled(abort.reason()))
}
