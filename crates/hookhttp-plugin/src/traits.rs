//! Closure-built plugins for quick handler creation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use hookhttp_core::error::HttpError;
use hookhttp_core::result::HttpResult;
use hookhttp_core::types::{CancelId, RawResponse, RequestDescriptor};

use crate::context::PluginContext;
use crate::hooks::definitions::{
    BeforeAction, ErrorContext, FinallyContext, HookPoint, HookSet, HttpErrorStatus,
};
use crate::plugin::{Plugin, PluginInfo};

type BeforeFn = Arc<
    dyn Fn(&PluginContext, RequestDescriptor) -> BoxFuture<'static, HttpResult<BeforeAction>>
        + Send
        + Sync,
>;
type RequestFn =
    Arc<dyn Fn(&PluginContext, &str, &mut RequestDescriptor) -> HttpResult<()> + Send + Sync>;
type ResponseFn = Arc<
    dyn Fn(&PluginContext, Value, &RawResponse) -> BoxFuture<'static, HttpResult<Value>>
        + Send
        + Sync,
>;
type ErrorFn = Arc<
    dyn Fn(&PluginContext, HttpErrorStatus, &HttpError, &ErrorContext) -> HttpResult<()>
        + Send
        + Sync,
>;
type CancelFn = Arc<
    dyn Fn(&PluginContext, &CancelId, Option<&str>, Option<&RequestDescriptor>) -> HttpResult<()>
        + Send
        + Sync,
>;
type FinallyFn = Arc<dyn Fn(&PluginContext, &FinallyContext) -> HttpResult<()> + Send + Sync>;
type DestroyFn = Arc<dyn Fn(&PluginContext) -> BoxFuture<'static, HttpResult<()>> + Send + Sync>;

/// A plugin assembled from optional closures, one per hook.
///
/// The plugin participates in exactly the hooks that have a closure.
///
/// ```rust,ignore
/// let plugin = ClosurePlugin::builder("stamp")
///     .on_request(|_ctx, _url, request| {
///         request.headers.insert("x-stamp".into(), "1".into());
///         Ok(())
///     })
///     .build();
/// ```
#[derive(Clone, Default)]
pub struct ClosurePlugin {
    info: PluginInfo,
    on_before: Option<BeforeFn>,
    on_request: Option<RequestFn>,
    on_response: Option<ResponseFn>,
    on_error: Option<ErrorFn>,
    on_cancel: Option<CancelFn>,
    on_finally: Option<FinallyFn>,
    destroy: Option<DestroyFn>,
}

impl ClosurePlugin {
    /// Starts a builder for a plugin called `name`.
    pub fn builder(name: impl Into<String>) -> ClosurePluginBuilder {
        ClosurePluginBuilder {
            plugin: ClosurePlugin {
                info: PluginInfo::named(name),
                ..ClosurePlugin::default()
            },
        }
    }
}

impl fmt::Debug for ClosurePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosurePlugin")
            .field("info", &self.info)
            .field("hooks", &self.hooks())
            .finish()
    }
}

#[async_trait]
impl Plugin for ClosurePlugin {
    fn info(&self) -> PluginInfo {
        self.info.clone()
    }

    fn hooks(&self) -> HookSet {
        let mut set = HookSet::empty();
        let present = [
            (HookPoint::OnBefore, self.on_before.is_some()),
            (HookPoint::OnRequest, self.on_request.is_some()),
            (HookPoint::OnResponse, self.on_response.is_some()),
            (HookPoint::OnError, self.on_error.is_some()),
            (HookPoint::OnCancel, self.on_cancel.is_some()),
            (HookPoint::OnFinally, self.on_finally.is_some()),
            (HookPoint::Destroy, self.destroy.is_some()),
        ];
        for (point, _) in present.into_iter().filter(|(_, present)| *present) {
            set.insert(point);
        }
        set
    }

    async fn on_before(
        &self,
        ctx: &PluginContext,
        request: RequestDescriptor,
    ) -> HttpResult<BeforeAction> {
        match &self.on_before {
            Some(handler) => handler(ctx, request).await,
            None => Ok(BeforeAction::Proceed(request)),
        }
    }

    fn on_request(
        &self,
        ctx: &PluginContext,
        url: &str,
        request: &mut RequestDescriptor,
    ) -> HttpResult<()> {
        match &self.on_request {
            Some(handler) => handler(ctx, url, request),
            None => Ok(()),
        }
    }

    async fn on_response(
        &self,
        ctx: &PluginContext,
        data: Value,
        response: &RawResponse,
    ) -> HttpResult<Value> {
        match &self.on_response {
            Some(handler) => handler(ctx, data, response).await,
            None => Ok(data),
        }
    }

    fn on_error(
        &self,
        ctx: &PluginContext,
        status: HttpErrorStatus,
        error: &HttpError,
        context: &ErrorContext,
    ) -> HttpResult<()> {
        match &self.on_error {
            Some(handler) => handler(ctx, status, error, context),
            None => Ok(()),
        }
    }

    fn on_cancel(
        &self,
        ctx: &PluginContext,
        cancel_id: &CancelId,
        reason: Option<&str>,
        request: Option<&RequestDescriptor>,
    ) -> HttpResult<()> {
        match &self.on_cancel {
            Some(handler) => handler(ctx, cancel_id, reason, request),
            None => Ok(()),
        }
    }

    fn on_finally(&self, ctx: &PluginContext, context: &FinallyContext) -> HttpResult<()> {
        match &self.on_finally {
            Some(handler) => handler(ctx, context),
            None => Ok(()),
        }
    }

    async fn destroy(&self, ctx: &PluginContext) -> HttpResult<()> {
        match &self.destroy {
            Some(handler) => handler(ctx).await,
            None => Ok(()),
        }
    }
}

/// Builder for [`ClosurePlugin`].
pub struct ClosurePluginBuilder {
    plugin: ClosurePlugin,
}

impl ClosurePluginBuilder {
    /// Sets the plugin version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.plugin.info.version = Some(version.into());
        self
    }

    /// Sets the plugin description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.plugin.info.description = Some(description.into());
        self
    }

    /// Sets the `on_before` handler.
    pub fn on_before<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(&PluginContext, RequestDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<BeforeAction>> + Send + 'static,
    {
        self.plugin.on_before = Some(Arc::new(
            move |ctx: &PluginContext,
                  request: RequestDescriptor|
                  -> BoxFuture<'static, HttpResult<BeforeAction>> {
                Box::pin(handler(ctx, request))
            },
        ));
        self
    }

    /// Sets the `on_request` handler.
    pub fn on_request<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PluginContext, &str, &mut RequestDescriptor) -> HttpResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.plugin.on_request = Some(Arc::new(handler));
        self
    }

    /// Sets the `on_response` handler.
    pub fn on_response<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(&PluginContext, Value, &RawResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<Value>> + Send + 'static,
    {
        self.plugin.on_response = Some(Arc::new(
            move |ctx: &PluginContext,
                  data: Value,
                  response: &RawResponse|
                  -> BoxFuture<'static, HttpResult<Value>> {
                Box::pin(handler(ctx, data, response))
            },
        ));
        self
    }

    /// Sets the `on_error` handler.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PluginContext, HttpErrorStatus, &HttpError, &ErrorContext) -> HttpResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.plugin.on_error = Some(Arc::new(handler));
        self
    }

    /// Sets the `on_cancel` handler.
    pub fn on_cancel<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PluginContext, &CancelId, Option<&str>, Option<&RequestDescriptor>) -> HttpResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.plugin.on_cancel = Some(Arc::new(handler));
        self
    }

    /// Sets the `on_finally` handler.
    pub fn on_finally<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PluginContext, &FinallyContext) -> HttpResult<()> + Send + Sync + 'static,
    {
        self.plugin.on_finally = Some(Arc::new(handler));
        self
    }

    /// Sets the `destroy` handler.
    pub fn destroy<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(&PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<()>> + Send + 'static,
    {
        self.plugin.destroy = Some(Arc::new(
            move |ctx: &PluginContext| -> BoxFuture<'static, HttpResult<()>> {
                Box::pin(handler(ctx))
            },
        ));
        self
    }

    /// Finishes the plugin.
    pub fn build(self) -> ClosurePlugin {
        self.plugin
    }

    /// Finishes the plugin as a registry entry.
    pub fn into_plugin(self) -> Arc<dyn Plugin> {
        Arc::new(self.plugin)
    }
}
