//! The plugin capability trait and plugin metadata.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use hookhttp_core::error::HttpError;
use hookhttp_core::result::HttpResult;
use hookhttp_core::types::{CancelId, RawResponse, RequestDescriptor};

use crate::context::PluginContext;
use crate::hooks::definitions::{
    BeforeAction, ErrorContext, FinallyContext, HookSet, HttpErrorStatus,
};

/// Optional plugin metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Human-readable plugin name.
    pub name: Option<String>,
    /// Plugin version string.
    pub version: Option<String>,
    /// Plugin description.
    pub description: Option<String>,
}

impl PluginInfo {
    /// Creates metadata carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Name for log lines.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}

impl fmt::Display for PluginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.display_name(), version),
            None => f.write_str(self.display_name()),
        }
    }
}

/// A bundle of optional lifecycle hooks.
///
/// A plugin declares the hooks it implements through [`Plugin::hooks`];
/// the dispatcher only calls methods whose point is in that set. Every
/// hook method has a pass-through default so implementors override just
/// the ones they declare.
///
/// Handlers receive the owning client's [`PluginContext`] explicitly and
/// may run concurrently for different requests sharing one registry.
#[async_trait]
pub trait Plugin: Send + Sync + fmt::Debug {
    /// Returns plugin metadata.
    fn info(&self) -> PluginInfo {
        PluginInfo::default()
    }

    /// Returns the hook points this plugin participates in.
    fn hooks(&self) -> HookSet;

    /// Pre-flight rewrite or short-circuit. Composed onion-style: the next
    /// plugin receives the request this one proceeds with.
    async fn on_before(
        &self,
        _ctx: &PluginContext,
        request: RequestDescriptor,
    ) -> HttpResult<BeforeAction> {
        Ok(BeforeAction::Proceed(request))
    }

    /// Observes or mutates the request after URL resolution.
    fn on_request(
        &self,
        _ctx: &PluginContext,
        _url: &str,
        _request: &mut RequestDescriptor,
    ) -> HttpResult<()> {
        Ok(())
    }

    /// Transforms the decoded response body. Composed onion-style.
    async fn on_response(
        &self,
        _ctx: &PluginContext,
        data: Value,
        _response: &RawResponse,
    ) -> HttpResult<Value> {
        Ok(data)
    }

    /// Observes a failure.
    fn on_error(
        &self,
        _ctx: &PluginContext,
        _status: HttpErrorStatus,
        _error: &HttpError,
        _context: &ErrorContext,
    ) -> HttpResult<()> {
        Ok(())
    }

    /// Receives a cancellation signal for `cancel_id`.
    fn on_cancel(
        &self,
        _ctx: &PluginContext,
        _cancel_id: &CancelId,
        _reason: Option<&str>,
        _request: Option<&RequestDescriptor>,
    ) -> HttpResult<()> {
        Ok(())
    }

    /// Terminal cleanup, once per request.
    fn on_finally(&self, _ctx: &PluginContext, _context: &FinallyContext) -> HttpResult<()> {
        Ok(())
    }

    /// Releases plugin resources when the client is torn down.
    async fn destroy(&self, _ctx: &PluginContext) -> HttpResult<()> {
        Ok(())
    }
}
