//! Plugin that traces every request lifecycle.

use tracing::{info, warn};

use hookhttp_core::error::HttpError;
use hookhttp_core::result::HttpResult;
use hookhttp_core::types::{CancelId, RequestDescriptor};

use crate::context::PluginContext;
use crate::hooks::definitions::{ErrorContext, FinallyContext, HookPoint, HookSet, HttpErrorStatus};
use crate::plugin::{Plugin, PluginInfo};

/// Logs request start, failures, cancellations, and completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogPlugin;

impl Plugin for RequestLogPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: Some("request-log".to_string()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            description: Some("Traces the request lifecycle".to_string()),
        }
    }

    fn hooks(&self) -> HookSet {
        HookSet::from([
            HookPoint::OnRequest,
            HookPoint::OnError,
            HookPoint::OnCancel,
            HookPoint::OnFinally,
        ])
    }

    fn on_request(
        &self,
        _ctx: &PluginContext,
        url: &str,
        request: &mut RequestDescriptor,
    ) -> HttpResult<()> {
        info!(method = %request.method, url = %url, "Sending request");
        Ok(())
    }

    fn on_error(
        &self,
        _ctx: &PluginContext,
        status: HttpErrorStatus,
        error: &HttpError,
        context: &ErrorContext,
    ) -> HttpResult<()> {
        warn!(
            reason = %status,
            error = %error,
            url = context.request.as_ref().map(|r| r.url.as_str()).unwrap_or(""),
            "Request failed"
        );
        Ok(())
    }

    fn on_cancel(
        &self,
        _ctx: &PluginContext,
        cancel_id: &CancelId,
        reason: Option<&str>,
        _request: Option<&RequestDescriptor>,
    ) -> HttpResult<()> {
        info!(cancel_id = %cancel_id, reason = ?reason, "Cancellation requested");
        Ok(())
    }

    fn on_finally(&self, _ctx: &PluginContext, context: &FinallyContext) -> HttpResult<()> {
        info!(
            url = context.request.as_ref().map(|r| r.url.as_str()).unwrap_or(""),
            status = context.response.as_ref().map(|r| r.status),
            success = context.is_success(),
            elapsed_ms = context.elapsed.as_millis() as u64,
            "Request finished"
        );
        Ok(())
    }
}
