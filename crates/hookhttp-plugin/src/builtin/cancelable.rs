//! Plugin that owns the abort handles of cancellable requests.

use tracing::debug;

use hookhttp_core::result::HttpResult;
use hookhttp_core::types::{CancelId, RequestDescriptor};

use crate::cancel::CancellationRegistry;
use crate::context::PluginContext;
use crate::hooks::definitions::{FinallyContext, HookPoint, HookSet};
use crate::plugin::{Plugin, PluginInfo};

/// Resolves cancel tokens to abort handles.
///
/// `on_cancel` aborts the matching request and deregisters its token;
/// `on_finally` deregisters the token of every finished request, unless a
/// newer request has taken it over. Unknown tokens are ignored.
#[derive(Debug, Clone)]
pub struct CancelablePlugin {
    registry: CancellationRegistry,
}

impl CancelablePlugin {
    /// Creates a plugin owning the handles stored in `registry`.
    pub fn new(registry: CancellationRegistry) -> Self {
        Self { registry }
    }

    /// The registry this plugin resolves tokens against.
    pub fn registry(&self) -> &CancellationRegistry {
        &self.registry
    }
}

impl Plugin for CancelablePlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: Some("cancelable".to_string()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            description: Some("Aborts in-flight requests by cancel id".to_string()),
        }
    }

    fn hooks(&self) -> HookSet {
        HookSet::from([HookPoint::OnCancel, HookPoint::OnFinally])
    }

    fn on_cancel(
        &self,
        _ctx: &PluginContext,
        cancel_id: &CancelId,
        reason: Option<&str>,
        _request: Option<&RequestDescriptor>,
    ) -> HttpResult<()> {
        self.registry.cancel(cancel_id, reason);
        Ok(())
    }

    fn on_finally(&self, _ctx: &PluginContext, context: &FinallyContext) -> HttpResult<()> {
        let Some(request) = context.request.as_ref() else {
            return Ok(());
        };
        if let (Some(cancel_id), Some(abort)) = (&request.cancel_id, &request.abort) {
            if self.registry.release_if(cancel_id, abort) {
                debug!(cancel_id = %cancel_id, "Cancel token released");
            }
        }
        Ok(())
    }
}
