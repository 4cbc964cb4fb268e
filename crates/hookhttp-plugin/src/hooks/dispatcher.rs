//! Hook dispatcher: selects handlers for a hook point and runs them.
//!
//! Two strategies, each in a non-suspending and an awaiting form:
//!
//! - Broadcast (`run_hook`, `run_hook_sync`): every selected handler runs
//!   with the same arguments, in registry order.
//! - Onion (`run_hook_onion`, `run_hook_onion_sync`): a left-to-right fold.
//!   The first handler sees the original arguments, every later one sees
//!   the previous result in place of the first argument.
//!
//! The `_sync` forms await each handler before invoking the next.
//! Selection is a snapshot taken when the dispatch begins. A failing
//! handler stops the dispatch and its error is returned unchanged.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use hookhttp_core::result::HttpResult;

use super::definitions::{HookOutcome, HookPoint};
use super::registry::PluginRegistry;
use crate::context::PluginContext;
use crate::plugin::Plugin;

/// Dispatches hooks to the plugins of one registry.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Plugin registry.
    registry: PluginRegistry,
    /// Context handed to every handler.
    context: PluginContext,
}

impl HookDispatcher {
    /// Creates a dispatcher over the registry held by `context`.
    pub fn new(context: PluginContext) -> Self {
        Self {
            registry: context.plugins.clone(),
            context,
        }
    }

    /// Broadcast without suspension. Returns how many handlers ran.
    pub fn run_hook<F>(&self, point: HookPoint, mut call: F) -> HttpResult<usize>
    where
        F: FnMut(&dyn Plugin, &PluginContext) -> HttpResult<()>,
    {
        let handlers = self.registry.select(point);
        if handlers.is_empty() {
            return Ok(0);
        }

        debug!(hook = %point, handler_count = handlers.len(), "Dispatching hook");

        for plugin in &handlers {
            call(plugin.as_ref(), &self.context).map_err(|e| {
                warn!(hook = %point, plugin = %plugin.info(), error = %e, "Hook handler failed");
                e
            })?;
        }
        Ok(handlers.len())
    }

    /// Broadcast, awaiting each handler before the next.
    pub async fn run_hook_sync<'a, F>(&'a self, point: HookPoint, mut call: F) -> HttpResult<usize>
    where
        F: FnMut(Arc<dyn Plugin>, &'a PluginContext) -> BoxFuture<'a, HttpResult<()>> + Send,
    {
        let handlers = self.registry.select(point);
        if handlers.is_empty() {
            return Ok(0);
        }

        debug!(hook = %point, handler_count = handlers.len(), "Dispatching hook sequentially");

        let count = handlers.len();
        for plugin in handlers {
            let info = plugin.info();
            call(plugin, &self.context).await.map_err(|e| {
                warn!(hook = %point, plugin = %info, error = %e, "Hook handler failed");
                e
            })?;
        }
        Ok(count)
    }

    /// Onion fold without suspension.
    ///
    /// `call` receives `None` for the first handler and `Some(acc)` after.
    /// With one handler its result is returned as is; with none the
    /// [`HookOutcome::NoPlugin`] sentinel is returned.
    pub fn run_hook_onion<T, F>(&self, point: HookPoint, mut call: F) -> HttpResult<HookOutcome<T>>
    where
        F: FnMut(&dyn Plugin, &PluginContext, Option<T>) -> HttpResult<T>,
    {
        let handlers = self.registry.select(point);
        let Some((first, rest)) = handlers.split_first() else {
            return Ok(HookOutcome::NoPlugin);
        };

        debug!(hook = %point, handler_count = handlers.len(), "Dispatching onion hook");

        let mut acc = call(first.as_ref(), &self.context, None)?;
        for plugin in rest {
            acc = call(plugin.as_ref(), &self.context, Some(acc))?;
        }
        Ok(HookOutcome::Value(acc))
    }

    /// Onion fold, awaiting each accumulator before feeding it onward.
    pub async fn run_hook_onion_sync<'a, T, F>(
        &'a self,
        point: HookPoint,
        mut call: F,
    ) -> HttpResult<HookOutcome<T>>
    where
        T: Send + 'a,
        F: FnMut(Arc<dyn Plugin>, &'a PluginContext, Option<T>) -> BoxFuture<'a, HttpResult<T>>
            + Send,
    {
        let handlers = self.registry.select(point);
        let handler_count = handlers.len();
        let mut handlers = handlers.into_iter();
        let Some(first) = handlers.next() else {
            return Ok(HookOutcome::NoPlugin);
        };

        debug!(hook = %point, handler_count, "Dispatching onion hook sequentially");

        let mut acc = call(first, &self.context, None).await?;
        for plugin in handlers {
            acc = call(plugin, &self.context, Some(acc)).await?;
        }
        Ok(HookOutcome::Value(acc))
    }

    /// Returns the context handed to handlers.
    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    /// Returns the registry hooks are selected from.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}
