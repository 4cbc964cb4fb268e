//! Plugin context: client state visible to hook handlers.

use std::sync::Arc;

use hookhttp_core::config::ClientConfig;

use crate::hooks::registry::PluginRegistry;

/// Context passed to every hook invocation in place of a bound receiver.
///
/// Handlers can read the client's configuration and reach the registry
/// (for example to add or remove plugins). They must not assume exclusive
/// access: other requests may be dispatching against the same registry.
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Client configuration.
    pub config: Arc<ClientConfig>,
    /// The registry the hooks are dispatched from.
    pub plugins: PluginRegistry,
}

impl PluginContext {
    /// Creates a context for `config` and `plugins`.
    pub fn new(config: Arc<ClientConfig>, plugins: PluginRegistry) -> Self {
        Self { config, plugins }
    }
}

impl Default for PluginContext {
    fn default() -> Self {
        Self::new(Arc::new(ClientConfig::default()), PluginRegistry::new())
    }
}
