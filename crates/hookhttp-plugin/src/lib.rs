//! # hookhttp-plugin
//!
//! Plugin framework for hookhttp. Provides:
//!
//! - The `Plugin` capability trait and closure-built plugins
//! - An insertion-ordered, snapshot-on-read plugin registry
//! - A hook dispatcher with broadcast and onion strategies
//! - The cancellation registry and the plugin that owns it

pub mod builtin;
pub mod cancel;
pub mod context;
pub mod hooks;
pub mod macros;
pub mod plugin;
pub mod prelude;
pub mod traits;

pub use cancel::{CancelRegistration, CancellationRegistry};
pub use context::PluginContext;
pub use hooks::definitions::{
    BeforeAction, ErrorContext, FinallyContext, HookOutcome, HookPoint, HookSet, HttpErrorStatus,
};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::PluginRegistry;
pub use plugin::{Plugin, PluginInfo};
pub use traits::ClosurePlugin;
