//! Hook system: registry, dispatcher, and typed hook definitions.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{
    BeforeAction, ErrorContext, FinallyContext, HookOutcome, HookPoint, HookSet, HttpErrorStatus,
};
pub use dispatcher::HookDispatcher;
pub use registry::PluginRegistry;
