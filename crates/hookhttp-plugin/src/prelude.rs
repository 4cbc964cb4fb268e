//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use hookhttp_core::error::HttpError;
pub use hookhttp_core::result::HttpResult;
pub use hookhttp_core::types::{CancelId, Method, RawResponse, RequestDescriptor};

pub use crate::context::PluginContext;
pub use crate::hooks::definitions::{
    BeforeAction, ErrorContext, FinallyContext, HookOutcome, HookPoint, HookSet, HttpErrorStatus,
};
pub use crate::plugin::{Plugin, PluginInfo};
pub use crate::traits::{ClosurePlugin, ClosurePluginBuilder};

pub use crate::plugin_info;
