//! # hookhttp-core
//!
//! Core crate for hookhttp. Contains the request/response descriptors,
//! cancellation primitives, configuration schemas, the transport seam,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other hookhttp crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{ErrorKind, HttpError};
pub use result::HttpResult;
