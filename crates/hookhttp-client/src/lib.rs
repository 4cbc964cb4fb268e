//! # hookhttp-client
//!
//! The plugin-driven HTTP client. Provides:
//!
//! - `HttpClient`, the facade running every request through the hook
//!   lifecycle, with `apply_cancel` and `create_cancel_id`
//! - Base URL resolution for single and multi-service setups
//! - A reqwest-backed `Transport`

pub mod client;
pub mod transport;
pub mod url;
mod verbs;

pub use client::{HttpClient, HttpClientBuilder};
pub use transport::{ReqwestTransport, Transport};
