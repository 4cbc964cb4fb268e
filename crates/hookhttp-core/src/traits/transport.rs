//! HTTP transport abstraction.

use async_trait::async_trait;

use crate::result::HttpResult;
use crate::types::request::RequestDescriptor;
use crate::types::response::RawResponse;

/// Performs one HTTP exchange.
///
/// The client runs every hook around this call; implementations only move
/// bytes. Any received response, whatever its status, is returned as
/// `Ok`; status policy belongs to the client.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug + 'static {
    /// Sends `request` to the fully resolved `url`.
    async fn send(&self, url: &str, request: &RequestDescriptor) -> HttpResult<RawResponse>;
}
