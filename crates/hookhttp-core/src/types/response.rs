//! Received response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::RequestDescriptor;

/// The response exactly as the transport delivered it.
///
/// `data` is the decoded body; `on_response` plugins receive it as their
/// first argument and this struct as the second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lower-case names).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Decoded body: JSON when the server sent JSON, a string otherwise.
    pub data: Value,
    /// The request that produced this response.
    pub request: RequestDescriptor,
}

impl RawResponse {
    /// Creates a response for `request` with `status` and `data`.
    pub fn new(request: RequestDescriptor, status: u16, data: Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            data,
            request,
        }
    }

    /// Returns whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What callers of `HttpClient::request` receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// The body after every `on_response` plugin has run.
    pub data: Value,
}

impl HttpResponse {
    /// Builds the caller-facing response from the raw one and the final body.
    pub fn from_raw(raw: &RawResponse, data: Value) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers.clone(),
            data,
        }
    }
}
