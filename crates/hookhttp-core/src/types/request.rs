//! Outgoing request descriptor.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cancel::{AbortHandle, CancelId};
use crate::error::HttpError;

/// HTTP request method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Returns the canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => Err(HttpError::invalid_request(format!(
                "unsupported HTTP method '{other}'"
            ))),
        }
    }
}

/// Describes one outgoing request as plugins see it.
///
/// Plugins may rewrite any field in `on_before`/`on_request`. The abort
/// handle is attached by the client when the request carries a cancel id
/// and is never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method.
    #[serde(default)]
    pub method: Method,
    /// Absolute URL or path relative to the resolved base URL.
    pub url: String,
    /// Request-level base URL, or a service key in multi-service mode.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Query string parameters, in order.
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// JSON request body.
    #[serde(default)]
    pub body: Option<Value>,
    /// Per-request timeout overriding the transport default.
    #[serde(default)]
    pub timeout: Option<Duration>,
    /// Cancel token correlating this request with `apply_cancel`.
    #[serde(default)]
    pub cancel_id: Option<CancelId>,
    /// Abort flag shared with the cancellation registry.
    #[serde(skip)]
    pub abort: Option<AbortHandle>,
}

impl RequestDescriptor {
    /// Creates a descriptor for `method` and `url`.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the request-level base URL or service key.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Inserts a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the cancel token.
    pub fn with_cancel_id(mut self, cancel_id: CancelId) -> Self {
        self.cancel_id = Some(cancel_id);
        self
    }

    /// Returns whether the attached abort handle has fired.
    pub fn is_aborted(&self) -> bool {
        self.abort.as_ref().is_some_and(AbortHandle::is_aborted)
    }
}
