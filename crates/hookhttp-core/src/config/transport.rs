//! Transport configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings handed to the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Whole-exchange timeout in seconds. `None` disables it.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Connection establishment timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Headers attached to every request.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
    /// Treat non-2xx responses as failures.
    #[serde(default = "default_true")]
    pub reject_error_status: bool,
}

impl TransportConfig {
    /// Whole-exchange timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Connection establishment timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
            default_headers: BTreeMap::new(),
            reject_error_status: true,
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("hookhttp/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}
