//! Client configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate, overlaid with `HOOKHTTP__*` environment variables.
//! Every section has defaults, so an empty source yields a usable client.

pub mod logging;
pub mod transport;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::transport::TransportConfig;

use crate::error::HttpError;

/// Root client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for relative request URLs (single or multi-service).
    #[serde(default)]
    pub base_url: Option<BaseUrl>,
    /// Transport settings.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Built-in plugin selection.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Base URL configuration.
///
/// Either one URL for every request, or a map of service names to URLs.
/// In multi-service mode a request names its service through its own
/// `base_url`, and the `default` key is used when it names none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseUrl {
    /// Single-service mode.
    Single(String),
    /// Multi-service mode: service name → URL.
    Services(BTreeMap<String, String>),
}

impl BaseUrl {
    /// Key consulted in multi-service mode when a request names no service.
    pub const DEFAULT_SERVICE: &'static str = "default";
}

/// Built-in plugin selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Install the cancel-owning plugin so `apply_cancel` aborts requests.
    #[serde(default = "default_true")]
    pub cancelable: bool,
    /// Install the lifecycle logging plugin.
    #[serde(default)]
    pub request_log: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            cancelable: true,
            request_log: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from an optional TOML file.
    ///
    /// Values from environment variables prefixed with `HOOKHTTP` (nested
    /// keys separated by `__`) override the file.
    pub fn load(path: Option<&str>) -> Result<Self, HttpError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("HOOKHTTP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| HttpError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| HttpError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(source: &str) -> Result<Self, HttpError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

fn default_true() -> bool {
    true
}
