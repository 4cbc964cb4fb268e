//! Base URL resolution.
//!
//! Picks the base for a request from the request-level `base_url` and the
//! configured [`BaseUrl`], then joins it with the request URL.

use hookhttp_core::config::{BaseUrl, ClientConfig};
use hookhttp_core::error::{ErrorKind, HttpError};
use hookhttp_core::result::HttpResult;
use hookhttp_core::types::RequestDescriptor;

const SCHEMES: [&str; 4] = ["http://", "https://", "ws://", "wss://"];

/// Returns whether `url` starts with an http, https, ws, or wss scheme.
pub fn is_absolute(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Resolves the base URL for a request.
///
/// - An absolute request-level base is used as is.
/// - In multi-service mode a request-level base is a service key; unknown
///   keys fall back to the key itself.
/// - Without a request-level base, single-service mode uses its URL and
///   multi-service mode its `default` entry.
pub fn resolve_base_url(configured: Option<&BaseUrl>, requested: Option<&str>) -> Option<String> {
    if let Some(requested) = requested.filter(|r| !r.is_empty()) {
        if is_absolute(requested) {
            return Some(requested.to_string());
        }
        if let Some(BaseUrl::Services(services)) = configured {
            return Some(
                services
                    .get(requested)
                    .cloned()
                    .unwrap_or_else(|| requested.to_string()),
            );
        }
        return Some(requested.to_string());
    }

    match configured {
        Some(BaseUrl::Single(url)) => Some(url.clone()),
        Some(BaseUrl::Services(services)) => services.get(BaseUrl::DEFAULT_SERVICE).cloned(),
        None => None,
    }
}

/// Joins `base` and `url`. An absolute `url` ignores the base.
pub fn join_url(base: Option<&str>, url: &str) -> HttpResult<String> {
    let joined = if is_absolute(url) {
        url.to_string()
    } else {
        match base.filter(|b| !b.is_empty()) {
            Some(base) if url.is_empty() => base.to_string(),
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            None => {
                return Err(HttpError::invalid_request(format!(
                    "relative URL '{url}' has no base URL"
                )));
            }
        }
    };

    ::url::Url::parse(&joined).map_err(|e| {
        HttpError::with_source(
            ErrorKind::InvalidRequest,
            format!("invalid request URL '{joined}': {e}"),
            e,
        )
    })?;
    Ok(joined)
}

/// Resolves the final URL for `request` under `config`.
pub fn resolve_request_url(config: &ClientConfig, request: &RequestDescriptor) -> HttpResult<String> {
    let base = resolve_base_url(config.base_url.as_ref(), request.base_url.as_deref());
    join_url(base.as_deref(), &request.url)
}
