//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use hookhttp_core::config::TransportConfig;
use hookhttp_core::error::{ErrorKind, HttpError};
use hookhttp_core::result::HttpResult;
use hookhttp_core::traits::Transport;
use hookhttp_core::types::{Method, RawResponse, RequestDescriptor};

/// Sends requests with a shared [`reqwest::Client`].
///
/// JSON bodies (by `Content-Type`) are decoded into values, any other
/// non-empty body becomes a string, and an empty body becomes `null`.
/// Non-2xx statuses are returned as responses, not errors.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client from the transport configuration.
    pub fn new(config: &TransportConfig) -> HttpResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HttpError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid default header name '{name}'"),
                    e,
                )
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                HttpError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid value for default header '{name}'"),
                    e,
                )
            })?;
            headers.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            HttpError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
        })?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, request: &RequestDescriptor) -> HttpResult<RawResponse> {
        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.contains("json"));

        let bytes = response.bytes().await.map_err(map_error)?;
        debug!(status, body_len = bytes.len(), "Response received");

        Ok(RawResponse {
            status,
            headers,
            data: decode_body(&bytes, is_json)?,
            request: request.clone(),
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn decode_body(bytes: &[u8], is_json: bool) -> HttpResult<Value> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    if is_json {
        return serde_json::from_slice(bytes).map_err(|e| {
            HttpError::with_source(
                ErrorKind::InvalidResponse,
                format!("Invalid JSON response body: {e}"),
                e,
            )
        });
    }
    Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn map_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::with_source(ErrorKind::Timeout, format!("Request timed out: {err}"), err)
    } else {
        HttpError::with_source(ErrorKind::Transport, format!("Transport error: {err}"), err)
    }
}
