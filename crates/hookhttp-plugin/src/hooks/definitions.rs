//! Hook point definitions and the values that flow through them.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hookhttp_core::error::HttpError;
use hookhttp_core::types::{RawResponse, RequestDescriptor};

/// Enumeration of all hook points in the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Fired before URL resolution. Can rewrite the request or answer it.
    OnBefore,
    /// Fired after URL resolution, right before the transport is called.
    OnRequest,
    /// Fired with the decoded body. Results compose onion-style.
    OnResponse,
    /// Fired when interception or the transport fails.
    OnError,
    /// Fired by `apply_cancel`.
    OnCancel,
    /// Fired exactly once when a request ends, whatever the outcome.
    OnFinally,
    /// Fired when the owning client is torn down.
    Destroy,
}

impl HookPoint {
    /// Every hook point, in lifecycle order.
    pub const ALL: [HookPoint; 7] = [
        Self::OnBefore,
        Self::OnRequest,
        Self::OnResponse,
        Self::OnError,
        Self::OnCancel,
        Self::OnFinally,
        Self::Destroy,
    ];

    /// Returns the string name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnBefore => "on_before",
            Self::OnRequest => "on_request",
            Self::OnResponse => "on_response",
            Self::OnError => "on_error",
            Self::OnCancel => "on_cancel",
            Self::OnFinally => "on_finally",
            Self::Destroy => "destroy",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The set of hook points a plugin participates in.
///
/// Selection checks membership here; a plugin whose set lacks a point is
/// skipped for that point even if it overrides the matching method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HookSet(u8);

impl HookSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy of the set with `point` added.
    pub fn with(self, point: HookPoint) -> Self {
        Self(self.0 | point.bit())
    }

    /// Adds `point` to the set.
    pub fn insert(&mut self, point: HookPoint) {
        self.0 |= point.bit();
    }

    /// Returns whether `point` is in the set.
    pub fn contains(&self, point: HookPoint) -> bool {
        self.0 & point.bit() != 0
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the members in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = HookPoint> + '_ {
        HookPoint::ALL.into_iter().filter(|point| self.contains(*point))
    }
}

impl FromIterator<HookPoint> for HookSet {
    fn from_iter<I: IntoIterator<Item = HookPoint>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl<const N: usize> From<[HookPoint; N]> for HookSet {
    fn from(points: [HookPoint; N]) -> Self {
        points.into_iter().collect()
    }
}

/// Result of an onion dispatch.
///
/// `NoPlugin` means nothing was selected and the caller must fall back to
/// the untransformed value. It is distinct from any value a plugin returns,
/// including `Value(serde_json::Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome<T> {
    /// No plugin implements the hook.
    NoPlugin,
    /// The final accumulator.
    Value(T),
}

impl<T> HookOutcome<T> {
    /// Returns whether no plugin ran.
    pub fn is_no_plugin(&self) -> bool {
        matches!(self, Self::NoPlugin)
    }

    /// Converts into an `Option`, mapping the sentinel to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::NoPlugin => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Returns the value, or `fallback` for the sentinel.
    pub fn unwrap_or(self, fallback: T) -> T {
        self.into_option().unwrap_or(fallback)
    }
}

/// What an `on_before` handler asks the client to do.
#[derive(Debug, Clone)]
pub enum BeforeAction {
    /// Continue with this (possibly rewritten) request.
    Proceed(RequestDescriptor),
    /// Skip the transport and use this response instead.
    Respond(RawResponse),
}

/// Tag passed as the first `on_error` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpErrorStatus {
    /// Failure before the request left the process.
    InvalidRequestError,
    /// Failure after the transport was called.
    InvalidResponseError,
}

impl HttpErrorStatus {
    /// Returns the string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequestError => "INVALID_REQUEST_ERROR",
            Self::InvalidResponseError => "INVALID_RESPONSE_ERROR",
        }
    }
}

impl fmt::Display for HttpErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context handed to `on_error` alongside the error itself.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The request as it stood when the failure happened.
    pub request: Option<RequestDescriptor>,
    /// The response, when one was received.
    pub response: Option<RawResponse>,
}

/// Context handed to `on_finally`.
#[derive(Debug, Clone, Default)]
pub struct FinallyContext {
    /// The request as it stood when it ended.
    pub request: Option<RequestDescriptor>,
    /// The response, when one was received.
    pub response: Option<RawResponse>,
    /// The failure, if the request failed.
    pub error: Option<HttpError>,
    /// Failure tag, if the request failed.
    pub reason: Option<HttpErrorStatus>,
    /// Time from `request()` to the end of the lifecycle.
    pub elapsed: Duration,
}

impl FinallyContext {
    /// Returns whether the request ended successfully.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
