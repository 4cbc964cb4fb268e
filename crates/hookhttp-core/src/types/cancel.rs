//! Cancel tokens and the cooperative abort flag.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Opaque token correlating an in-flight request with its abort handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CancelId(String);

impl CancelId {
    /// Generates a fresh random token (UUID v4, OS-seeded CSPRNG).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CancelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CancelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CancelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CancelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Cooperative abort flag for one in-flight request.
///
/// Clones share state: aborting any clone aborts them all. Aborting never
/// interrupts running code; holders observe it through [`is_aborted`] or
/// by awaiting [`aborted`].
///
/// [`is_aborted`]: AbortHandle::is_aborted
/// [`aborted`]: AbortHandle::aborted
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl AbortHandle {
    /// Creates a handle that has not been aborted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aborts the request. Only the first reason is kept.
    pub fn abort(&self, reason: Option<&str>) {
        if let Some(reason) = reason {
            let _ = self.reason.set(reason.to_string());
        }
        self.token.cancel();
    }

    /// Returns whether [`abort`](AbortHandle::abort) has been called.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the handle is aborted.
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }

    /// Reason given to the first `abort` call that carried one.
    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }

    /// Returns whether both handles share the same state.
    pub fn same_as(&self, other: &AbortHandle) -> bool {
        Arc::ptr_eq(&self.reason, &other.reason)
    }
}
