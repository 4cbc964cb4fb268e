//! Cancellation registry mapping cancel tokens to the abort handle of the
//! request currently using them.
//!
//! The client inserts an entry when a request carrying a token is issued;
//! the owning plugin resolves and removes it on `on_cancel`, and removes it
//! on `on_finally`. Each [`CancelRegistration`] also removes its own entry
//! when dropped, so the table cannot outgrow the set of in-flight requests
//! even without a plugin.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use hookhttp_core::error::HttpError;
use hookhttp_core::result::HttpResult;
use hookhttp_core::types::{AbortHandle, CancelId};

/// Shared table of live cancel tokens.
#[derive(Debug, Clone, Default)]
pub struct CancellationRegistry {
    entries: Arc<DashMap<CancelId, AbortHandle>>,
}

impl CancellationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a new opaque cancel token.
    pub fn create_cancel_id() -> CancelId {
        CancelId::new()
    }

    /// Registers a fresh abort handle for `cancel_id`.
    ///
    /// Fails if the token already belongs to an in-flight request.
    pub fn register(&self, cancel_id: CancelId) -> HttpResult<CancelRegistration> {
        let handle = AbortHandle::new();
        match self.entries.entry(cancel_id.clone()) {
            Entry::Occupied(_) => {
                return Err(HttpError::invalid_request(format!(
                    "cancel id '{cancel_id}' is already in flight"
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(handle.clone());
            }
        }

        debug!(cancel_id = %cancel_id, "Cancel token registered");

        Ok(CancelRegistration {
            registry: self.clone(),
            cancel_id,
            handle,
        })
    }

    /// Aborts and deregisters the request holding `cancel_id`.
    ///
    /// Returns `false` for unknown tokens.
    pub fn cancel(&self, cancel_id: &CancelId, reason: Option<&str>) -> bool {
        match self.entries.remove(cancel_id) {
            Some((_, handle)) => {
                handle.abort(reason);
                info!(cancel_id = %cancel_id, reason = ?reason, "Request cancelled");
                true
            }
            None => {
                debug!(cancel_id = %cancel_id, "Cancel for unknown token ignored");
                false
            }
        }
    }

    /// Deregisters `cancel_id` without aborting. Returns whether it was live.
    pub fn release(&self, cancel_id: &CancelId) -> bool {
        self.entries.remove(cancel_id).is_some()
    }

    /// Returns the live handle for `cancel_id`.
    pub fn get(&self, cancel_id: &CancelId) -> Option<AbortHandle> {
        self.entries.get(cancel_id).map(|entry| entry.value().clone())
    }

    /// Returns whether `cancel_id` is live.
    pub fn contains(&self, cancel_id: &CancelId) -> bool {
        self.entries.contains_key(cancel_id)
    }

    /// Number of live tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no token is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deregisters `cancel_id` only while it still maps to `handle`.
    pub fn release_if(&self, cancel_id: &CancelId, handle: &AbortHandle) -> bool {
        self.entries
            .remove_if(cancel_id, |_, live| live.same_as(handle))
            .is_some()
    }
}

/// A live entry in the [`CancellationRegistry`].
///
/// Dropping it removes the entry if it still holds this registration's
/// handle; a newer request reusing the token is left alone.
#[derive(Debug)]
pub struct CancelRegistration {
    registry: CancellationRegistry,
    cancel_id: CancelId,
    handle: AbortHandle,
}

impl CancelRegistration {
    /// The registered token.
    pub fn cancel_id(&self) -> &CancelId {
        &self.cancel_id
    }

    /// The abort handle shared with the registry.
    pub fn handle(&self) -> &AbortHandle {
        &self.handle
    }
}

impl Drop for CancelRegistration {
    fn drop(&mut self) {
        self.registry.release_if(&self.cancel_id, &self.handle);
    }
}
