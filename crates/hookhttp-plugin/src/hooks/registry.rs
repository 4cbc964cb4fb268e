//! Plugin registry: the ordered, shared sequence hooks are selected from.
//!
//! Order of effect is insertion order; there is no priority field and no
//! deduplication. The sequence is copy-on-write: readers take a snapshot
//! by cloning an `Arc`, writers swap in a new vector, so a dispatch that
//! already selected its handlers never observes later mutation.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::definitions::HookPoint;
use crate::plugin::Plugin;

type Entries = Arc<Vec<Arc<dyn Plugin>>>;

/// Shared handle to the ordered plugin sequence.
///
/// Clones refer to the same registry.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    entries: Arc<RwLock<Entries>>,
}

impl PluginRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin at the tail.
    pub fn add(&self, plugin: Arc<dyn Plugin>) -> &Self {
        self.add_all([plugin])
    }

    /// Appends plugins at the tail, preserving their relative order.
    pub fn add_all<I>(&self, plugins: I) -> &Self
    where
        I: IntoIterator<Item = Arc<dyn Plugin>>,
    {
        let plugins: Vec<Arc<dyn Plugin>> = plugins.into_iter().collect();
        if plugins.is_empty() {
            return self;
        }

        let mut entries = self.entries.write();
        let mut next = Vec::with_capacity(entries.len() + plugins.len());
        next.extend(entries.iter().cloned());
        for plugin in plugins {
            info!(plugin = %plugin.info(), hooks = ?plugin.hooks(), "Plugin registered");
            next.push(plugin);
        }
        *entries = Arc::new(next);
        self
    }

    /// Removes every entry that is the same object as `plugin`.
    pub fn remove(&self, plugin: &Arc<dyn Plugin>) -> &Self {
        self.remove_all(std::slice::from_ref(plugin))
    }

    /// Removes every entry that is the same object as any of `plugins`.
    ///
    /// Plugins that are not registered are ignored.
    pub fn remove_all(&self, plugins: &[Arc<dyn Plugin>]) -> &Self {
        let mut entries = self.entries.write();
        let before = entries.len();
        let next: Vec<Arc<dyn Plugin>> = entries
            .iter()
            .filter(|entry| !plugins.iter().any(|p| Arc::ptr_eq(entry, p)))
            .cloned()
            .collect();

        if next.len() != before {
            info!(removed = before - next.len(), "Plugins unregistered");
            *entries = Arc::new(next);
        }
        self
    }

    /// Removes every plugin.
    pub fn clear(&self) -> &Self {
        let mut entries = self.entries.write();
        if !entries.is_empty() {
            info!(removed = entries.len(), "Plugin registry cleared");
            *entries = Arc::new(Vec::new());
        }
        self
    }

    /// Returns whether `plugin` (by identity) is registered.
    pub fn has(&self, plugin: &Arc<dyn Plugin>) -> bool {
        self.entries.read().iter().any(|entry| Arc::ptr_eq(entry, plugin))
    }

    /// Returns the number of entries, duplicates included.
    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the current sequence. Later mutation does not affect it.
    pub fn snapshot(&self) -> Vec<Arc<dyn Plugin>> {
        self.current().iter().cloned().collect()
    }

    /// Calls `f` for each entry of a snapshot, in order.
    pub fn for_each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(usize, &Arc<dyn Plugin>),
    {
        for (index, plugin) in self.current().iter().enumerate() {
            f(index, plugin);
        }
        self
    }

    /// Returns the plugins implementing `point`, in registry order, taken
    /// from a point-in-time snapshot.
    pub fn select(&self, point: HookPoint) -> Vec<Arc<dyn Plugin>> {
        let selected: Vec<Arc<dyn Plugin>> = self
            .current()
            .iter()
            .filter(|plugin| plugin.hooks().contains(point))
            .cloned()
            .collect();
        debug!(hook = %point, selected = selected.len(), "Selected hook handlers");
        selected
    }

    fn current(&self) -> Entries {
        self.entries.read().clone()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("size", &self.size())
            .finish()
    }
}
