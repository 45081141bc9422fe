/// Resource handle: a counted accessor bound to one `(type, key)` slot.
///
/// Handles are obtained from `ResourceManager::get` and are valid to hold
/// before the resource exists. Cloning a handle increments the slot's
/// handle count and dropping it decrements the count; under the
/// ReferenceCounted policy the last drop destroys the value.

use std::fmt;
use std::sync::Arc;
use crate::error::{Error, Result};
use super::resource_state::{ResourcePolicy, ResourceState};
use super::resource_table::{Resource, ResourceTable, SlotKey};

/// Accessor for a resource of type `T` stored in a ResourceManager
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_resources::galaxy3d::resource::{ResourceManager, ResourcePolicy};
///
/// struct Mesh { vertex_count: usize }
///
/// let manager = ResourceManager::new();
/// let cube = manager.get::<Mesh>("cube")?;
/// if !cube.is_ready() {
///     manager.set("cube", Mesh { vertex_count: 24 }, ResourcePolicy::Resident)?;
/// }
/// assert_eq!(cube.get()?.vertex_count, 24);
/// # Ok::<(), galaxy_3d_resources::galaxy3d::Error>(())
/// ```
pub struct Handle<T: Resource> {
    table: Arc<ResourceTable<T>>,
    slot: SlotKey,
    key: Arc<str>,
}

impl<T: Resource> Handle<T> {
    /// Internal only, the slot count was already incremented by the table
    pub(crate) fn new(table: Arc<ResourceTable<T>>, slot: SlotKey, key: Arc<str>) -> Self {
        Self { table, slot, key }
    }

    /// Resource key this handle is bound to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current data state of the slot
    pub fn state(&self) -> ResourceState {
        self.table.slot_state(self.slot)
    }

    /// Lifetime policy, or `None` while nothing is stored
    pub fn policy(&self) -> Option<ResourcePolicy> {
        self.table.slot_policy(self.slot)
    }

    /// Whether `get` would currently succeed
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Number of live handles to this slot, this one included
    pub fn handle_count(&self) -> usize {
        self.table.slot_handles(self.slot)
    }

    /// Get the resource value
    ///
    /// The returned `Arc` keeps the value alive for the caller even if the
    /// slot is freed afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotReady` if the slot has no Final value
    /// (never stored, still loading, or freed).
    pub fn get(&self) -> Result<Arc<T>> {
        self.table.slot_value(self.slot)?
            .ok_or_else(|| self.not_ready())
    }

    /// Get the resource value, or the type's fallback while it is not ready
    ///
    /// # Errors
    ///
    /// Returns `Error::NotReady` if neither the value nor a fallback exists.
    pub fn get_or_fallback(&self) -> Result<Arc<T>> {
        if let Some(value) = self.table.slot_value(self.slot)? {
            return Ok(value);
        }
        self.table.fallback()?
            .ok_or_else(|| self.not_ready())
    }

    fn not_ready(&self) -> Error {
        Error::NotReady(format!("{} '{}' is {}",
            self.table.type_name(), self.key, self.state()))
    }
}

impl<T: Resource> Clone for Handle<T> {
    fn clone(&self) -> Self {
        self.table.retain(self.slot);
        Self {
            table: self.table.clone(),
            slot: self.slot,
            key: self.key.clone(),
        }
    }
}

impl<T: Resource> Drop for Handle<T> {
    fn drop(&mut self) {
        self.table.release_handle(self.slot);
    }
}

impl<T: Resource> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type", &self.table.type_name())
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
