/// Central resource manager.
///
/// A typed, key-addressed cache of owned values. Each value type gets its
/// own slot table; the type is part of a resource's identity, so `"cube"`
/// as a `Mesh` and `"cube"` as a `Texture` are unrelated slots.
///
/// The manager is an explicit context object: the application creates it
/// during setup and passes `&ResourceManager` to whatever needs resources.

use std::any::TypeId;
use std::sync::{Arc, Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_err, engine_info};
use super::config::ResourceManagerConfig;
use super::handle::Handle;
use super::loader::ResourceLoader;
use super::resource_state::{ResourcePolicy, ResourceState};
use super::resource_table::{AnyTable, Resource, ResourceStats, ResourceTable};

/// Typed resource cache with per-resource lifetime policies
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_resources::galaxy3d::resource::{ResourceManager, ResourcePolicy};
///
/// struct Shader { name: String }
///
/// let manager = ResourceManager::new();
///
/// let shader = manager.get::<Shader>("phong")?;
/// if !shader.is_ready() {
///     manager.set("phong", Shader { name: "phong".to_string() }, ResourcePolicy::Manual)?;
/// }
/// println!("using {}", shader.get()?.name);
///
/// drop(shader);
/// manager.free::<Shader>("phong")?;
/// # Ok::<(), galaxy_3d_resources::galaxy3d::Error>(())
/// ```
pub struct ResourceManager {
    config: ResourceManagerConfig,
    /// Log source, e.g. "galaxy3d::ResourceManager[default]"
    source: String,
    tables: Mutex<FxHashMap<TypeId, Arc<dyn AnyTable>>>,
}

impl ResourceManager {
    /// Create a new empty resource manager with the default configuration
    pub fn new() -> Self {
        Self::with_config(ResourceManagerConfig::default())
    }

    /// Create a new empty resource manager
    pub fn with_config(config: ResourceManagerConfig) -> Self {
        let source = format!("galaxy3d::ResourceManager[{}]", config.name);
        Self {
            config,
            source,
            tables: Mutex::new(FxHashMap::default()),
        }
    }

    /// Configuration this manager was created with
    pub fn config(&self) -> &ResourceManagerConfig {
        &self.config
    }

    // ===== TABLE ACCESS =====

    fn lock_tables(&self) -> Result<MutexGuard<'_, FxHashMap<TypeId, Arc<dyn AnyTable>>>> {
        self.tables.lock().map_err(|_| engine_err!(&self.source, LockPoisoned,
            "ResourceManager table registry lock poisoned"))
    }

    fn downcast<T: Resource>(&self, table: Arc<dyn AnyTable>) -> Result<Arc<ResourceTable<T>>> {
        let type_name = table.type_name();
        table.into_any()
            .downcast::<ResourceTable<T>>()
            .map_err(|_| engine_err!(&self.source, InvalidResource,
                "Table registered for {} does not hold {}",
                type_name, std::any::type_name::<T>()))
    }

    /// Table for `T`, created on first use
    fn table<T: Resource>(&self) -> Result<Arc<ResourceTable<T>>> {
        let table = {
            let mut tables = self.lock_tables()?;
            tables.entry(TypeId::of::<T>())
                .or_insert_with(|| Arc::new(ResourceTable::<T>::new(
                    &self.source, self.config.strict_manual_free)) as Arc<dyn AnyTable>)
                .clone()
        };
        self.downcast(table)
    }

    /// Table for `T` if any resource of that type was ever requested
    fn existing_table<T: Resource>(&self) -> Option<Arc<ResourceTable<T>>> {
        let table = self.lock_tables().ok()?.get(&TypeId::of::<T>())?.clone();
        self.downcast(table).ok()
    }

    fn all_tables(&self) -> Vec<Arc<dyn AnyTable>> {
        self.lock_tables()
            .map(|tables| tables.values().cloned().collect())
            .unwrap_or_default()
    }

    // ===== CORE OPERATIONS =====

    /// Get a handle to the `T` resource named `key`
    ///
    /// The slot is created in `Unknown` state if it does not exist yet; the
    /// handle is valid to hold and reports `NotReady` until the resource is
    /// stored. If a loader is registered for `T`, it is asked for the value
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Only fails if an internal lock was poisoned.
    pub fn get<T: Resource>(&self, key: &str) -> Result<Handle<T>> {
        self.table::<T>()?.acquire(key)
    }

    /// Store `value` as the `T` resource named `key`
    ///
    /// Every existing and future handle for `(T, key)` observes the value.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateKey` if the resource is already `Final`;
    /// the stored value is left untouched and `value` is dropped.
    pub fn set<T: Resource>(&self, key: &str, value: T, policy: ResourcePolicy) -> Result<()> {
        self.table::<T>()?.store(key, value, policy)
    }

    /// Store `value` under the configured default policy
    pub fn set_default<T: Resource>(&self, key: &str, value: T) -> Result<()> {
        self.set(key, value, self.config.default_policy)
    }

    /// Mark the `T` resource named `key` as being loaded
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateKey` if the resource is already `Final`.
    pub fn set_loading<T: Resource>(&self, key: &str) -> Result<()> {
        self.table::<T>()?.mark_loading(key)
    }

    /// Release the `T` resource named `key` according to its policy
    ///
    /// - `Manual`: the value is destroyed now and the slot returns to
    ///   `Unknown`; live handles observe `NotReady` from then on.
    /// - `ReferenceCounted`: destroyed now if no handle is alive, otherwise
    ///   when the last handle drops.
    /// - `Resident`: rejected.
    ///
    /// Freeing a key that does not exist or holds no value is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Error::PolicyViolation` for `Resident` resources, and for
    /// `Manual` resources with live handles when `strict_manual_free` is set.
    pub fn free<T: Resource>(&self, key: &str) -> Result<()> {
        match self.existing_table::<T>() {
            Some(table) => table.free(key),
            None => Ok(()),
        }
    }

    // ===== FALLBACKS AND LOADERS =====

    /// Set the value `Handle::get_or_fallback` returns while a `T` is not ready
    pub fn set_fallback<T: Resource>(&self, value: T) -> Result<()> {
        self.table::<T>()?.set_fallback(Some(value))
    }

    /// Remove the fallback for `T`
    pub fn clear_fallback<T: Resource>(&self) -> Result<()> {
        match self.existing_table::<T>() {
            Some(table) => table.set_fallback(None),
            None => Ok(()),
        }
    }

    /// Register the loader asked for unknown `T` resources, replacing any previous one
    pub fn set_loader<T, L>(&self, loader: L) -> Result<()>
    where
        T: Resource,
        L: ResourceLoader<T> + 'static,
    {
        self.table::<T>()?.set_loader(Box::new(loader))
    }

    /// Unregister the loader for `T`. Returns whether one was registered.
    pub fn remove_loader<T: Resource>(&self) -> Result<bool> {
        match self.existing_table::<T>() {
            Some(table) => table.remove_loader(),
            None => Ok(false),
        }
    }

    // ===== QUERIES =====

    /// Data state of a resource, `None` if no slot exists
    pub fn state<T: Resource>(&self, key: &str) -> Option<ResourceState> {
        self.existing_table::<T>()?.state(key)
    }

    /// Policy of a stored resource, `None` if nothing is stored
    pub fn policy<T: Resource>(&self, key: &str) -> Option<ResourcePolicy> {
        self.existing_table::<T>()?.policy(key)
    }

    /// Whether a `Final` value is stored for `(T, key)`
    pub fn contains<T: Resource>(&self, key: &str) -> bool {
        self.state::<T>(key) == Some(ResourceState::Final)
    }

    /// Number of live handles to a resource
    pub fn handle_count<T: Resource>(&self, key: &str) -> usize {
        self.existing_table::<T>()
            .map_or(0, |table| table.handle_count(key))
    }

    /// Number of `T` slots (any state)
    pub fn resource_count<T: Resource>(&self) -> usize {
        self.existing_table::<T>()
            .map_or(0, |table| table.stats().slots)
    }

    /// Keys of all `T` slots
    pub fn keys<T: Resource>(&self) -> Vec<String> {
        self.existing_table::<T>()
            .map(|table| table.keys())
            .unwrap_or_default()
    }

    /// Number of value types with a table
    pub fn type_count(&self) -> usize {
        self.lock_tables().map(|tables| tables.len()).unwrap_or(0)
    }

    /// Counts summed over every table
    pub fn stats(&self) -> ResourceStats {
        let mut total = ResourceStats::default();
        for table in self.all_tables() {
            total += table.stats();
        }
        total
    }

    // ===== BULK RELEASE =====

    /// Destroy every Manual and ReferenceCounted value no handle refers to
    ///
    /// Resident values are kept. Returns the number of destroyed values.
    pub fn free_unused(&self) -> usize {
        let count: usize = self.all_tables().iter()
            .map(|table| table.free_unused())
            .sum();
        if count > 0 {
            engine_info!(&self.source, "Freed {} unused resource(s)", count);
        }
        count
    }

    /// Destroy every stored value and fallback, whatever its policy
    ///
    /// Live handles stay valid and observe `NotReady`. Returns the number
    /// of destroyed values.
    pub fn clear(&self) -> usize {
        let count: usize = self.all_tables().iter()
            .map(|table| table.clear())
            .sum();
        if count > 0 {
            engine_info!(&self.source, "Cleared {} resource(s)", count);
        }
        count
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
