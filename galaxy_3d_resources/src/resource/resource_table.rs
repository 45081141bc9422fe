/// Typed slot table holding every resource of one value type.
///
/// Slots live in a SlotMap so handles can keep a stable key while other
/// slots come and go. A name index maps resource keys to slot keys.
/// All mutation happens under one mutex per table; values that must be
/// destroyed are always handed back to the caller and dropped after the
/// lock is released, so a value's own Drop may touch the table again.

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::{engine_bail, engine_err, engine_debug, engine_trace, engine_warn};
use super::handle::Handle;
use super::loader::{LoadedResource, ResourceLoader};
use super::resource_state::{ResourcePolicy, ResourceState};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key of a slot within its ResourceTable.
    pub(crate) struct SlotKey;
}

/// Values that can be stored in a ResourceManager
pub trait Resource: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Resource for T {}

/// Short type name for logs ("Mesh" instead of "galaxy3d_demo::mesh::Mesh")
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base_end = full.find('<').unwrap_or(full.len());
    match full[..base_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

// ===== STATISTICS =====

/// Resource counts, per table or summed over a whole manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// Number of value types with a table
    pub types: usize,
    /// Number of slots (any state)
    pub slots: usize,
    /// Number of slots holding a Final value
    pub ready: usize,
    /// Number of live handles
    pub handles: usize,
}

impl std::ops::AddAssign for ResourceStats {
    fn add_assign(&mut self, other: Self) {
        self.types += other.types;
        self.slots += other.slots;
        self.ready += other.ready;
        self.handles += other.handles;
    }
}

// ===== SLOT =====

pub(crate) struct Slot<T> {
    pub(crate) name: Arc<str>,
    pub(crate) value: Option<Arc<T>>,
    pub(crate) state: ResourceState,
    pub(crate) policy: Option<ResourcePolicy>,
    pub(crate) handles: usize,
}

impl<T> Slot<T> {
    fn new(name: Arc<str>) -> Self {
        Self {
            name,
            value: None,
            state: ResourceState::Unknown,
            policy: None,
            handles: 0,
        }
    }

    /// Take the value out and go back to Unknown
    fn reset(&mut self) -> Option<Arc<T>> {
        self.state = ResourceState::Unknown;
        self.policy = None;
        self.value.take()
    }

    /// Value may be destroyed by `free_unused`
    fn is_collectable(&self) -> bool {
        self.handles == 0
            && self.state == ResourceState::Final
            && self.policy != Some(ResourcePolicy::Resident)
    }
}

// ===== TABLE =====

pub(crate) struct TableInner<T> {
    slots: SlotMap<SlotKey, Slot<T>>,
    index: FxHashMap<Arc<str>, SlotKey>,
    fallback: Option<Arc<T>>,
}

impl<T> TableInner<T> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            index: FxHashMap::default(),
            fallback: None,
        }
    }

    fn find(&self, key: &str) -> Option<SlotKey> {
        self.index.get(key).copied()
    }

    fn slot(&self, key: &str) -> Option<&Slot<T>> {
        self.find(key).and_then(|slot| self.slots.get(slot))
    }

    /// Returns the slot key and whether the slot was just created
    fn find_or_create(&mut self, key: &str) -> (SlotKey, bool) {
        if let Some(slot) = self.find(key) {
            return (slot, false);
        }
        let name: Arc<str> = Arc::from(key);
        let slot = self.slots.insert(Slot::new(name.clone()));
        self.index.insert(name, slot);
        (slot, true)
    }

    fn remove(&mut self, slot: SlotKey) -> Option<Arc<T>> {
        let removed = self.slots.remove(slot)?;
        self.index.remove(&removed.name);
        removed.value
    }
}

/// Registered loader of a table
///
/// `generation` changes on every `set_loader` / `remove_loader`, so a loader
/// taken out by `run_loader` is only put back if nobody replaced or removed
/// it meanwhile.
struct LoaderSlot<T> {
    loader: Option<Box<dyn ResourceLoader<T>>>,
    generation: u64,
    /// Generation of the loader currently taken out by `run_loader`
    running: Option<u64>,
}

/// Outcome of dropping one handle
enum Release<T> {
    Kept,
    Destroyed(Arc<str>, Option<Arc<T>>),
    Pruned(Arc<str>),
}

/// Outcome of `free` on one slot
enum Freed<T> {
    Missing,
    NotFinal(ResourceState),
    Resident,
    StillHeld(usize),
    Manual { handles: usize, value: Option<Arc<T>> },
    Deferred(usize),
    Destroyed(Option<Arc<T>>),
}

/// Storage for all resources of type `T` in one manager
///
/// Log entries are emitted only after the table lock is released, so a
/// `Logger` may query the manager it is reporting for.
pub(crate) struct ResourceTable<T: Resource> {
    source: String,
    type_name: &'static str,
    strict_manual_free: bool,
    inner: Mutex<TableInner<T>>,
    loader: Mutex<LoaderSlot<T>>,
}

impl<T: Resource> ResourceTable<T> {
    pub(crate) fn new(source: &str, strict_manual_free: bool) -> Self {
        Self {
            source: source.to_string(),
            type_name: short_type_name::<T>(),
            strict_manual_free,
            inner: Mutex::new(TableInner::new()),
            loader: Mutex::new(LoaderSlot {
                loader: None,
                generation: 0,
                running: None,
            }),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn lock(&self) -> Result<MutexGuard<'_, TableInner<T>>> {
        self.inner.lock().map_err(|_| engine_err!(&self.source, LockPoisoned,
            "{} table lock poisoned", self.type_name))
    }

    fn lock_loader(&self) -> Result<MutexGuard<'_, LoaderSlot<T>>> {
        self.loader.lock().map_err(|_| engine_err!(&self.source, LockPoisoned,
            "{} loader lock poisoned", self.type_name))
    }

    // ===== HANDLES =====

    /// Get a counted handle, creating the slot and running the loader if needed
    pub(crate) fn acquire(self: &Arc<Self>, key: &str) -> Result<Handle<T>> {
        let (slot, name, created, needs_load) = {
            let mut inner = self.lock()?;
            let (slot, created) = inner.find_or_create(key);
            let entry = &mut inner.slots[slot];
            entry.handles += 1;
            (slot, entry.name.clone(), created, entry.state == ResourceState::Unknown)
        };
        if created {
            engine_trace!(&self.source, "Created {} slot '{}'", self.type_name, key);
        }

        // Counted before the loader runs so a ReferenceCounted value it
        // produces cannot be collected in between
        let handle = Handle::new(self.clone(), slot, name);
        if needs_load {
            self.run_loader(key)?;
        }
        Ok(handle)
    }

    pub(crate) fn retain(&self, slot: SlotKey) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(entry) = inner.slots.get_mut(slot) {
                entry.handles += 1;
            }
        }
    }

    pub(crate) fn release_handle(&self, slot: SlotKey) {
        let released = match self.inner.lock() {
            Ok(mut inner) => Self::release_locked(&mut inner, slot),
            Err(_) => Release::Kept,
        };
        match released {
            Release::Kept => {}
            Release::Destroyed(name, value) => {
                engine_debug!(&self.source, "Last handle to {} '{}' released, destroying",
                    self.type_name, name);
                drop(value);
            }
            Release::Pruned(name) => {
                engine_trace!(&self.source, "Pruned empty {} slot '{}'", self.type_name, name);
            }
        }
    }

    fn release_locked(inner: &mut TableInner<T>, slot: SlotKey) -> Release<T> {
        let Some(entry) = inner.slots.get_mut(slot) else {
            return Release::Kept;
        };
        entry.handles = entry.handles.saturating_sub(1);
        if entry.handles > 0 {
            return Release::Kept;
        }

        match (entry.state, entry.policy) {
            (ResourceState::Final, Some(ResourcePolicy::ReferenceCounted)) => {
                let name = entry.name.clone();
                Release::Destroyed(name, inner.remove(slot))
            }
            (ResourceState::Unknown, _) => {
                let name = entry.name.clone();
                inner.remove(slot);
                Release::Pruned(name)
            }
            _ => Release::Kept,
        }
    }

    pub(crate) fn slot_state(&self, slot: SlotKey) -> ResourceState {
        self.inner.lock().ok()
            .and_then(|inner| inner.slots.get(slot).map(|entry| entry.state))
            .unwrap_or_default()
    }

    pub(crate) fn slot_policy(&self, slot: SlotKey) -> Option<ResourcePolicy> {
        self.inner.lock().ok()
            .and_then(|inner| inner.slots.get(slot).and_then(|entry| entry.policy))
    }

    pub(crate) fn slot_handles(&self, slot: SlotKey) -> usize {
        self.inner.lock().ok()
            .and_then(|inner| inner.slots.get(slot).map(|entry| entry.handles))
            .unwrap_or(0)
    }

    /// Current value of a slot, `None` unless it is Final
    pub(crate) fn slot_value(&self, slot: SlotKey) -> Result<Option<Arc<T>>> {
        let inner = self.lock()?;
        Ok(inner.slots.get(slot).and_then(|entry| entry.value.clone()))
    }

    pub(crate) fn fallback(&self) -> Result<Option<Arc<T>>> {
        Ok(self.lock()?.fallback.clone())
    }

    // ===== POPULATION =====

    /// Returns the live handle count, or the existing policy if the slot is already Final
    fn fill(&self, key: &str, value: T, policy: ResourcePolicy)
        -> Result<std::result::Result<usize, Option<ResourcePolicy>>>
    {
        let mut inner = self.lock()?;
        let (slot, _) = inner.find_or_create(key);
        let entry = &mut inner.slots[slot];

        if entry.state == ResourceState::Final {
            return Ok(Err(entry.policy));
        }
        entry.value = Some(Arc::new(value));
        entry.state = ResourceState::Final;
        entry.policy = Some(policy);
        Ok(Ok(entry.handles))
    }

    pub(crate) fn store(&self, key: &str, value: T, policy: ResourcePolicy) -> Result<()> {
        match self.fill(key, value, policy)? {
            Ok(handles) => {
                engine_debug!(&self.source, "Stored {} '{}' as {} ({} live handle(s))",
                    self.type_name, key, policy, handles);
                Ok(())
            }
            Err(existing) => {
                engine_bail!(&self.source, DuplicateKey,
                    "{} '{}' is already final ({})", self.type_name, key,
                    existing.map_or("no policy".to_string(), |p| p.to_string()));
            }
        }
    }

    pub(crate) fn mark_loading(&self, key: &str) -> Result<()> {
        let previous = {
            let mut inner = self.lock()?;
            let (slot, _) = inner.find_or_create(key);
            let entry = &mut inner.slots[slot];
            let previous = entry.state;
            if previous == ResourceState::Unknown {
                entry.state = ResourceState::Loading;
            }
            previous
        };

        match previous {
            ResourceState::Final => {
                engine_bail!(&self.source, DuplicateKey,
                    "{} '{}' is already final, cannot mark it loading", self.type_name, key);
            }
            ResourceState::Loading => {}
            ResourceState::Unknown => {
                engine_trace!(&self.source, "{} '{}' is loading", self.type_name, key);
            }
        }
        Ok(())
    }

    pub(crate) fn set_loader(&self, loader: Box<dyn ResourceLoader<T>>) -> Result<()> {
        let previous = {
            let mut slot = self.lock_loader()?;
            slot.generation += 1;
            slot.loader.replace(loader)
        };
        drop(previous);
        Ok(())
    }

    /// Returns whether a loader was registered, including one that is running
    pub(crate) fn remove_loader(&self) -> Result<bool> {
        let (removed, running) = {
            let mut slot = self.lock_loader()?;
            let running = slot.running == Some(slot.generation);
            slot.generation += 1;
            (slot.loader.take(), running)
        };
        let registered = removed.is_some() || running;
        drop(removed);
        Ok(registered)
    }

    /// Ask the registered loader for `key`.
    ///
    /// The loader is taken out of its slot while it runs, so a nested `get`
    /// of the same type from inside the loader does not re-enter it. It is
    /// put back unless `set_loader` or `remove_loader` ran meanwhile.
    fn run_loader(&self, key: &str) -> Result<()> {
        let (taken, generation) = {
            let mut slot = self.lock_loader()?;
            let taken = slot.loader.take();
            if taken.is_some() {
                slot.running = Some(slot.generation);
            }
            (taken, slot.generation)
        };
        let Some(mut loader) = taken else {
            return Ok(());
        };

        let loaded = loader.load(key);

        let stale = match self.loader.lock() {
            Ok(mut slot) => {
                slot.running = None;
                if slot.generation == generation && slot.loader.is_none() {
                    slot.loader = Some(loader);
                    None
                } else {
                    Some(loader)
                }
            }
            Err(_) => Some(loader),
        };
        if stale.is_some() {
            engine_trace!(&self.source, "{} loader replaced or removed while loading '{}'",
                self.type_name, key);
        }
        drop(stale);

        match loaded {
            Some(LoadedResource { value, policy }) => self.store_loaded(key, value, policy),
            None => {
                engine_trace!(&self.source, "Loader has no {} '{}'", self.type_name, key);
                Ok(())
            }
        }
    }

    /// Like `store`, but a slot that became Final meanwhile silently wins
    fn store_loaded(&self, key: &str, value: T, policy: ResourcePolicy) -> Result<()> {
        match self.fill(key, value, policy)? {
            Ok(_) => {
                engine_debug!(&self.source, "Loaded {} '{}' as {}", self.type_name, key, policy);
            }
            Err(_) => {
                engine_debug!(&self.source, "Discarded loaded {} '{}', already final",
                    self.type_name, key);
            }
        }
        Ok(())
    }

    pub(crate) fn set_fallback(&self, value: Option<T>) -> Result<()> {
        let previous = {
            let mut inner = self.lock()?;
            std::mem::replace(&mut inner.fallback, value.map(Arc::new))
        };
        drop(previous);
        Ok(())
    }

    // ===== DESTRUCTION =====

    fn free_locked(&self, inner: &mut TableInner<T>, key: &str) -> Freed<T> {
        let Some(slot) = inner.find(key) else {
            return Freed::Missing;
        };
        let entry = &mut inner.slots[slot];
        if entry.state != ResourceState::Final {
            return Freed::NotFinal(entry.state);
        }

        let handles = entry.handles;
        match entry.policy {
            Some(ResourcePolicy::Resident) => Freed::Resident,
            Some(ResourcePolicy::Manual) => {
                if handles > 0 && self.strict_manual_free {
                    return Freed::StillHeld(handles);
                }
                let value = entry.reset();
                if handles == 0 {
                    inner.remove(slot);
                }
                Freed::Manual { handles, value }
            }
            Some(ResourcePolicy::ReferenceCounted) | None => {
                if handles > 0 {
                    Freed::Deferred(handles)
                } else {
                    Freed::Destroyed(inner.remove(slot))
                }
            }
        }
    }

    pub(crate) fn free(&self, key: &str) -> Result<()> {
        let freed = {
            let mut inner = self.lock()?;
            self.free_locked(&mut inner, key)
        };

        match freed {
            Freed::Missing => {
                engine_trace!(&self.source, "Free of unknown {} '{}' ignored", self.type_name, key);
            }
            Freed::NotFinal(state) => {
                engine_trace!(&self.source, "Free of {} '{}' ignored, state is {}",
                    self.type_name, key, state);
            }
            Freed::Resident => {
                engine_bail!(&self.source, PolicyViolation,
                    "{} '{}' is Resident and cannot be freed", self.type_name, key);
            }
            Freed::StillHeld(handles) => {
                engine_bail!(&self.source, PolicyViolation,
                    "{} '{}' still has {} live handle(s)", self.type_name, key, handles);
            }
            Freed::Manual { handles, value } => {
                if handles > 0 {
                    engine_warn!(&self.source,
                        "Freed {} '{}' with {} live handle(s); they now observe NotReady",
                        self.type_name, key, handles);
                }
                drop(value);
                engine_debug!(&self.source, "Freed {} '{}'", self.type_name, key);
            }
            Freed::Deferred(handles) => {
                engine_debug!(&self.source,
                    "{} '{}' released by producer, destroyed after {} handle(s) drop",
                    self.type_name, key, handles);
            }
            Freed::Destroyed(value) => {
                drop(value);
                engine_debug!(&self.source, "Freed unreferenced {} '{}'", self.type_name, key);
            }
        }
        Ok(())
    }

    // ===== QUERIES =====

    pub(crate) fn state(&self, key: &str) -> Option<ResourceState> {
        self.lock().ok()?.slot(key).map(|entry| entry.state)
    }

    pub(crate) fn policy(&self, key: &str) -> Option<ResourcePolicy> {
        self.lock().ok()?.slot(key).and_then(|entry| entry.policy)
    }

    pub(crate) fn handle_count(&self, key: &str) -> usize {
        self.lock().ok()
            .and_then(|inner| inner.slot(key).map(|entry| entry.handles))
            .unwrap_or(0)
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.lock()
            .map(|inner| inner.slots.values().map(|entry| entry.name.to_string()).collect())
            .unwrap_or_default()
    }
}

// ===== TYPE ERASURE =====

/// Operations the manager runs over every table without knowing `T`
pub(crate) trait AnyTable: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn stats(&self) -> ResourceStats;

    /// Destroy unreferenced Manual / ReferenceCounted values, returns the count
    fn free_unused(&self) -> usize;

    /// Destroy every value and the fallback, returns the value count
    fn clear(&self) -> usize;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Resource> AnyTable for ResourceTable<T> {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn stats(&self) -> ResourceStats {
        self.lock()
            .map(|inner| ResourceStats {
                types: 1,
                slots: inner.slots.len(),
                ready: inner.slots.values().filter(|entry| entry.state.is_ready()).count(),
                handles: inner.slots.values().map(|entry| entry.handles).sum(),
            })
            .unwrap_or_default()
    }

    fn free_unused(&self) -> usize {
        let destroyed: Vec<Arc<T>> = match self.lock() {
            Ok(mut inner) => {
                let collectable: Vec<SlotKey> = inner.slots.iter()
                    .filter(|(_, entry)| entry.is_collectable())
                    .map(|(slot, _)| slot)
                    .collect();
                collectable.into_iter()
                    .filter_map(|slot| inner.remove(slot))
                    .collect()
            }
            Err(_) => Vec::new(),
        };
        let count = destroyed.len();
        if count > 0 {
            engine_debug!(&self.source, "Freed {} unused {} value(s)", count, self.type_name);
        }
        drop(destroyed);
        count
    }

    fn clear(&self) -> usize {
        let (destroyed, fallback): (Vec<Arc<T>>, Option<Arc<T>>) = match self.lock() {
            Ok(mut inner) => {
                let mut destroyed = Vec::new();
                let mut orphans = Vec::new();
                for (slot, entry) in inner.slots.iter_mut() {
                    if let Some(value) = entry.reset() {
                        destroyed.push(value);
                    }
                    if entry.handles == 0 {
                        orphans.push(slot);
                    }
                }
                for slot in orphans {
                    inner.remove(slot);
                }
                (destroyed, inner.fallback.take())
            }
            Err(_) => (Vec::new(), None),
        };
        let count = destroyed.len();
        drop(destroyed);
        drop(fallback);
        count
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
#[path = "resource_table_tests.rs"]
mod tests;
