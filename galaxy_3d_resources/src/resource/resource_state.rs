/// Resource data state and lifetime policy.
///
/// Every slot in a `ResourceManager` carries one of each. The state tells
/// consumers whether a value can be used yet; the policy tells the manager
/// when the value may be destroyed.

use std::fmt;

/// Data state of a resource slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceState {
    /// Slot exists but nothing has been stored (or the value was freed)
    #[default]
    Unknown,

    /// A producer announced the value is being built
    Loading,

    /// Value is stored and will not change until it is destroyed
    Final,
}

impl ResourceState {
    /// Whether a handle to this slot can be dereferenced
    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceState::Final)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Unknown => write!(f, "Unknown"),
            ResourceState::Loading => write!(f, "Loading"),
            ResourceState::Final => write!(f, "Final"),
        }
    }
}

/// Lifetime policy of a stored resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourcePolicy {
    /// Kept until the manager is cleared or dropped; `free` is rejected
    Resident,

    /// Kept until an explicit `free`, regardless of live handles
    Manual,

    /// Destroyed when the last handle is released
    ReferenceCounted,
}

impl fmt::Display for ResourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourcePolicy::Resident => write!(f, "Resident"),
            ResourcePolicy::Manual => write!(f, "Manual"),
            ResourcePolicy::ReferenceCounted => write!(f, "ReferenceCounted"),
        }
    }
}
