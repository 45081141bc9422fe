use super::resource_state::ResourcePolicy;

/// Resource manager configuration
#[derive(Debug, Clone)]
pub struct ResourceManagerConfig {
    /// Manager name, shown in log sources as `galaxy3d::ResourceManager[name]`
    pub name: String,
    /// Policy applied by `ResourceManager::set_default`
    pub default_policy: ResourcePolicy,
    /// Reject `free` on a Manual resource while handles to it are still alive
    pub strict_manual_free: bool,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            default_policy: ResourcePolicy::ReferenceCounted,
            strict_manual_free: false,
        }
    }
}
