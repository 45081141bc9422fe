/// Producer hook for resources requested before anyone stored them.
///
/// A loader is registered per value type with `ResourceManager::set_loader`.
/// When `get` meets a key whose slot is `Unknown`, the manager calls the
/// loader synchronously (without holding any table lock) and stores whatever
/// it returns, exactly as if the caller had used `set`.

use super::resource_state::ResourcePolicy;

/// Value produced by a `ResourceLoader`, with the policy to store it under
pub struct LoadedResource<T> {
    /// The resource value
    pub value: T,
    /// Lifetime policy for the stored value
    pub policy: ResourcePolicy,
}

impl<T> LoadedResource<T> {
    /// Create a loaded resource
    pub fn new(value: T, policy: ResourcePolicy) -> Self {
        Self { value, policy }
    }
}

/// Synchronous per-type resource producer
///
/// Returning `None` leaves the slot `Unknown`; the next `get` of the same
/// key asks again.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_resources::galaxy3d::resource::{
///     LoadedResource, ResourceLoader, ResourcePolicy,
/// };
///
/// struct ShaderSource(String);
///
/// struct ShaderDirectory;
///
/// impl ResourceLoader<ShaderSource> for ShaderDirectory {
///     fn load(&mut self, key: &str) -> Option<LoadedResource<ShaderSource>> {
///         let text = std::fs::read_to_string(format!("shaders/{}.glsl", key)).ok()?;
///         Some(LoadedResource::new(ShaderSource(text), ResourcePolicy::Resident))
///     }
/// }
/// ```
pub trait ResourceLoader<T>: Send {
    /// Produce the value for `key`, or `None` if this loader cannot
    fn load(&mut self, key: &str) -> Option<LoadedResource<T>>;
}

impl<T, F> ResourceLoader<T> for F
where
    F: FnMut(&str) -> Option<LoadedResource<T>> + Send,
{
    fn load(&mut self, key: &str) -> Option<LoadedResource<T>> {
        self(key)
    }
}
