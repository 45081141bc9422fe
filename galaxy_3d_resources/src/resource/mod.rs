//! Resource management module
//!
//! Provides a typed, key-addressed resource cache with per-resource
//! lifetime policies, counted handles, fallbacks, and loaders.

mod config;
mod handle;
mod loader;
mod resource_manager;
mod resource_state;
mod resource_table;

pub use config::ResourceManagerConfig;
pub use handle::Handle;
pub use loader::{LoadedResource, ResourceLoader};
pub use resource_manager::ResourceManager;
pub use resource_state::{ResourcePolicy, ResourceState};
pub use resource_table::{Resource, ResourceStats};
