/*!
# Galaxy 3D Resources

Typed resource cache for Galaxy3D applications.

Scene objects ask a `ResourceManager` for the meshes, textures, shaders, and
importers they need by name. The first object to find a resource missing
builds it and stores it under a lifetime policy; every later request gets a
handle to the same instance.

## Architecture

- **ResourceManager**: explicitly constructed context owning one slot table per value type
- **Handle**: counted accessor bound to one `(type, key)` slot
- **ResourcePolicy**: `Resident`, `Manual`, or `ReferenceCounted` lifetime
- **ResourceState**: `Unknown`, `Loading`, or `Final`
- **ResourceLoader**: optional per-type producer called for unknown keys
- **Engine**: logging front shared by all managers
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod resource;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging front
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }
}
