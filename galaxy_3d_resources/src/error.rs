//! Error types for the Galaxy3D resource system
//!
//! This module defines the error type returned by resource lookups,
//! population, and lifetime management.

use std::fmt;

/// Result type for Galaxy3D resource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D resource errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Resource exists (or may exist) but has no final value yet
    NotReady(String),

    /// Resource already holds a final value and cannot be populated again
    DuplicateKey(String),

    /// Operation not allowed by the resource's lifetime policy
    PolicyViolation(String),

    /// Invalid resource request (empty key, type table mismatch, etc.)
    InvalidResource(String),

    /// Internal lock poisoned by a panic in another thread
    LockPoisoned(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotReady(msg) => write!(f, "Resource not ready: {}", msg),
            Error::DuplicateKey(msg) => write!(f, "Duplicate key: {}", msg),
            Error::PolicyViolation(msg) => write!(f, "Policy violation: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::LockPoisoned(msg) => write!(f, "Lock poisoned: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an error and log it at ERROR severity with file:line information
///
/// Evaluates to the `Error` value, so it composes with `ok_or_else`,
/// `map_err`, and `return Err(...)`.
///
/// # Example
///
/// ```ignore
/// let slot = table.slot(key)
///     .ok_or_else(|| engine_err!("galaxy3d::ResourceTable", InvalidResource,
///         "Unknown slot '{}'", key))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::$variant(message)
    }};
}

/// Log an error at ERROR severity and return it from the current function
///
/// # Example
///
/// ```ignore
/// if slot.state == ResourceState::Final {
///     engine_bail!("galaxy3d::ResourceManager", DuplicateKey,
///         "Resource '{}' is already final", key);
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
