/// Galaxy3D Engine - process-wide logging front
///
/// Resource managers are explicit context objects and are never stored here.
/// The only global state is the logger slot used by the `engine_*!` macros,
/// guarded by an RwLock so custom loggers can be swapped at any time.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

/// Global logger (lazily initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

/// Engine-wide services shared by every resource manager
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_resources::galaxy3d::Engine;
/// use galaxy_3d_resources::galaxy3d::log::{DefaultLogger, LogSeverity};
///
/// // Show per-slot activity while debugging a loading phase
/// Engine::set_logger(DefaultLogger::with_min_severity(LogSeverity::Trace));
/// // ...
/// Engine::reset_logger();
/// ```
pub struct Engine;

impl Engine {
    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger, network logger, etc.)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_resources::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        Self::replace_logger(Box::new(logger));
    }

    /// Reset logger to default (DefaultLogger, Info and above)
    pub fn reset_logger() {
        Self::replace_logger(Box::new(DefaultLogger::default()));
    }

    /// Swap the logger; the previous one is dropped outside the write lock
    fn replace_logger(logger: Box<dyn Logger>) {
        let previous = match logger_lock().write() {
            Ok(mut lock) => Some(std::mem::replace(&mut *lock, logger)),
            Err(_) => None,
        };
        drop(previous);
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "galaxy3d::ResourceManager[default]")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by the engine_error!, engine_err! and engine_bail! macros.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
