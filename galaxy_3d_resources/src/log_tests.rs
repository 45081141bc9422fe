//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, and DefaultLogger.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::ResourceManager[test]".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label(), "WARN ");
}

#[test]
fn test_log_severity_copy() {
    let sev1 = LogSeverity::Info;
    let sev2 = sev1;
    assert_eq!(sev1, sev2);
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_with_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::ResourceManager[main]".to_string(),
        message: "Mesh 'cube' is already final".to_string(),
        file: Some("resource_table.rs"),
        line: Some(42),
    };

    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.file, Some("resource_table.rs"));
    assert_eq!(entry.line, Some(42));
}

#[test]
fn test_log_entry_clone() {
    let entry1 = entry(LogSeverity::Warn, "dangling handles");
    let entry2 = entry1.clone();

    assert_eq!(entry1.severity, entry2.severity);
    assert_eq!(entry1.source, entry2.source);
    assert_eq!(entry1.message, entry2.message);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_threshold_is_info() {
    let logger = DefaultLogger::default();
    assert_eq!(logger.min_severity, LogSeverity::Info);
}

#[test]
fn test_default_logger_filters_below_threshold() {
    let logger = DefaultLogger::default();
    assert!(logger.format_entry(&entry(LogSeverity::Trace, "slot created")).is_none());
    assert!(logger.format_entry(&entry(LogSeverity::Debug, "stored")).is_none());
    assert!(logger.format_entry(&entry(LogSeverity::Info, "cleared")).is_some());
}

#[test]
fn test_default_logger_trace_threshold_keeps_everything() {
    let logger = DefaultLogger::with_min_severity(LogSeverity::Trace);
    assert!(logger.format_entry(&entry(LogSeverity::Trace, "slot created")).is_some());
}

#[test]
fn test_default_logger_format_contains_message_and_source() {
    let logger = DefaultLogger::default();
    let line = logger.format_entry(&entry(LogSeverity::Warn, "2 live handle(s)")).unwrap();
    assert!(line.contains("2 live handle(s)"));
    assert!(line.contains("galaxy3d::ResourceManager[test]"));
}

#[test]
fn test_default_logger_format_with_file_line() {
    let logger = DefaultLogger::default();
    let mut e = entry(LogSeverity::Error, "rejected");
    e.file = Some("resource_table.rs");
    e.line = Some(123);

    let line = logger.format_entry(&e).unwrap();
    assert!(line.contains("(resource_table.rs:123)"));
}

#[test]
fn test_default_logger_log_does_not_panic() {
    let logger = DefaultLogger::with_min_severity(LogSeverity::Trace);
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&entry(severity, "message"));
    }
}

// ============================================================================
// CUSTOM LOGGER TESTS
// ============================================================================

#[test]
fn test_custom_logger_trait_object() {
    use std::sync::{Arc, Mutex};

    struct Capture(Arc<Mutex<Vec<String>>>);

    impl Logger for Capture {
        fn log(&self, entry: &LogEntry) {
            self.0.lock().unwrap().push(entry.message.clone());
        }
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let logger: Box<dyn Logger> = Box::new(Capture(seen.clone()));
    logger.log(&entry(LogSeverity::Info, "hello"));

    assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
}
