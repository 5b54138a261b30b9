//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the severity filter.

use crate::error::Error;
use crate::log::{self, DefaultLogger, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

// Other tests in this binary log concurrently (mesh failures); keep only ours
const TEST_SOURCE: &str = "candid::test::log";

fn captured_from_test(entries: &Arc<Mutex<Vec<LogEntry>>>) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.source == TEST_SOURCE)
        .cloned()
        .collect()
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
fn test_log_severity_from_u8_roundtrip() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(LogSeverity::from_u8(severity as u8), severity);
    }
    assert_eq!(LogSeverity::from_u8(200), LogSeverity::Error);
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_without_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "candid::Renderer".to_string(),
        message: "Renderer created".to_string(),
        file: None,
        line: None,
    };

    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.source, "candid::Renderer");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());
}

#[test]
fn test_default_logger_prints_both_formats() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "candid::test".to_string(),
        message: "plain".to_string(),
        file: None,
        line: None,
    });
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "candid::test".to_string(),
        message: "detailed".to_string(),
        file: Some("log_tests.rs"),
        line: Some(42),
    });
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_macros_reach_custom_logger() {
    let entries = capture();
    log::set_min_severity(LogSeverity::Trace);

    crate::candid_info!(TEST_SOURCE, "value = {}", 7);
    crate::candid_error!(TEST_SOURCE, "broken");

    {
        let entries = captured_from_test(&entries);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "value = 7");
        assert!(entries[0].file.is_none());
        assert_eq!(entries[1].severity, LogSeverity::Error);
        assert!(entries[1].file.is_some());
        assert!(entries[1].line.is_some());
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let entries = capture();
    log::set_min_severity(LogSeverity::Warn);

    crate::candid_debug!(TEST_SOURCE, "dropped");
    crate::candid_warn!(TEST_SOURCE, "kept");

    let kept = captured_from_test(&entries);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].message, "kept");
    assert_eq!(log::min_severity(), LogSeverity::Warn);

    log::set_min_severity(LogSeverity::Trace);
    log::reset_logger();
}

#[test]
#[serial]
fn test_candid_err_logs_and_builds_error() {
    let entries = capture();
    log::set_min_severity(LogSeverity::Trace);

    let err = crate::candid_err!(Error::InvalidArgument, TEST_SOURCE, "rings = {}", 1);
    assert_eq!(err, Error::InvalidArgument("rings = 1".to_string()));

    {
        let entries = captured_from_test(&entries);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, LogSeverity::Error);
        assert_eq!(entries[0].message, "rings = 1");
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_candid_bail_returns_error() {
    let _entries = capture();

    fn failing(flag: bool) -> crate::error::Result<u32> {
        if flag {
            crate::candid_bail!(Error::ResourceCreationFailed, "candid::test", "flag set");
        }
        Ok(1)
    }

    assert_eq!(failing(false), Ok(1));
    assert_eq!(
        failing(true),
        Err(Error::ResourceCreationFailed("flag set".to_string()))
    );

    log::reset_logger();
}
