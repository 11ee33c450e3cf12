//! Failure Logging Tests
//!
//! A failed plugin call returns `""`, so the log record is the only trace of
//! what went wrong. These tests install a recording logger and check that the
//! failure message reaches it at error level.

use log::{Level, LevelFilter, Log, Metadata, Record};
use sqlplugin::SqlPlugin;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

// ============================================================================
// Test Helpers
// ============================================================================

struct Recorder {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Recorder {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records.lock().unwrap().push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder { records: Mutex::new(Vec::new()) };
static INIT: Once = Once::new();

fn init() {
    INIT.call_once(|| {
        log::set_logger(&RECORDER).expect("Failed to install logger");
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Error-level messages recorded so far that contain `needle`
fn errors_containing(needle: &str) -> Vec<String> {
    RECORDER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, message)| *level == Level::Error && message.contains(needle))
        .map(|(_, message)| message.clone())
        .collect()
}

fn create_test_db(name: &str) -> PathBuf {
    let temp_file =
        std::env::temp_dir().join(format!("sqlplugin_logging_{name}_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&temp_file);
    {
        rusqlite::Connection::open(&temp_file).expect("Failed to create temp database");
    }
    temp_file
}

fn cleanup_db(path: &Path) {
    let _ = std::fs::remove_file(path);
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_query_failure_is_logged_at_error_level() {
    init();
    let db = create_test_db("query_failure");
    let plugin = SqlPlugin::new(db.clone());

    assert_eq!(plugin.run_query("SELECT * FROM NoSuchTable").await, "");

    let errors = errors_containing("no such table: NoSuchTable");
    assert!(!errors.is_empty(), "no error record for the failed query");
    assert!(errors.iter().all(|message| message.starts_with("Error: ")));

    cleanup_db(&db);
}

#[tokio::test]
async fn test_connection_failure_is_logged_at_error_level() {
    init();
    let db = std::env::temp_dir()
        .join(format!("sqlplugin_logging_missing_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&db);

    let plugin = SqlPlugin::new(db.clone());
    assert_eq!(plugin.list_tables().await, "");

    assert!(!errors_containing("Failed to open SQLite database").is_empty());
}

#[tokio::test]
async fn test_successful_query_logs_no_error() {
    init();
    let db = create_test_db("success");
    let plugin = SqlPlugin::new(db.clone());

    assert_eq!(plugin.run_query("SELECT 'logging_ok' AS marker").await, "marker\nlogging_ok\n");
    assert!(errors_containing("logging_ok").is_empty());

    cleanup_db(&db);
}
