//! `SQLite` Database Engine Implementation
//!
//! This module implements the `DatabaseEngine` trait for `SQLite` databases.
//!
//! # Implementation Notes
//! - Uses `rusqlite` (synchronous driver, work runs inside the future)
//! - Opened read/write without `SQLITE_OPEN_CREATE`: a missing file is a
//!   connection failure, never a fresh empty database
//! - The connection is dropped (closed) when `execute` returns, on every path
//! - The query text is run verbatim: every statement in it executes exactly
//!   once, in order, and the first statement that reports columns supplies
//!   the result set

use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, OpenFlags, Row, Statement};
use std::path::Path;

use crate::engine::{CellValue, ConnectionConfig, DatabaseEngine, ResultSet};
use crate::error::{PluginError, Result};

/// Lists user tables, internal `sqlite_%` tables excluded, sorted by name
pub const LIST_TABLES_QUERY: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name;";

/// Build the column-metadata query for `table_name`.
///
/// The name is interpolated into the SQL text as-is. It is NOT quoted or
/// escaped, so a hostile value can inject arbitrary SQL; callers must only
/// pass table names they trust (e.g. names returned by [`LIST_TABLES_QUERY`]).
#[must_use]
pub fn table_info_query(table_name: &str) -> String {
    format!("PRAGMA table_info({table_name});")
}

/// `SQLite` database engine implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEngine;

impl DatabaseEngine for SqliteEngine {
    async fn execute(config: &ConnectionConfig, query: &str) -> Result<ResultSet> {
        let conn = open_connection(&config.file)?;

        execute_query(&conn, query)
    }
}

/// Open `SQLite` connection read/write on an existing file
fn open_connection(path: &Path) -> Result<Connection> {
    log::debug!("opening {}", path.display());
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
        .map_err(|e| PluginError::connection_failed(format!("Failed to open SQLite database: {e}")))
}

/// Execute every statement in `query` and keep the first result with columns
///
/// Statements without columns (DDL, DML) still run. If no statement reports
/// columns the result is empty. A statement that fails to prepare or run
/// fails the whole query, including any statements after it.
fn execute_query(conn: &Connection, query: &str) -> Result<ResultSet> {
    let mut batch = Batch::new(conn, query);
    let mut result: Option<ResultSet> = None;
    let mut statements = 0usize;

    while let Some(mut stmt) = batch
        .next()
        .map_err(|e| PluginError::query_failed(format!("Failed to prepare query: {e}")))?
    {
        statements += 1;
        let rows = collect_rows(&mut stmt)?;
        if result.is_none() && !rows.columns.is_empty() {
            result = Some(rows);
        }
    }

    let result = result.unwrap_or_default();
    log::debug!("ran {statements} statements, read {} rows", result.row_count());
    Ok(result)
}

/// Run one prepared statement to completion and collect its rows
fn collect_rows(stmt: &mut Statement<'_>) -> Result<ResultSet> {
    let columns: Vec<String> = stmt.column_names().iter().map(|s| (*s).to_string()).collect();

    let mut rows = stmt
        .query([])
        .map_err(|e| PluginError::query_failed(format!("Failed to execute query: {e}")))?;

    let mut data = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| PluginError::query_failed(format!("Failed to fetch row: {e}")))?
    {
        let values = row_to_cells(columns.len(), row)
            .map_err(|e| PluginError::query_failed(format!("Failed to read row: {e}")))?;
        data.push(values);
    }

    Ok(ResultSet { columns, rows: data })
}

/// Convert a `SQLite` row to cells, in column order
fn row_to_cells(width: usize, row: &Row) -> std::result::Result<Vec<CellValue>, rusqlite::Error> {
    (0..width).map(|idx| row.get_ref(idx).map(cell_from_ref)).collect()
}

fn cell_from_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(s) => CellValue::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
    }
}
