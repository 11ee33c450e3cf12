//! Database Engine Trait and Core Types
//!
//! This module defines the abstraction the plugin functions query through.
//! `SqliteEngine` is the only implementation.
//!
//! # Stateless Design
//! Trait methods take `&ConnectionConfig` as input.
//! Connections are opened, used, and closed within each method call.
//! Nothing is pooled or cached between calls.

use std::fmt;
use std::path::PathBuf;

use base64::Engine as _;
use crate::error::Result;

pub mod sqlite;

/// Connection configuration for the database engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Database file path
    pub file: PathBuf,
}

impl ConnectionConfig {
    /// Create a new `SQLite` connection config
    #[must_use]
    pub const fn sqlite(file: PathBuf) -> Self {
        Self { file }
    }
}

/// A single dynamically typed cell read from a result row
///
/// The `Display` implementation is the stringification used for CSV output:
///
/// | variant   | rendered as                                   |
/// |-----------|-----------------------------------------------|
/// | `Null`    | empty string                                  |
/// | `Integer` | decimal text (`-7`, `42`)                     |
/// | `Real`    | shortest round-trip decimal, no exponent (`1`, `3.5`) |
/// | `Text`    | verbatim                                      |
/// | `Blob`    | standard padded Base64                        |
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
        }
    }
}

/// Query execution result
///
/// Column names are kept in the order the driver reports them; every row
/// holds exactly one value per column, in that same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names in result set
    pub columns: Vec<String>,

    /// Result rows, in the order the engine returned them
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultSet {
    /// True when the query produced no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows in the result
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Database engine trait
///
/// Each method is stateless and takes a connection config as input.
pub trait DatabaseEngine {
    /// Execute a query verbatim
    ///
    /// This method:
    /// 1. Opens a connection
    /// 2. Executes each statement in the query exactly once
    /// 3. Reads every row
    /// 4. Closes the connection (also on error)
    /// 5. Returns the result set or error
    fn execute(
        config: &ConnectionConfig,
        query: &str,
    ) -> impl std::future::Future<Output = Result<ResultSet>> + Send;
}
