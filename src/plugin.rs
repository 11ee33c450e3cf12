//! SQL Plugin Functions
//!
//! The three functions a planner may call: `list_tables`, `get_table_schema`
//! and `run_query`. Each one returns a plain string and never an error.
//!
//! # Failure Policy
//! `query_as_csv` is the boundary. Any failure below it (opening the file,
//! preparing, executing, reading rows) is logged at `error` level and turned
//! into an empty string. Callers cannot tell "failed" apart from "produced an
//! empty string"; an empty result set is reported as [`NO_DATA`] instead.
//! `try_query_as_csv` exposes the same pipeline with the error kept.
//!
//! [`NO_DATA`]: crate::csv::NO_DATA

use std::marker::PhantomData;
use std::path::PathBuf;

use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::csv::render_csv;
use crate::engine::sqlite::{table_info_query, SqliteEngine, LIST_TABLES_QUERY};
use crate::engine::{ConnectionConfig, DatabaseEngine};
use crate::error::Result;

const LIST_TABLES_DESCRIPTION: &str = "Obtain the table names in northwind sqlite database, \
which contains customer, products, orders and other data. Always run this before running other \
queries instead of assuming the user mentioned the correct name.";

const GET_TABLE_SCHEMA_DESCRIPTION: &str = "Get the schema for a table in the northwind sqlite database.
Adhere to these rules:
- The table to get the schema for.
- **Do not** include the schema name.
- Respect the table names from a previous step and do not change the casing of table names";

const RUN_QUERY_DESCRIPTION: &str = "Run SQL against the northwind database
Adhere to these rules:
- **Deliberately go through the question and database schema word by word** to appropriately answer the question
- **Use Table Aliases** to prevent ambiguity. For example, `SELECT table1.col1, table2.col1 FROM table1 JOIN table2 ON table1.id = table2.id`.
- When creating a ratio, always cast the numerator as float";

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListTablesArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTableSchemaArgs {
    /// The table to get the schema for. Do not include the schema name.
    pub table_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunQueryArgs {
    /// The query to run on northwind sqlite database.
    pub query: String,
}

/// A callable function as advertised to a planner
///
/// `description` is read by the model when choosing which function to call,
/// so its wording is part of the interface.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDescriptor {
    /// Function name
    pub name: &'static str,

    /// Natural-language description for the planner
    pub description: &'static str,

    /// JSON schema of the argument object
    pub parameters: RootSchema,
}

/// The SQL plugin bound to one database file
///
/// Holds no connection; every call opens and closes its own.
#[derive(Debug, Clone)]
pub struct SqlPlugin<E = SqliteEngine> {
    config: ConnectionConfig,
    engine: PhantomData<fn() -> E>,
}

impl SqlPlugin<SqliteEngine> {
    /// Create a plugin over the `SQLite` file at `database`
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self::with_engine(ConnectionConfig::sqlite(database.into()))
    }
}

impl<E: DatabaseEngine> SqlPlugin<E> {
    /// Create a plugin that queries through engine `E`
    #[must_use]
    pub const fn with_engine(config: ConnectionConfig) -> Self {
        Self { config, engine: PhantomData }
    }

    /// Connection settings every call opens with
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Descriptors for every function this plugin exposes
    #[must_use]
    pub fn functions() -> Vec<FunctionDescriptor> {
        vec![
            FunctionDescriptor {
                name: "list_tables",
                description: LIST_TABLES_DESCRIPTION,
                parameters: schema_for!(ListTablesArgs),
            },
            FunctionDescriptor {
                name: "get_table_schema",
                description: GET_TABLE_SCHEMA_DESCRIPTION,
                parameters: schema_for!(GetTableSchemaArgs),
            },
            FunctionDescriptor {
                name: "run_query",
                description: RUN_QUERY_DESCRIPTION,
                parameters: schema_for!(RunQueryArgs),
            },
        ]
    }

    /// Table names in the database, sorted ascending, as CSV
    pub async fn list_tables(&self) -> String {
        log::info!("Getting tables...");
        self.query_as_csv(LIST_TABLES_QUERY).await
    }

    /// `PRAGMA table_info` rows for `table_name`, as CSV
    ///
    /// `table_name` is spliced into the SQL unescaped, see [`table_info_query`].
    pub async fn get_table_schema(&self, table_name: &str) -> String {
        log::info!("Getting schema for {table_name}...");
        self.query_as_csv(&table_info_query(table_name)).await
    }

    /// Run caller-supplied SQL verbatim and return the result as CSV
    pub async fn run_query(&self, query: &str) -> String {
        log::info!("Running query...");
        self.query_as_csv(query).await
    }

    /// Run `query` and render CSV; failures are logged and become `""`
    pub async fn query_as_csv(&self, query: &str) -> String {
        match self.try_query_as_csv(query).await {
            Ok(csv) => csv,
            Err(e) => {
                log::error!("Error: {e}");
                String::new()
            }
        }
    }

    /// Run `query` and render CSV, keeping the error
    ///
    /// # Errors
    ///
    /// Returns the engine's connection or query failure.
    pub async fn try_query_as_csv(&self, query: &str) -> Result<String> {
        log::info!("Querying database with query: {query}");
        let result = E::execute(&self.config, query).await?;
        log::info!("Query returned {} rows", result.row_count());
        Ok(render_csv(&result))
    }
}
