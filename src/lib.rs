//! sqlplugin - SQL query functions for AI planners
//!
//! Exposes a local `SQLite` database to an AI orchestration framework as three
//! callable functions that take strings and return CSV text, plus a small
//! word-wrap helper for console output.
//!
//! # Core Principles
//! - Pass-through: SQL text is executed verbatim, no parsing or validation
//! - Stateless: every call opens and closes its own connection
//! - Never fails outward: plugin functions return `""` on error and log it
//!
//! # Module Organization
//! - [`error`] - Error types used below the plugin boundary
//! - [`engine`] - Database engine trait, cell values, `SQLite` engine
//! - [`csv`] - Result set to CSV rendering
//! - [`plugin`] - The callable functions and their descriptions
//! - [`text`] - Word wrapping
//! - [`config`] - Configuration management
//! - [`mcp`] - MCP server exposing the functions as tools

pub mod config;
pub mod csv;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod plugin;
pub mod text;

pub use config::{resolve_config, ConfigLocation, PluginConfig, DEFAULT_DATABASE};
pub use csv::{render_csv, NO_DATA};
pub use engine::sqlite::SqliteEngine;
pub use engine::{CellValue, ConnectionConfig, DatabaseEngine, ResultSet};
pub use error::{PluginError, Result};
pub use plugin::{FunctionDescriptor, SqlPlugin};
pub use text::word_wrap;
