//! Error Handling Infrastructure
//!
//! This module defines the error type used inside sqlplugin.
//! Errors never cross the plugin function boundary: `query_as_csv` logs them
//! and returns an empty string. They stay structured internally so the
//! failure paths remain testable.
//!
//! # Error Categories
//! - `ConnectionFailed`: Database file missing, locked, or corrupt
//! - `QueryFailed`: Prepare, execute, or row iteration errors
//! - `ConfigError`: Configuration file errors

use thiserror::Error;

/// Main error type for sqlplugin operations
#[derive(Error, Debug)]
pub enum PluginError {
    /// Database connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Configuration error (file not found, invalid JSON, etc.)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PluginError {
    /// Stable error code string, used in MCP error payloads
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Human-readable error message
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

/// Result type alias for sqlplugin operations
pub type Result<T> = std::result::Result<T, PluginError>;
