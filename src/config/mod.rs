//! Configuration Management
//!
//! This module handles loading and saving the plugin configuration.
//!
//! # Configuration Locations
//! - Local: `.sqlplugin/config.json` (per-project, relative to the working directory)
//! - Global: `~/.config/sqlplugin/config.json` (per-user)
//!
//! # Resolution Precedence
//! 1. Explicit `--database` argument (highest priority)
//! 2. `SQLPLUGIN_DATABASE` environment variable
//! 3. Local config file
//! 4. Global config file
//! 5. Built-in defaults (`northwind.db`, wrap width 80)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PluginError, Result};

/// Database file used when nothing else is configured
pub const DEFAULT_DATABASE: &str = "northwind.db";

/// Line width used by `wrap` when nothing else is configured
pub const DEFAULT_WRAP_WIDTH: usize = 80;

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "SQLPLUGIN_DATABASE";

/// Plugin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Path of the `SQLite` database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Default width for word wrapping
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE)
}

const fn default_wrap_width() -> usize {
    DEFAULT_WRAP_WIDTH
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self { database: default_database(), wrap_width: DEFAULT_WRAP_WIDTH }
    }
}

/// Configuration file location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Local config (`.sqlplugin/config.json`)
    Local,
    /// Global config (`~/.config/sqlplugin/config.json`)
    Global,
}

impl ConfigLocation {
    /// Path of the config file for this location
    ///
    /// # Errors
    ///
    /// Fails for `Global` when the platform has no config directory.
    pub fn path(self) -> Result<PathBuf> {
        match self {
            Self::Local => Ok(local_config_path()),
            Self::Global => global_config_path(),
        }
    }
}

/// Get the local config file path (`.sqlplugin/config.json`)
#[must_use]
pub fn local_config_path() -> PathBuf {
    PathBuf::from(".sqlplugin").join("config.json")
}

/// Get the global config file path (`~/.config/sqlplugin/config.json`)
///
/// # Errors
///
/// Fails when the platform has no config directory.
pub fn global_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("sqlplugin").join("config.json"))
        .ok_or_else(|| PluginError::config_error("Could not determine config directory"))
}

/// Load a config file, returning `None` if it does not exist
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<Option<PluginConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| PluginError::config_error(format!("Could not read config file: {e}")))?;

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| PluginError::config_error(format!("Invalid config file format: {e}")))
}

/// Save a config file, creating its parent directory if needed
///
/// # Errors
///
/// Fails if the directory or file cannot be written.
pub fn save_config(path: &Path, config: &PluginConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PluginError::config_error(format!("Could not create config directory: {e}"))
        })?;
    }

    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| PluginError::config_error(format!("Could not serialize config: {e}")))?;

    fs::write(path, contents)
        .map_err(|e| PluginError::config_error(format!("Could not write config file: {e}")))
}

/// Resolve the effective configuration
///
/// The first config file found (local, then global) supplies the base
/// values. `SQLPLUGIN_DATABASE` and then `database` override its database path.
///
/// # Errors
///
/// Fails if an existing config file is unreadable or malformed.
pub fn resolve_config(database: Option<PathBuf>) -> Result<PluginConfig> {
    let env_database = std::env::var_os(DATABASE_ENV).map(PathBuf::from);
    let global = global_config_path().ok();
    resolve_from(database, env_database, &local_config_path(), global.as_deref())
}

fn resolve_from(
    database: Option<PathBuf>,
    env_database: Option<PathBuf>,
    local: &Path,
    global: Option<&Path>,
) -> Result<PluginConfig> {
    let mut config = match load_config(local)? {
        Some(config) => config,
        None => match global {
            Some(path) => load_config(path)?.unwrap_or_default(),
            None => PluginConfig::default(),
        },
    };

    if let Some(path) = database.or(env_database) {
        config.database = path;
    }

    Ok(config)
}
