//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::address::SEPARATOR;
use crate::error::{GatewayError, Result};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Table used in single-table mode and for the default handle
    pub default_table: String,
    /// Store file location; None keeps the store in memory
    pub file_path: Option<PathBuf>,
    /// Address items as `/{table}/{item}` instead of `/{item}`
    pub use_multi_table: bool,
    /// Cache TTL in seconds, 0 = entries never expire
    pub cache_ttl: u64,
    /// Whether PATCH may create items that do not exist yet
    pub allow_patch_to_create_new_item: bool,
    /// Cache capacity bound, None = unbounded
    pub cache_max_entries: Option<usize>,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TABLE` - Default table name (default: main)
    /// - `FILE_PATH` - Store file path (default: unset, in-memory store)
    /// - `USE_MULTI_TABLE` - Multi-table addressing (default: false)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 600)
    /// - `ALLOW_PATCH_TO_CREATE_NEW_ITEM` - PATCH upserts (default: true)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity bound (default: unbounded)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any variable source. Unparsable values fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |name: &str| lookup(name).and_then(|v| parse_flag(&v));

        Self {
            default_table: lookup("DEFAULT_TABLE").unwrap_or(defaults.default_table),
            file_path: lookup("FILE_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            use_multi_table: flag("USE_MULTI_TABLE").unwrap_or(defaults.use_multi_table),
            cache_ttl: parse_var(&lookup, "CACHE_TTL").unwrap_or(defaults.cache_ttl),
            allow_patch_to_create_new_item: flag("ALLOW_PATCH_TO_CREATE_NEW_ITEM")
                .unwrap_or(defaults.allow_patch_to_create_new_item),
            cache_max_entries: parse_var::<usize>(&lookup, "CACHE_MAX_ENTRIES")
                .filter(|max| *max > 0),
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var(&lookup, "CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.default_table.is_empty() {
            return Err(GatewayError::Config("DEFAULT_TABLE must not be empty".into()));
        }
        if self.default_table.contains(SEPARATOR) {
            return Err(GatewayError::Config(format!(
                "DEFAULT_TABLE must not contain '{}'",
                SEPARATOR
            )));
        }
        if self.cleanup_interval == 0 {
            return Err(GatewayError::Config(
                "CLEANUP_INTERVAL must be at least 1 second".into(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_table: "main".to_string(),
            file_path: None,
            use_multi_table: false,
            cache_ttl: 600,
            allow_patch_to_create_new_item: true,
            cache_max_entries: None,
            server_port: 3000,
            cleanup_interval: 30,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
