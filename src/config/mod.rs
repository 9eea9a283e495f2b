//
//  buildkite-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loading, saving and accessing `bk` settings stored as TOML in the
//! platform-specific configuration directory.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bk/config.toml`
//! - **macOS**: `~/Library/Application Support/bk/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\bk\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [api]
//! base_url = "https://api.buildkite.com/v2"
//! token = "bkua_..."
//! timeout_secs = 30
//!
//! [defaults]
//! organization = "acme"
//! pipeline = "web"
//! per_page = 50
//! ```
//!
//! ## Environment Overrides
//!
//! [`Config::apply_env`] lets the environment win over the file:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BUILDKITE_API_TOKEN` | `api.token` |
//! | `BUILDKITE_API_URL` | `api.base_url` |
//! | `BUILDKITE_ORGANIZATION` | `defaults.organization` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::common::DEFAULT_PAGE_SIZE;

/// Public Buildkite REST API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.buildkite.com/v2";

/// Environment variable holding the API access token.
pub const ENV_TOKEN: &str = "BUILDKITE_API_TOKEN";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "BUILDKITE_API_URL";

/// Environment variable holding the default organization slug.
pub const ENV_ORGANIZATION: &str = "BUILDKITE_ORGANIZATION";

/// Complete `bk` configuration.
///
/// # Examples
///
/// ```rust
/// use buildkite_cli::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.api.base_url, "https://api.buildkite.com/v2");
/// assert_eq!(config.defaults.per_page, 30);
/// ```
///
/// # Notes
///
/// - Every section uses `#[serde(default)]`, so a partial file is valid
/// - The file is created on first save
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint and credentials.
    #[serde(default)]
    pub api: ApiConfig,

    /// Values used when a command omits them.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Endpoint and credential settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root that request paths are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API access token, sent as a bearer token.
    ///
    /// Prefer `BUILDKITE_API_TOKEN` over storing the token on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Whole-request timeout in seconds. No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Defaults applied by the CLI when flags are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,

    /// Page size for list commands, clamped to 1..=100 when used.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_per_page() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            organization: None,
            pipeline: None,
            per_page: default_per_page(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or is not valid TOML.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`, or the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// The file may not exist; this only returns where it would be.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overrides fields from `BUILDKITE_*` environment variables.
    ///
    /// Empty variables are ignored.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup(ENV_TOKEN) {
            self.api.token = Some(token);
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(org) = lookup(ENV_ORGANIZATION) {
            self.defaults.organization = Some(org);
        }
    }

    /// Gets a configuration value by dotted key.
    ///
    /// # Supported Keys
    ///
    /// | Key | Field |
    /// |-----|-------|
    /// | `api.base_url` | `api.base_url` |
    /// | `api.token` | `api.token` |
    /// | `api.timeout_secs` | `api.timeout_secs` |
    /// | `defaults.organization` | `defaults.organization` |
    /// | `defaults.pipeline` | `defaults.pipeline` |
    /// | `defaults.per_page` | `defaults.per_page` |
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buildkite_cli::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.get("defaults.per_page"), Some("30".to_string()));
    /// assert_eq!(config.get("defaults.organization"), None);
    /// assert_eq!(config.get("unknown"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.token" => self.api.token.clone(),
            "api.timeout_secs" => self.api.timeout_secs.map(|t| t.to_string()),
            "defaults.organization" => self.defaults.organization.clone(),
            "defaults.pipeline" => self.defaults.pipeline.clone(),
            "defaults.per_page" => Some(self.defaults.per_page.to_string()),
            _ => None,
        }
    }

    /// Sets a configuration value by dotted key.
    ///
    /// Changes are only persisted when [`Config::save`] is called.
    ///
    /// # Errors
    ///
    /// Fails for unknown keys and for numeric keys given a non-numeric value.
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "api.base_url" => self.api.base_url = value,
            "api.token" => self.api.token = Some(value),
            "api.timeout_secs" => {
                self.api.timeout_secs = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid number of seconds: {value}"))?,
                )
            }
            "defaults.organization" => self.defaults.organization = Some(value),
            "defaults.pipeline" => self.defaults.pipeline = Some(value),
            "defaults.per_page" => {
                self.defaults.per_page = value
                    .parse()
                    .with_context(|| format!("Invalid page size: {value}"))?
            }
            _ => anyhow::bail!("Unknown configuration key: {key}"),
        }
        Ok(())
    }
}
