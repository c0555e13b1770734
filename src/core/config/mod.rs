//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The tool remembers the values the user opted to save between runs:
//! organization, output folder, and optionally an API base URL and page
//! size. The personal access token is NOT stored here; it goes through
//! [`crate::secrets`].
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Example
//!
//! ```no_run
//! use ado_history::core::config::Config;
//! use ado_history::core::paths::AppPaths;
//!
//! let paths = AppPaths::from_env().expect("home directory");
//! let config = Config::load(&paths).unwrap();
//!
//! if let Some(org) = config.organization() {
//!     println!("Organization: {}", org);
//! }
//! println!("API base: {}", config.api_base());
//! ```

pub mod schema;

pub use schema::{SecretsConfig, Settings};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use super::paths::AppPaths;

/// Default tracker API base URL.
pub const DEFAULT_API_BASE: &str = "https://dev.azure.com";

/// Largest revisions page the tracker API serves (its `$top` limit).
pub const MAX_PAGE_SIZE: usize = 200;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration bound to the file it came from.
#[derive(Debug, Clone)]
pub struct Config {
    /// Saved settings
    pub settings: Settings,
    /// Where the settings are read from and written to
    path: PathBuf,
    /// Whether the file existed when loaded
    loaded: bool,
}

impl Config {
    /// Load configuration from the config file under `paths`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// validated. A missing file is not an error (defaults are used).
    pub fn load(paths: &AppPaths) -> Result<Self, ConfigError> {
        let path = paths.config_path();

        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Ok(Self {
                settings: Settings::default(),
                path,
                loaded: false,
            });
        }

        let settings = Self::read_settings(&path)?;
        settings.validate()?;
        debug!("loaded config from {}", path.display());

        Ok(Self {
            settings,
            path,
            loaded: true,
        })
    }

    /// Read and parse a config file.
    fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write the settings back to the config file atomically.
    ///
    /// Creates parent directories if needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        self.settings.validate()?;
        write_config_atomic(&self.path, &self.settings)?;
        Ok(self.path.clone())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the saved organization.
    pub fn organization(&self) -> Option<&str> {
        self.settings.organization.as_deref()
    }

    /// Get the saved output folder.
    pub fn output_dir(&self) -> Option<&Path> {
        self.settings.output_dir.as_deref()
    }

    /// Get the API base URL.
    ///
    /// Defaults to `https://dev.azure.com` if not configured.
    pub fn api_base(&self) -> &str {
        self.settings
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// Get the explicit page size, if any.
    pub fn page_size(&self) -> Option<usize> {
        self.settings.page_size
    }

    /// Get the secrets provider.
    ///
    /// Defaults to "file" if not configured.
    pub fn secrets_provider(&self) -> &str {
        self.settings
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or("file")
    }

    /// Remember an organization (or forget it with `None`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a malformed organization.
    pub fn set_organization(&mut self, org: Option<&str>) -> Result<(), ConfigError> {
        if let Some(org) = org {
            schema::validate_organization(org)?;
        }
        self.settings.organization = org.map(str::to_string);
        Ok(())
    }

    /// Remember an output folder (or forget it with `None`).
    pub fn set_output_dir(&mut self, dir: Option<&Path>) {
        self.settings.output_dir = dir.map(Path::to_path_buf);
    }

    /// Path of the backing config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the config was loaded from, if the file existed.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded.then_some(self.path.as_path())
    }
}

/// Write a config file atomically.
fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    // Write to temp file in same directory (for atomic rename)
    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
