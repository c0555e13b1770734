//! core::paths
//!
//! Centralized path routing for the tool's storage locations.
//!
//! # Storage Layout
//!
//! Everything the tool persists lives under one home directory:
//! - `config.toml` - Saved organization, output folder and API settings
//! - `secrets.toml` - Saved personal access token (file secret provider)
//!
//! # Resolution
//!
//! The home directory is, in order:
//! 1. `$ADO_HISTORY_HOME` if set
//! 2. `~/.ado-history`
//!
//! The config file can be relocated on its own with `$ADO_HISTORY_CONFIG`.
//!
//! # Example
//!
//! ```
//! use ado_history::core::paths::AppPaths;
//! use std::path::PathBuf;
//!
//! let paths = AppPaths::new(PathBuf::from("/home/me/.ado-history"));
//! assert_eq!(paths.config_path(), PathBuf::from("/home/me/.ado-history/config.toml"));
//! assert_eq!(paths.secrets_path(), PathBuf::from("/home/me/.ado-history/secrets.toml"));
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "ADO_HISTORY_HOME";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ADO_HISTORY_CONFIG";

/// Directory name under the user's home directory.
const HOME_DIR_NAME: &str = ".ado-history";

/// Resolved storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Directory holding all persisted state.
    home: PathBuf,
    /// Explicit config file location, if overridden.
    config_override: Option<PathBuf>,
}

impl AppPaths {
    /// Create paths rooted at `home`.
    pub fn new(home: PathBuf) -> Self {
        Self {
            home,
            config_override: None,
        }
    }

    /// Resolve paths from the environment.
    ///
    /// Returns `None` if no override is set and the home directory cannot be
    /// determined.
    pub fn from_env() -> Option<Self> {
        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()?.join(HOME_DIR_NAME),
        };

        let config_override = std::env::var_os(CONFIG_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Some(Self {
            home,
            config_override,
        })
    }

    /// The home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.config_override
            .clone()
            .unwrap_or_else(|| self.home.join("config.toml"))
    }

    /// Path to the file secret store.
    pub fn secrets_path(&self) -> PathBuf {
        self.home.join("secrets.toml")
    }
}
