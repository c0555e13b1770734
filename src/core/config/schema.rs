//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Stored at `config.toml` under the tool's home directory (see
//! [`crate::core::paths`]).
//!
//! # Validation
//!
//! Config values are validated after parsing so that a hand-edited file with
//! a malformed organization or API base is rejected before any request is
//! made.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigError, MAX_PAGE_SIZE};

/// Saved settings.
///
/// # Example
///
/// ```toml
/// organization = "contoso"
/// output_dir = "/home/me/history"
/// api_base = "https://dev.azure.com"
/// page_size = 200
///
/// [secrets]
/// provider = "file"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Organization that owns the work items
    pub organization: Option<String>,

    /// Folder the change log is written to
    pub output_dir: Option<PathBuf>,

    /// Tracker API base URL (default: `https://dev.azure.com`)
    pub api_base: Option<String>,

    /// Explicit revisions page size; inferred from the first page when unset
    pub page_size: Option<usize>,

    /// Secret storage settings
    pub secrets: Option<SecretsConfig>,
}

impl Settings {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(org) = &self.organization {
            validate_organization(org)?;
        }

        if let Some(dir) = &self.output_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "output_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(base) = &self.api_base {
            validate_api_base(base)?;
        }

        if let Some(size) = self.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(ConfigError::InvalidValue(format!(
                    "page_size must be between 1 and {}",
                    MAX_PAGE_SIZE
                )));
            }
        }

        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }

        Ok(())
    }
}

/// Validate an organization name.
///
/// Organization names become a URL path segment, so they cannot be empty or
/// contain whitespace or slashes.
pub fn validate_organization(org: &str) -> Result<(), ConfigError> {
    if org.is_empty() {
        return Err(ConfigError::InvalidValue(
            "organization cannot be empty".to_string(),
        ));
    }
    if org.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        return Err(ConfigError::InvalidValue(format!(
            "invalid organization '{}', must not contain spaces or slashes",
            org
        )));
    }
    Ok(())
}

/// Validate an API base URL.
pub fn validate_api_base(base: &str) -> Result<(), ConfigError> {
    if base.starts_with("https://") || base.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "invalid api_base '{}', must start with http:// or https://",
            base
        )))
    }
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use ("file" or "keychain")
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Valid secret providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["file", "keychain"];

    /// Validate the secrets configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
