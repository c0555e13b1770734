//! secrets
//!
//! Storage for the remembered personal access token.
//!
//! # Architecture
//!
//! Secrets are stored through the `SecretStore` trait:
//!
//! - [`FileSecretStore`]: `secrets.toml` under the tool's home (default)
//! - [`KeychainSecretStore`]: OS keychain (optional, feature-gated)
//!
//! Secrets are never logged or included in error messages.
//!
//! # Example
//!
//! ```
//! use ado_history::core::paths::AppPaths;
//! use ado_history::secrets::{create_store, PAT_KEY};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let paths = AppPaths::new(temp.path().to_path_buf());
//! let store = create_store("file", &paths).unwrap();
//!
//! store.set(PAT_KEY, "my-pat").unwrap();
//! assert!(store.exists(PAT_KEY).unwrap());
//! store.delete(PAT_KEY).unwrap();
//! ```

mod file_store;
mod keychain_store;
mod traits;

pub use file_store::FileSecretStore;
pub use keychain_store::{KeychainSecretStore, KEYCHAIN_SERVICE};
pub use traits::{SecretError, SecretStore};

use crate::core::paths::AppPaths;

/// Key under which the Azure DevOps personal access token is stored.
pub const PAT_KEY: &str = "azure_devops.pat";

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Create a secret store based on the provider name.
///
/// # Errors
///
/// - Unknown provider name
/// - Keychain provider without `keychain` feature enabled
pub fn create_store(provider: &str, paths: &AppPaths) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::for_paths(paths))),
        "keychain" => Ok(Box::new(KeychainSecretStore::new()?)),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: file, keychain)",
            other
        ))),
    }
}
