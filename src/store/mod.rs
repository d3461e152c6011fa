//! Secret store clients.
//!
//! The migration pipeline and the validator talk to the store only through
//! [`SecretStoreClient`]. [`VaultClient`] implements it over Vault's HTTP
//! API; [`MemoryStore`] keeps secrets in memory for dry runs and tests.
//!
//! # Example
//!
//! ```
//! use vault_onboard::store::{MemoryStore, SecretStoreClient};
//!
//! let store = MemoryStore::new();
//! store.put_secret("myapp", "API_KEY", "sk_live_abc123").unwrap();
//! assert_eq!(store.list_keys("myapp").unwrap(), vec!["API_KEY".to_string()]);
//! ```

pub mod memory;
pub mod vault;
pub mod wait;

pub use memory::MemoryStore;
pub use vault::{InitResponse, SealStatus, TokenInfo, VaultClient, DEFAULT_MOUNT};
pub use wait::{wait_until_reachable, RetryPolicy};

use serde::Deserialize;

use crate::error::Result;

/// Server state reported by a health check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub sealed: bool,
    #[serde(default)]
    pub standby: bool,
    #[serde(default)]
    pub version: Option<String>,
}

impl Health {
    /// Initialized, unsealed and able to serve requests.
    pub fn is_ready(&self) -> bool {
        self.initialized && !self.sealed
    }
}

/// Operations the pipeline needs from a secret store.
pub trait SecretStoreClient {
    /// Human-readable location of the store (address or "memory").
    fn describe(&self) -> String;

    /// KV mount the store writes under, for `vault kv` hints.
    fn mount(&self) -> &str {
        DEFAULT_MOUNT
    }

    /// Query the store's health. An `Ok` result means the store is reachable.
    fn health(&self) -> Result<Health>;

    /// Store `value` under `path/key`.
    fn put_secret(&self, path: &str, key: &str, value: &str) -> Result<()>;

    /// List the keys stored directly under `path`.
    ///
    /// A path that holds nothing yields an empty list.
    fn list_keys(&self, path: &str) -> Result<Vec<String>>;
}

/// Join path segments with `/`, dropping empty segments and stray slashes.
pub fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
