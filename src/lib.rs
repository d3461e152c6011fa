//! vault-onboard - Move a project's secrets from `.env` into a local Vault.
//!
//! The crate detects secret-like variables in an env file, writes them to a
//! Vault KV v2 mount over HTTP, rewrites the file without them and checks
//! that nothing was left behind. A setup wizard drives the whole flow,
//! including starting Vault with Docker Compose.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Env files, secret patterns and the persisted Vault mode
//! - [`error`] - Error types and result aliases
//! - [`migrate`] - The backup, classify, store and rewrite pipeline
//! - [`secrets`] - Secret classification and output masking
//! - [`shell`] - Running external tools
//! - [`store`] - Secret store clients (Vault HTTP and in-memory)
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`validate`] - Checking an env file for residual secrets
//! - [`wizard`] - The setup wizard
//!
//! # Example
//!
//! ```
//! use vault_onboard::secrets::Classifier;
//! use vault_onboard::store::{MemoryStore, SecretStoreClient};
//!
//! let classifier = Classifier::with_builtins();
//! let store = MemoryStore::new();
//!
//! for (key, value) in [("API_KEY", "sk_live_abc123"), ("PORT", "3000")] {
//!     if classifier.classify(key, value) {
//!         store.put_secret("myapp", key, value).unwrap();
//!     }
//! }
//! assert_eq!(store.list_keys("myapp").unwrap(), vec!["API_KEY".to_string()]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod migrate;
pub mod secrets;
pub mod shell;
pub mod store;
pub mod ui;
pub mod validate;
pub mod wizard;

pub use error::{OnboardError, Result};
