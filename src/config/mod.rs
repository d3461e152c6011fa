//! Configuration inputs for vault-onboard.
//!
//! - Env file parsing in [`env_file`]
//! - Secret pattern sources in [`patterns`]
//! - Vault mode and its persisted settings in [`mode`]
//!
//! # Example
//!
//! ```
//! use vault_onboard::config::{EnvFile, PatternSet};
//!
//! let patterns = PatternSet::builtin();
//! let file = EnvFile::parse("PORT=3000\n");
//! assert_eq!(file.entries().len(), 1);
//! assert!(!patterns.is_empty());
//! ```

pub mod env_file;
pub mod mode;
pub mod patterns;

pub use env_file::{upsert as upsert_env_var, EnvEntry, EnvFile};
pub use mode::{ModeConfig, VaultMode, MODE_CONFIG_FILE};
pub use patterns::{
    compile_pattern, load_patterns, select_provider, BuiltinPatternProvider, FilePatternProvider,
    PatternConfig, PatternProvider, PatternSet, DEFAULT_PATTERN_FILE,
};
