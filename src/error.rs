//! Error types for vault-onboard operations.
//!
//! This module defines [`OnboardError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `OnboardError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `OnboardError::Other`) for unexpected errors
//! - Every error is fatal to the current invocation; the CLI exits with code 1

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for vault-onboard operations.
#[derive(Debug, Error)]
pub enum OnboardError {
    /// A configured file (pattern file, compose file, unseal keys) is missing.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A secret pattern is not a valid regular expression.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Vault is unreachable or its health check failed.
    #[error("Cannot reach Vault at {addr}: {message}")]
    Connectivity { addr: String, message: String },

    /// Missing or rejected Vault token, or a failed token exchange.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// The backup copy of the env file could not be written.
    #[error("Failed to back up {path}: {message}")]
    Backup { path: PathBuf, message: String },

    /// A secret could not be written to the store.
    ///
    /// `stored` lists the keys written before the failure; they stay in the
    /// store because the migration does not roll back.
    #[error("Failed to store secret '{key}': {message}{}", already_stored(.stored))]
    StoreWrite {
        key: String,
        message: String,
        stored: Vec<String>,
    },

    /// Secret-classified entries are still present in the env file.
    #[error("Secrets still present in {path}: {}", keys.join(", "))]
    ResidualSecrets { path: PathBuf, keys: Vec<String> },

    /// A single residual secret, as reported by the validator.
    #[error("Residual secret '{key}' found on line {line}")]
    ResidualSecret { key: String, line: usize },

    /// Unrecognized command-line option.
    #[error("Unknown option: {message}")]
    UnknownOption { message: String },

    /// A required tool is not installed.
    #[error("Missing prerequisite '{tool}': {message}")]
    MissingPrerequisite { tool: String, message: String },

    /// An external command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A prompt needs an answer but none can be given without a terminal.
    #[error("Cannot prompt for '{key}' in non-interactive mode (no default value)")]
    PromptUnavailable { key: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn already_stored(keys: &[String]) -> String {
    if keys.is_empty() {
        String::new()
    } else {
        format!(" (already stored: {})", keys.join(", "))
    }
}

/// Result type alias for vault-onboard operations.
pub type Result<T> = std::result::Result<T, OnboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = OnboardError::ConfigNotFound {
            path: PathBuf::from("/repo/.vault/secret-patterns.json"),
        };
        assert!(err.to_string().contains("secret-patterns.json"));
    }

    #[test]
    fn connectivity_displays_addr_and_message() {
        let err = OnboardError::Connectivity {
            addr: "http://127.0.0.1:8200".into(),
            message: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:8200"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn store_write_displays_key() {
        let err = OnboardError::StoreWrite {
            key: "API_KEY".into(),
            message: "HTTP 403".into(),
            stored: vec!["DB_PASSWORD".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("API_KEY"));
        assert!(msg.contains("403"));
        assert!(msg.contains("already stored: DB_PASSWORD"));
    }

    #[test]
    fn residual_secrets_lists_keys() {
        let err = OnboardError::ResidualSecrets {
            path: PathBuf::from(".env"),
            keys: vec!["API_KEY".into(), "DB_PASSWORD".into()],
        };
        assert!(err.to_string().contains("API_KEY, DB_PASSWORD"));
    }

    #[test]
    fn residual_secret_displays_key_and_line() {
        let err = OnboardError::ResidualSecret {
            key: "STRIPE_SECRET".into(),
            line: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("STRIPE_SECRET"));
        assert!(msg.contains("line 4"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = OnboardError::CommandFailed {
            command: "docker compose up -d vault".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("docker compose up -d vault"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: OnboardError = io_err.into();
        assert!(matches!(err, OnboardError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(OnboardError::Auth {
                message: "no token".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
