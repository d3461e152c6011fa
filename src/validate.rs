//! Post-migration validation.
//!
//! Re-reads the env file with the same classifier the migration used and
//! reports every entry that still looks like a secret. Separately checks
//! that the store actually holds keys under the base path.

use std::path::{Path, PathBuf};

use crate::config::EnvFile;
use crate::error::{OnboardError, Result};
use crate::secrets::Classifier;
use crate::store::SecretStoreClient;

/// A secret-classified entry still present in the env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualSecret {
    pub key: String,
    /// 1-based line number in the file.
    pub line: usize,
}

/// Result of validating one env file.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub env_path: PathBuf,
    pub base_path: String,
    /// Secrets left in the file.
    pub residual: Vec<ResidualSecret>,
    /// Keys listed under the base path, if the store answered.
    pub store_keys: Option<Vec<String>>,
    /// Why the store listing failed, if it did.
    pub store_error: Option<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Validation passes iff no secrets remain in the file.
    ///
    /// Store problems only produce warnings.
    pub fn is_success(&self) -> bool {
        self.residual.is_empty()
    }

    /// One [`OnboardError::ResidualSecret`] per residual entry.
    pub fn errors(&self) -> Vec<OnboardError> {
        self.residual
            .iter()
            .map(|r| OnboardError::ResidualSecret {
                key: r.key.clone(),
                line: r.line,
            })
            .collect()
    }

    /// Collapse the report into a single error when it failed.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(OnboardError::ResidualSecrets {
            path: self.env_path.clone(),
            keys: self.residual.iter().map(|r| r.key.clone()).collect(),
        })
    }
}

/// Validate `path` against the classifier and the store.
pub fn validate(
    path: &Path,
    base_path: &str,
    classifier: &Classifier,
    store: &dyn SecretStoreClient,
) -> Result<ValidationReport> {
    let file = EnvFile::load(path)?;

    let residual: Vec<ResidualSecret> = file
        .entries()
        .iter()
        .filter(|e| classifier.is_secret(e))
        .map(|e| ResidualSecret {
            key: e.key.clone(),
            line: e.line,
        })
        .collect();

    for r in &residual {
        tracing::warn!("{} still holds secret {} (line {})", path.display(), r.key, r.line);
    }

    let mut report = ValidationReport {
        env_path: path.to_path_buf(),
        base_path: base_path.to_string(),
        residual,
        ..Default::default()
    };

    match store.list_keys(base_path) {
        Ok(keys) => {
            if keys.is_empty() {
                report.warnings.push(format!(
                    "No secrets found in {} under '{}'",
                    store.describe(),
                    base_path
                ));
            }
            report.store_keys = Some(keys);
        }
        Err(e) => {
            tracing::debug!("store listing failed: {}", e);
            report
                .warnings
                .push(format!("Could not list secrets under '{}': {}", base_path, e));
            report.store_error = Some(e.to_string());
        }
    }

    Ok(report)
}
