//! Unseal key storage for auto-unseal.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OnboardError, Result};

/// Unseal key shares saved after initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsealKeys {
    pub keys: Vec<String>,
    pub threshold: u32,
    pub created_at: DateTime<Utc>,
}

impl UnsealKeys {
    pub fn new(keys: Vec<String>, threshold: u32) -> Self {
        Self {
            keys,
            threshold,
            created_at: Utc::now(),
        }
    }

    /// Read saved keys. A missing file is `ConfigNotFound`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OnboardError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| OnboardError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write the keys, readable by the owner only.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;
        fs::write(path, json)?;
        restrict_permissions(path)?;
        Ok(path.to_path_buf())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
