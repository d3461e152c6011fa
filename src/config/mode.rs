//! Vault operating mode and its persisted configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OnboardError, Result};

/// Location of the mode config file, relative to the project root.
pub const MODE_CONFIG_FILE: &str = ".vault/mode.json";

/// How the local Vault server keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultMode {
    /// Dev server, in-memory storage. Data is lost on restart.
    #[default]
    Ephemeral,
    /// File storage. Needs initialization and unsealing.
    Persistent,
}

impl VaultMode {
    /// Lowercase name as used in files and flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ephemeral => "ephemeral",
            Self::Persistent => "persistent",
        }
    }

    /// Whether data survives a restart.
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent)
    }
}

impl fmt::Display for VaultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VaultMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ephemeral" | "dev" => Ok(Self::Ephemeral),
            "persistent" | "file" => Ok(Self::Persistent),
            _ => Err(format!("unknown vault mode: {}", s)),
        }
    }
}

/// Mode settings written by the setup wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub mode: VaultMode,
    #[serde(default)]
    pub auto_unseal: bool,
    pub vault_addr: String,
    pub updated_at: DateTime<Utc>,
}

impl ModeConfig {
    /// Path of the mode config inside a project.
    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join(MODE_CONFIG_FILE)
    }

    /// Load the mode config, returning `None` when it was never written.
    pub fn load(project_root: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(project_root);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let config = serde_json::from_str(&content).map_err(|e| {
            OnboardError::ConfigParseError {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(Some(config))
    }

    /// Write the mode config, creating `.vault/` if needed.
    pub fn save(&self, project_root: &Path) -> Result<PathBuf> {
        let path = Self::path_in(project_root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
