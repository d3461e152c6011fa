//! State carried between wizard steps.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::VaultMode;
use crate::migrate::MigrationReport;
use crate::store::{RetryPolicy, DEFAULT_MOUNT};

use super::steps::Step;

/// Address of a local Vault started by the bundled compose file.
pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";

/// Root token of a Vault dev server started with `-dev-root-token-id=root`.
pub const DEFAULT_DEV_ROOT_TOKEN: &str = "root";

/// Where unseal keys are kept when auto-unseal is on.
pub const UNSEAL_KEY_FILE: &str = ".vault/unseal-keys.json";

/// Fixed settings for one wizard run, taken from flags and environment.
#[derive(Debug, Clone)]
pub struct WizardOptions {
    /// Project directory; relative paths are resolved against it.
    pub project_root: PathBuf,
    /// Env file to migrate.
    pub env_file: PathBuf,
    /// Template copied to the env file when the env file is missing.
    pub env_template: PathBuf,
    /// Explicit pattern file.
    pub patterns: Option<PathBuf>,
    /// Store path secrets are written under.
    pub base_path: String,
    /// KV v2 mount.
    pub mount: String,
    /// Mode chosen on the command line. Skips the mode prompt.
    pub mode: Option<VaultMode>,
    /// Auto-unseal chosen on the command line. Skips the prompt.
    pub auto_unseal: Option<bool>,
    /// Do not check for or start containers.
    pub skip_services: bool,
    /// Compose file used to start Vault.
    pub compose_file: PathBuf,
    /// Compose service name. Defaults by mode.
    pub service: Option<String>,
    /// Ask `gh auth token` for a GitHub token.
    pub use_gh_cli: bool,
    /// Root token of the dev server.
    pub dev_root_token: String,
    /// Health poll bounds.
    pub retry: RetryPolicy,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl WizardOptions {
    /// Defaults for a project directory.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let base_path = default_base_path(&project_root);
        Self {
            env_file: PathBuf::from(".env"),
            env_template: PathBuf::from(".env.example"),
            patterns: None,
            base_path,
            mount: DEFAULT_MOUNT.to_string(),
            mode: None,
            auto_unseal: None,
            skip_services: false,
            compose_file: PathBuf::from("docker-compose.yml"),
            service: None,
            use_gh_cli: true,
            dev_root_token: DEFAULT_DEV_ROOT_TOKEN.to_string(),
            retry: RetryPolicy::default(),
            http_timeout: Duration::from_secs(10),
            project_root,
        }
    }

    /// Resolve `path` against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn env_path(&self) -> PathBuf {
        self.resolve(&self.env_file)
    }

    pub fn template_path(&self) -> PathBuf {
        self.resolve(&self.env_template)
    }

    pub fn compose_path(&self) -> PathBuf {
        self.resolve(&self.compose_file)
    }

    /// Explicit pattern file, resolved. `None` means discovery.
    pub fn patterns_path(&self) -> Option<PathBuf> {
        self.patterns.as_deref().map(|p| self.resolve(p))
    }

    pub fn unseal_key_path(&self) -> PathBuf {
        self.project_root.join(UNSEAL_KEY_FILE)
    }

    /// Compose service for `mode`.
    pub fn service_for(&self, mode: VaultMode) -> String {
        self.service.clone().unwrap_or_else(|| match mode {
            VaultMode::Ephemeral => "vault-dev".to_string(),
            VaultMode::Persistent => "vault".to_string(),
        })
    }
}

/// Store path derived from the project directory name.
///
/// The root is canonicalized first so `.` and `..` name the real directory.
pub fn default_base_path(project_root: &Path) -> String {
    let canonical = fs::canonicalize(project_root).ok();
    canonical
        .as_deref()
        .unwrap_or(project_root)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "app".to_string())
}

/// Mutable record threaded through the steps.
///
/// Each step takes the context by value and hands back the updated one.
#[derive(Debug, Clone, Default)]
pub struct WizardContext {
    pub vault_addr: String,
    pub vault_token: Option<String>,
    pub github_token: Option<String>,
    pub vault_mode: VaultMode,
    pub auto_unseal: bool,
    pub current_step: Option<Step>,
    /// Unseal key shares from this run's initialization.
    pub unseal_keys: Vec<String>,
    /// Set by `template_init` when there is no env file to migrate.
    pub skip_migration: bool,
    pub migration: Option<MigrationReport>,
}

impl WizardContext {
    /// Seed a context from values given on the command line.
    pub fn new(
        vault_addr: Option<String>,
        vault_token: Option<String>,
        github_token: Option<String>,
    ) -> Self {
        Self {
            vault_addr: vault_addr.unwrap_or_default(),
            vault_token: vault_token.filter(|t| !t.trim().is_empty()),
            github_token: github_token.filter(|t| !t.trim().is_empty()),
            ..Default::default()
        }
    }
}
