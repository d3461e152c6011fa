//! Moving secrets out of an env file and into the store.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::{EnvEntry, EnvFile};
use crate::error::{OnboardError, Result};
use crate::secrets::Classifier;
use crate::store::{join_path, SecretStoreClient};

use super::backup::{atomic_write, create_backup, register_in_ignore_file};

/// Options for a migration run.
#[derive(Debug, Clone, Copy)]
pub struct MigrateOptions {
    /// Classify and report only. No backup, store writes or rewrite.
    pub dry_run: bool,
    /// Register the backup pattern in a sibling `.gitignore`.
    pub register_backup_ignore: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            register_backup_ignore: true,
        }
    }
}

/// Outcome of one migration run.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// The env file that was processed.
    pub env_path: PathBuf,
    /// Store path the secrets were written under.
    pub base_path: String,
    /// Entries parsed from the file.
    pub total_entries: usize,
    /// Entries classified as secrets.
    pub found: usize,
    /// Keys classified as secrets, in file order.
    pub secret_keys: Vec<String>,
    /// Secrets written to the store.
    pub migrated: usize,
    /// Keys written to the store, in file order.
    pub stored_keys: Vec<String>,
    /// Keys kept in the file, in file order.
    pub retained_keys: Vec<String>,
    /// Backup of the original file, when one was made.
    pub backup_path: Option<PathBuf>,
    /// Whether the env file was rewritten.
    pub rewritten: bool,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl MigrationReport {
    /// Number of entries left in the file.
    pub fn retained(&self) -> usize {
        self.retained_keys.len()
    }

    /// Whether there was nothing to migrate.
    pub fn is_noop(&self) -> bool {
        self.found == 0
    }
}

/// Runs the backup → classify → store → rewrite pipeline.
///
/// # Example
///
/// ```
/// use vault_onboard::migrate::Migrator;
/// use vault_onboard::secrets::Classifier;
/// use vault_onboard::store::{MemoryStore, SecretStoreClient};
/// use std::fs;
///
/// let dir = tempfile::TempDir::new().unwrap();
/// let env = dir.path().join(".env");
/// fs::write(&env, "API_KEY=sk_live_abc123\nPORT=3000\n").unwrap();
///
/// let classifier = Classifier::with_builtins();
/// let store = MemoryStore::new();
/// let report = Migrator::new(&classifier, &store).migrate(&env, "myapp").unwrap();
///
/// assert_eq!(report.migrated, 1);
/// assert_eq!(store.get("myapp/API_KEY").as_deref(), Some("sk_live_abc123"));
/// assert!(fs::read_to_string(&env).unwrap().ends_with("PORT=3000\n"));
/// ```
pub struct Migrator<'a> {
    classifier: &'a Classifier,
    store: &'a dyn SecretStoreClient,
    options: MigrateOptions,
}

impl<'a> Migrator<'a> {
    /// Create a migrator with default options.
    pub fn new(classifier: &'a Classifier, store: &'a dyn SecretStoreClient) -> Self {
        Self {
            classifier,
            store,
            options: MigrateOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: MigrateOptions) -> Self {
        self.options = options;
        self
    }

    /// Migrate the secrets in `path` to `base_path` in the store.
    ///
    /// The file is rewritten only after every secret was stored. A failed
    /// store write aborts the run with [`OnboardError::StoreWrite`]; secrets
    /// written before it stay in the store and are listed in the error.
    pub fn migrate(&self, path: &Path, base_path: &str) -> Result<MigrationReport> {
        let file = EnvFile::load(path)?;
        let entries = file.into_entries();
        let (secrets, retained) = self.classifier.partition(&entries);

        let mut report = MigrationReport {
            env_path: path.to_path_buf(),
            base_path: base_path.to_string(),
            total_entries: entries.len(),
            found: secrets.len(),
            secret_keys: secrets.iter().map(|e| e.key.clone()).collect(),
            retained_keys: retained.iter().map(|e| e.key.clone()).collect(),
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        tracing::info!(
            "{}: {} entries, {} classified as secrets",
            path.display(),
            report.total_entries,
            report.found
        );

        if secrets.is_empty() || self.options.dry_run {
            return Ok(report);
        }

        let backup = create_backup(path)?;
        if self.options.register_backup_ignore {
            register_in_ignore_file(path)?;
        }
        report.backup_path = Some(backup.clone());

        for entry in &secrets {
            if let Err(e) = self.store.put_secret(base_path, &entry.key, &entry.value) {
                tracing::warn!(
                    "store write for {} failed after {} secret(s) were stored",
                    entry.key,
                    report.stored_keys.len()
                );
                return Err(OnboardError::StoreWrite {
                    key: entry.key.clone(),
                    message: e.to_string(),
                    stored: report.stored_keys,
                });
            }
            tracing::debug!("stored {}", join_path(&[base_path, &entry.key]));
            report.stored_keys.push(entry.key.clone());
        }
        report.migrated = report.stored_keys.len();

        let content = render_filtered(&retained, &self.header(base_path, &backup));
        atomic_write(path, &content)?;
        report.rewritten = true;

        Ok(report)
    }

    fn header(&self, base_path: &str, backup: &Path) -> Vec<String> {
        let backup_name = backup
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| backup.display().to_string());
        vec![
            format!(
                "# Secrets were moved to Vault by vault-onboard on {}.",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            format!("# Store: {}, path: {}", self.store.describe(), base_path),
            format!("# Original file: {}", backup_name),
            format!(
                "# Read a value with: vault kv get -field=value {}",
                join_path(&[self.store.mount(), base_path, "<KEY>"])
            ),
        ]
    }
}

/// Render the filtered file: header comments, then the retained entries.
pub fn render_filtered(retained: &[&EnvEntry], header: &[String]) -> String {
    let mut out = String::new();
    for line in header {
        out.push_str(line);
        out.push('\n');
    }
    if !header.is_empty() {
        out.push('\n');
    }
    for entry in retained {
        out.push_str(&entry.to_line());
        out.push('\n');
    }
    out
}

/// Migrate with default options.
pub fn migrate(
    path: &Path,
    base_path: &str,
    classifier: &Classifier,
    store: &dyn SecretStoreClient,
) -> Result<MigrationReport> {
    Migrator::new(classifier, store).migrate(path, base_path)
}
