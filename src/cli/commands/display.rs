//! Shared helpers for the env-file commands.
//!
//! `migrate`, `validate` and `scan` resolve their inputs and render their
//! reports the same way; the helpers live here.

use std::path::{Path, PathBuf};

use crate::cli::args::{SourceArgs, StoreArgs};
use crate::config::load_patterns;
use crate::error::Result;
use crate::migrate::MigrationReport;
use crate::secrets::Classifier;
use crate::store::{join_path, VaultClient};
use crate::ui::UserInterface;
use crate::validate::ValidationReport;
use crate::wizard::{default_base_path, DEFAULT_VAULT_ADDR};

/// Resolve `path` against the project root.
pub fn resolve(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Build the classifier from `--patterns` or pattern discovery.
pub fn load_classifier(project_root: &Path, source: &SourceArgs) -> Result<Classifier> {
    let explicit = source.patterns.as_deref().map(|p| resolve(project_root, p));
    let patterns = load_patterns(explicit.as_deref(), project_root)?;
    tracing::debug!("loaded {} secret pattern(s)", patterns.len());
    Ok(Classifier::new(patterns))
}

/// Store path from `--path`, else the project directory name.
pub fn base_path(project_root: &Path, store: &StoreArgs) -> String {
    store
        .path
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| default_base_path(project_root))
}

/// Mount-qualified path for messages.
pub fn store_path(store: &StoreArgs, base_path: &str) -> String {
    join_path(&[&store.mount, base_path])
}

/// Vault client for `--vault-addr`, `--vault-token` and `--mount`.
pub fn vault_client(store: &StoreArgs) -> Result<VaultClient> {
    let addr = store.vault_addr.as_deref().unwrap_or(DEFAULT_VAULT_ADDR);
    let client = VaultClient::new(addr)?.with_mount(&store.mount);
    Ok(match store.vault_token.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(token) => client.with_token(token),
        None => client,
    })
}

/// Print the outcome of a migration.
pub fn show_migration_report(
    ui: &mut dyn UserInterface,
    report: &MigrationReport,
    store_path: &str,
) {
    if report.found == 0 {
        ui.success(&format!(
            "No secrets found in {} ({} variable(s) checked)",
            report.env_path.display(),
            report.total_entries
        ));
        return;
    }

    if report.dry_run {
        ui.print(&format!("Would move {} secret(s) to {}:", report.found, store_path));
        for key in &report.secret_keys {
            ui.print(&format!("  {}", key));
        }
        ui.print(&format!("{} variable(s) would stay in the file", report.retained()));
        return;
    }

    ui.success(&format!("Moved {} secret(s) to {}", report.migrated, store_path));
    ui.show_key_value("Stored", &report.stored_keys.join(", "));
    ui.show_key_value("Kept", &report.retained().to_string());
    if let Some(backup) = &report.backup_path {
        ui.show_key_value("Backup", &backup.display().to_string());
    }
}

/// Print the findings of a validation.
pub fn show_validation_report(ui: &mut dyn UserInterface, report: &ValidationReport) {
    for warning in &report.warnings {
        ui.warning(warning);
    }
    for error in report.errors() {
        ui.error(&error.to_string());
    }
    if let Some(keys) = &report.store_keys {
        if !keys.is_empty() {
            ui.message(&format!("{} key(s) stored under {}", keys.len(), report.base_path));
        }
    }
    if report.is_success() {
        ui.success(&format!("No secrets left in {}", report.env_path.display()));
    }
}
