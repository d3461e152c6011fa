//! Backups and atomic rewrites of the env file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{OnboardError, Result};

/// Timestamp format used in backup file names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Ignore file that backups are registered in.
pub const IGNORE_FILE: &str = ".gitignore";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| ".env".to_string())
}

/// Sibling backup path: `<name>.backup.<YYYYmmdd_HHMMSS>`.
pub fn backup_path_for(path: &Path, at: DateTime<Local>) -> PathBuf {
    let name = format!(
        "{}.backup.{}",
        file_name(path),
        at.format(BACKUP_TIMESTAMP_FORMAT)
    );
    path.with_file_name(name)
}

/// Ignore-file pattern covering every backup of `path`.
pub fn backup_glob(path: &Path) -> String {
    format!("{}.backup.*", file_name(path))
}

/// Copy `path` to a timestamped sibling and return the backup path.
///
/// Two backups within the same second get a numeric suffix instead of
/// overwriting each other.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let base = backup_path_for(path, Local::now());
    let mut target = base.clone();
    let mut n = 1;
    while target.exists() {
        target = PathBuf::from(format!("{}.{}", base.display(), n));
        n += 1;
    }

    fs::copy(path, &target).map_err(|e| OnboardError::Backup {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!("Backed up {} to {}", path.display(), target.display());
    Ok(target)
}

/// Add the backup pattern to a sibling `.gitignore`.
///
/// Only touches an existing ignore file. Returns whether a line was added.
pub fn register_in_ignore_file(path: &Path) -> Result<bool> {
    let ignore = path.with_file_name(IGNORE_FILE);
    if !ignore.exists() {
        return Ok(false);
    }

    let pattern = backup_glob(path);
    let content = fs::read_to_string(&ignore)?;
    if content.lines().any(|l| l.trim() == pattern) {
        return Ok(false);
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&pattern);
    updated.push('\n');
    fs::write(&ignore, updated)?;

    tracing::debug!("Registered {} in {}", pattern, ignore.display());
    Ok(true)
}

/// Replace the contents of `path` via a temporary sibling and a rename.
///
/// The original file's permissions are carried over.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_file_name(format!(".{}.vault-onboard.tmp", file_name(path)));
    fs::write(&tmp, content)?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(&tmp, meta.permissions())?;
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
