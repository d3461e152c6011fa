//! In-memory secret store.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use crate::error::{OnboardError, Result};

use super::{join_path, Health, SecretStoreClient};

/// Secret store backed by a map.
///
/// Used for `--dry-run` migrations and in tests. Keys can be configured to
/// fail on write to exercise abort paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: RefCell<BTreeMap<String, String>>,
    failing_keys: HashSet<String>,
    unreachable: bool,
}

impl MemoryStore {
    /// Create an empty, healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every call fails as unreachable.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    /// Make writes of `key` fail.
    pub fn fail_on(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    /// Read a stored value by full path (`path/key`).
    pub fn get(&self, full_path: &str) -> Option<String> {
        self.secrets.borrow().get(full_path).cloned()
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.secrets.borrow().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.secrets.borrow().is_empty()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(OnboardError::Connectivity {
                addr: self.describe(),
                message: "store offline".to_string(),
            });
        }
        Ok(())
    }
}

impl SecretStoreClient for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn health(&self) -> Result<Health> {
        self.check_reachable()?;
        Ok(Health {
            initialized: true,
            sealed: false,
            standby: false,
            version: None,
        })
    }

    fn put_secret(&self, path: &str, key: &str, value: &str) -> Result<()> {
        self.check_reachable()?;
        if self.failing_keys.contains(key) {
            return Err(OnboardError::Other(anyhow::anyhow!(
                "write rejected for {}",
                key
            )));
        }
        self.secrets
            .borrow_mut()
            .insert(join_path(&[path, key]), value.to_string());
        Ok(())
    }

    fn list_keys(&self, path: &str) -> Result<Vec<String>> {
        self.check_reachable()?;
        let base = join_path(&[path]);
        let prefix = if base.is_empty() {
            base
        } else {
            format!("{}/", base)
        };
        let secrets = self.secrets.borrow();
        let keys = secrets
            .keys()
            .filter_map(|full| full.strip_prefix(&prefix))
            .map(|rest| match rest.split_once('/') {
                // Nested paths list as folders, like Vault does.
                Some((folder, _)) => format!("{}/", folder),
                None => rest.to_string(),
            })
            .collect::<std::collections::BTreeSet<_>>();
        Ok(keys.into_iter().collect())
    }
}
