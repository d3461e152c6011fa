//! Secret classification of env entries.

use crate::config::{EnvEntry, PatternSet};

/// Why an entry was (or was not) classified as a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Key or value is empty.
    Empty,
    /// Key matched an exclude pattern.
    Excluded,
    /// Key matched a name pattern.
    SecretName,
    /// Value matched a value pattern.
    SecretValue,
    /// Nothing matched.
    Plain,
}

impl Verdict {
    /// Whether this verdict means "secret".
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::SecretName | Self::SecretValue)
    }
}

/// Decides whether `KEY=value` pairs are secrets.
///
/// Rules, first match wins:
///
/// 1. key matches an exclude pattern: not a secret
/// 2. key matches a name pattern: secret
/// 3. value matches a value pattern: secret
/// 4. otherwise: not a secret
///
/// # Example
///
/// ```
/// use vault_onboard::secrets::Classifier;
///
/// let classifier = Classifier::with_builtins();
///
/// assert!(classifier.classify("API_KEY", "sk_live_abc123"));
/// assert!(!classifier.classify("PORT", "3000"));
/// // Excluded names are never secrets
/// assert!(!classifier.classify("WORKSPACE_NAME", "ghp_aaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    patterns: PatternSet,
}

impl Classifier {
    /// Create a classifier over a loaded pattern set.
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// Create a classifier with the built-in patterns.
    pub fn with_builtins() -> Self {
        Self::new(PatternSet::builtin())
    }

    /// The pattern set in use.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Classify a pair and report which rule decided.
    pub fn verdict(&self, key: &str, value: &str) -> Verdict {
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() || value.is_empty() {
            return Verdict::Empty;
        }
        if self.patterns.name_exclude.iter().any(|p| p.is_match(key)) {
            return Verdict::Excluded;
        }
        if self.patterns.name_secret.iter().any(|p| p.is_match(key)) {
            return Verdict::SecretName;
        }
        if self.patterns.value_secret.iter().any(|p| p.is_match(value)) {
            return Verdict::SecretValue;
        }
        Verdict::Plain
    }

    /// Whether the pair is a secret.
    pub fn classify(&self, key: &str, value: &str) -> bool {
        self.verdict(key, value).is_secret()
    }

    /// Whether an env entry is a secret.
    pub fn is_secret(&self, entry: &EnvEntry) -> bool {
        self.classify(&entry.key, &entry.value)
    }

    /// Split entries into (secrets, retained), both in original order.
    pub fn partition<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a EnvEntry>,
    ) -> (Vec<&'a EnvEntry>, Vec<&'a EnvEntry>) {
        entries.into_iter().partition(|e| self.is_secret(e))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_builtins()
    }
}
