//! Redaction of secret values in displayed text.

/// Replaces registered secret values with a mask.
///
/// Used to scrub tokens out of command output and error messages before they
/// reach the terminal.
///
/// # Example
///
/// ```
/// use vault_onboard::secrets::OutputMasker;
///
/// let mut masker = OutputMasker::new();
/// masker.add_secret("hvs.abcdef");
///
/// let output = masker.mask("login ok, token hvs.abcdef");
/// assert_eq!(output, "login ok, token [REDACTED]");
/// ```
#[derive(Debug, Clone)]
pub struct OutputMasker {
    secrets: Vec<String>,
    mask: String,
}

impl OutputMasker {
    /// Create a masker with the default `[REDACTED]` mask.
    pub fn new() -> Self {
        Self::with_mask("[REDACTED]")
    }

    /// Create a masker with a custom mask string.
    pub fn with_mask(mask: impl Into<String>) -> Self {
        Self {
            secrets: Vec::new(),
            mask: mask.into(),
        }
    }

    /// Register a secret value. Empty strings and duplicates are ignored.
    pub fn add_secret(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() || self.secrets.contains(&value) {
            return;
        }
        self.secrets.push(value);
        // Longest first so a secret containing another is masked whole.
        self.secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));
    }

    /// Register an optional secret value.
    pub fn add_optional(&mut self, value: Option<&str>) {
        if let Some(v) = value {
            self.add_secret(v);
        }
    }

    /// Mask every registered secret in the input.
    pub fn mask(&self, input: &str) -> String {
        let mut result = input.to_string();
        for secret in &self.secrets {
            result = result.replace(secret.as_str(), &self.mask);
        }
        result
    }
}

impl Default for OutputMasker {
    fn default() -> Self {
        Self::new()
    }
}

/// Short, non-revealing preview of a secret value.
///
/// Shows at most the first four characters for values longer than eight
/// characters; shorter values are fully hidden.
pub fn preview(value: &str) -> String {
    let count = value.chars().count();
    if count <= 8 {
        return "••••".to_string();
    }
    let head: String = value.chars().take(4).collect();
    format!("{}••••", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_single_secret() {
        let mut masker = OutputMasker::new();
        masker.add_secret("super-secret-value");

        let output = masker.mask("The key is super-secret-value here");

        assert_eq!(output, "The key is [REDACTED] here");
    }

    #[test]
    fn ignores_empty_and_duplicate_secrets() {
        let mut masker = OutputMasker::new();
        masker.add_secret("");
        masker.add_secret("real-secret");
        masker.add_secret("real-secret");

        assert_eq!(masker.mask("abc"), "abc");
        assert_eq!(masker.mask("a real-secret b"), "a [REDACTED] b");
    }

    #[test]
    fn longer_secret_wins_over_contained_one() {
        let mut masker = OutputMasker::with_mask("***");
        masker.add_secret("abc");
        masker.add_secret("abcdef");

        assert_eq!(masker.mask("value=abcdef"), "value=***");
    }

    #[test]
    fn add_optional_skips_none() {
        let mut masker = OutputMasker::new();
        masker.add_optional(None);
        masker.add_optional(Some("ghp_x"));
        assert_eq!(masker.mask("token ghp_x"), "token [REDACTED]");
    }

    #[test]
    fn no_masking_without_secrets() {
        let masker = OutputMasker::default();
        let input = "This has no secrets to mask";
        assert_eq!(masker.mask(input), input);
    }

    #[test]
    fn preview_hides_short_values() {
        assert_eq!(preview("hunter2"), "••••");
        assert_eq!(preview(""), "••••");
    }

    #[test]
    fn preview_shows_prefix_of_long_values() {
        assert_eq!(preview("sk_live_abc123"), "sk_l••••");
    }
}
