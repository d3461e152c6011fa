//! .env file parsing.
//!
//! This module reads environment variable files in the plain `KEY=value`
//! format. Unlike a map-based loader, entries keep their order of appearance
//! so that a rewritten file lists the surviving variables exactly as before.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// One `KEY=value` line of an env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    /// Variable name, trimmed.
    pub key: String,
    /// Raw value, trimmed. Quotes are kept as written.
    pub value: String,
    /// 1-based line number in the source file.
    pub line: usize,
}

impl EnvEntry {
    /// Create an entry without a source line (line 0).
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            line: 0,
        }
    }

    /// Render the entry back to `KEY=value`.
    pub fn to_line(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Parsed env file.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Whitespace around equals: `KEY = value`
/// - Values with equals signs: `URL=https://example.com?foo=bar`
/// - Comments and blank lines are skipped
///
/// Quoting and escaping are not interpreted.
///
/// # Example
///
/// ```
/// use vault_onboard::config::EnvFile;
///
/// let content = "# app\nPORT=3000\nAPI_KEY=sk_live_abc123\n";
/// let file = EnvFile::parse(content);
///
/// let keys: Vec<_> = file.entries().iter().map(|e| e.key.as_str()).collect();
/// assert_eq!(keys, ["PORT", "API_KEY"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    entries: Vec<EnvEntry>,
    malformed: Vec<usize>,
}

impl EnvFile {
    /// Parse env file content.
    pub fn parse(content: &str) -> Self {
        let mut file = Self::default();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Self::parse_line(line) {
                Some((key, value)) => file.entries.push(EnvEntry {
                    key,
                    value,
                    line: line_no,
                }),
                None => file.malformed.push(line_no),
            }
        }

        file
    }

    /// Parse a single line, splitting on the first `=`.
    fn parse_line(line: &str) -> Option<(String, String)> {
        let (key, value) = line.split_once('=')?;
        Some((key.trim().to_string(), value.trim().to_string()))
    }

    /// Load and parse an env file from a path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file = Self::parse(&content);
        for line in &file.malformed {
            tracing::warn!("{}:{}: ignoring line without '='", path.display(), line);
        }
        Ok(file)
    }

    /// Entries in order of appearance.
    pub fn entries(&self) -> &[EnvEntry] {
        &self.entries
    }

    /// Consume the file and return its entries.
    pub fn into_entries(self) -> Vec<EnvEntry> {
        self.entries
    }

    /// Line numbers of non-comment lines that had no `=`.
    pub fn malformed_lines(&self) -> &[usize] {
        &self.malformed
    }

    /// Look up the value of a key (first occurrence).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

/// Set `key=value` in an env file, keeping every other line as written.
///
/// An existing assignment is replaced in place; otherwise the assignment is
/// appended. The file is created when missing.
pub fn upsert(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut replaced = false;
    let mut lines: Vec<String> = content
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            let is_match = !trimmed.starts_with('#')
                && trimmed
                    .split_once('=')
                    .is_some_and(|(k, _)| k.trim() == key);
            if is_match && !replaced {
                replaced = true;
                format!("{}={}", key, value)
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(format!("{}={}", key, value));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_simple_env_file() {
        let content = r#"
KEY1=value1
KEY2=value2
"#;

        let file = EnvFile::parse(content);

        assert_eq!(file.get("KEY1"), Some("value1"));
        assert_eq!(file.get("KEY2"), Some("value2"));
    }

    #[test]
    fn preserves_order_of_appearance() {
        let content = "ZED=1\nALPHA=2\nMIDDLE=3\n";

        let file = EnvFile::parse(content);
        let keys: Vec<_> = file.entries().iter().map(|e| e.key.as_str()).collect();

        assert_eq!(keys, ["ZED", "ALPHA", "MIDDLE"]);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let content = r#"
# This is a comment
KEY=value

   # Indented comment
"#;

        let file = EnvFile::parse(content);

        assert_eq!(file.entries().len(), 1);
        assert_eq!(file.entries()[0].line, 3);
    }

    #[test]
    fn keeps_quotes_verbatim() {
        let file = EnvFile::parse("QUOTED=\"with spaces\"");
        assert_eq!(file.get("QUOTED"), Some("\"with spaces\""));
    }

    #[test]
    fn handles_empty_values() {
        let file = EnvFile::parse("EMPTY=");
        assert_eq!(file.get("EMPTY"), Some(""));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let file = EnvFile::parse("URL=https://example.com?foo=bar");
        assert_eq!(file.get("URL"), Some("https://example.com?foo=bar"));
    }

    #[test]
    fn trims_whitespace_around_key_and_value() {
        let file = EnvFile::parse("  KEY =  value with spaces  ");
        assert_eq!(file.get("KEY"), Some("value with spaces"));
    }

    #[test]
    fn records_lines_without_equals() {
        let content = "KEY1=value1\ninvalid line\nKEY2=value2\n";

        let file = EnvFile::parse(content);

        assert_eq!(file.entries().len(), 2);
        assert_eq!(file.malformed_lines(), &[2]);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let result = EnvFile::load(Path::new("/nonexistent/path/.env"));
        assert!(result.is_err());
    }

    #[test]
    fn entry_renders_back_to_line() {
        let entry = EnvEntry::new("PORT", "3000");
        assert_eq!(entry.to_line(), "PORT=3000");
    }

    #[test]
    fn upsert_replaces_existing_assignment() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        fs::write(&path, "# header\nVAULT_ADDR=http://old:8200\nPORT=3000\n").unwrap();

        upsert(&path, "VAULT_ADDR", "http://127.0.0.1:8200").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# header\nVAULT_ADDR=http://127.0.0.1:8200\nPORT=3000\n"
        );
    }

    #[test]
    fn upsert_appends_missing_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        fs::write(&path, "PORT=3000\n").unwrap();

        upsert(&path, "VAULT_MODE", "persistent").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "PORT=3000\nVAULT_MODE=persistent\n");
    }

    #[test]
    fn upsert_ignores_commented_assignment() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        fs::write(&path, "# VAULT_MODE=old\n").unwrap();

        upsert(&path, "VAULT_MODE", "ephemeral").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "# VAULT_MODE=old\nVAULT_MODE=ephemeral\n");
    }

    #[test]
    fn upsert_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");

        upsert(&path, "VAULT_ADDR", "http://127.0.0.1:8200").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "VAULT_ADDR=http://127.0.0.1:8200\n"
        );
    }
}
