//! Secret pattern sources.
//!
//! Patterns come from a [`PatternProvider`]: either a JSON file
//! ([`FilePatternProvider`]) or the compiled-in defaults
//! ([`BuiltinPatternProvider`]). The provider is chosen once at startup by
//! [`select_provider`]; a configured file that does not exist is an error,
//! never a silent fallback to the built-ins.
//!
//! # File format
//!
//! ```json
//! {
//!   "variable_name_patterns": ["_KEY$", "_TOKEN$"],
//!   "variable_value_patterns": ["^0x[a-fA-F0-9]{64}$"],
//!   "exclude_variables": ["^WORKSPACE_NAME$"]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OnboardError, Result};

/// Default location of the pattern file, relative to the project root.
pub const DEFAULT_PATTERN_FILE: &str = ".vault/secret-patterns.json";

/// Built-in variable names that are never secrets.
pub const BUILTIN_EXCLUDE_PATTERNS: &[&str] = &[
    r"^(NODE_ENV|RUST_LOG|LOG_LEVEL|DEBUG|PORT|HOST|HOSTNAME|TZ)$",
    r"^WORKSPACE_NAME$",
    r"^VAULT_(ADDR|MODE|NAMESPACE)$",
    r"^NEXT_PUBLIC_",
    r"_PUBLIC_KEY$",
];

/// Built-in variable name patterns that mark a secret.
pub const BUILTIN_NAME_PATTERNS: &[&str] = &[
    r"_KEY$",
    r"_SECRET$",
    r"^SECRET$",
    r"_TOKEN$",
    r"^TOKEN$",
    r"PASSWORD",
    r"PASSWD",
    r"_PWD$",
    r"CREDENTIALS?$",
    r"MNEMONIC",
    r"SEED_PHRASE",
    r"^DATABASE_URL$",
    r"CONNECTION_STRING",
];

/// Built-in value patterns that mark a secret regardless of the name.
pub const BUILTIN_VALUE_PATTERNS: &[&str] = &[
    // 32-byte hex private key
    r"^0x[a-fA-F0-9]{64}$",
    r"^sk_(live|test)_[A-Za-z0-9]+",
    r"^gh[pousr]_[A-Za-z0-9]{20,}",
    r"^github_pat_[A-Za-z0-9_]{20,}",
    r"^xox[abprs]-[A-Za-z0-9-]+",
    r"^AKIA[0-9A-Z]{16}$",
    r"-----BEGIN [A-Z ]*PRIVATE KEY-----",
    // JWT
    r"^eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.",
    // Credentials embedded in a URL
    r"://[^/\s:@]+:[^/\s@]+@",
];

/// Raw pattern configuration as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Regexes matched against variable names.
    #[serde(default)]
    pub variable_name_patterns: Vec<String>,
    /// Regexes matched against variable values.
    #[serde(default)]
    pub variable_value_patterns: Vec<String>,
    /// Regexes for variable names that are never secrets.
    #[serde(default)]
    pub exclude_variables: Vec<String>,
}

impl PatternConfig {
    /// The built-in pattern lists.
    pub fn builtin() -> Self {
        let owned = |list: &[&str]| list.iter().map(|p| p.to_string()).collect();
        Self {
            variable_name_patterns: owned(BUILTIN_NAME_PATTERNS),
            variable_value_patterns: owned(BUILTIN_VALUE_PATTERNS),
            exclude_variables: owned(BUILTIN_EXCLUDE_PATTERNS),
        }
    }

    /// Compile every pattern.
    pub fn compile(&self) -> Result<PatternSet> {
        Ok(PatternSet {
            name_exclude: compile_all(&self.exclude_variables)?,
            name_secret: compile_all(&self.variable_name_patterns)?,
            value_secret: compile_all(&self.variable_value_patterns)?,
        })
    }
}

/// Compiled secret patterns. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// Names that are never secrets.
    pub name_exclude: Vec<Regex>,
    /// Names that mark a secret.
    pub name_secret: Vec<Regex>,
    /// Values that mark a secret.
    pub value_secret: Vec<Regex>,
}

impl PatternSet {
    /// Compile the built-in patterns.
    pub fn builtin() -> Self {
        // The built-in lists are covered by tests; they always compile.
        PatternConfig::builtin()
            .compile()
            .unwrap_or_else(|_| Self::empty())
    }

    /// A pattern set that matches nothing.
    pub fn empty() -> Self {
        Self {
            name_exclude: Vec::new(),
            name_secret: Vec::new(),
            value_secret: Vec::new(),
        }
    }

    /// Total number of patterns across all lists.
    pub fn len(&self) -> usize {
        self.name_exclude.len() + self.name_secret.len() + self.value_secret.len()
    }

    /// Whether there are no patterns at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compile a list of user-supplied patterns.
fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile_pattern(p)).collect()
}

/// Compile one pattern.
///
/// A leading `*` is read as "anything before", so shell-style entries such as
/// `*_KEY$` keep working.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let normalized = match pattern.strip_prefix('*') {
        Some(rest) => format!(".*{}", rest),
        None => pattern.to_string(),
    };
    Regex::new(&normalized).map_err(|e| OnboardError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// A source of secret patterns.
pub trait PatternProvider {
    /// Short description used in log lines.
    fn describe(&self) -> String;

    /// Load and compile the patterns.
    fn load(&self) -> Result<PatternSet>;
}

/// Patterns read from a JSON file.
#[derive(Debug, Clone)]
pub struct FilePatternProvider {
    path: PathBuf,
}

impl FilePatternProvider {
    /// Create a provider for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The configured file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw configuration.
    pub fn read_config(&self) -> Result<PatternConfig> {
        if !self.path.exists() {
            return Err(OnboardError::ConfigNotFound {
                path: self.path.clone(),
            });
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| OnboardError::ConfigParseError {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl PatternProvider for FilePatternProvider {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<PatternSet> {
        let config = self.read_config()?;
        tracing::debug!(
            "Loaded {} name, {} value and {} exclude patterns from {}",
            config.variable_name_patterns.len(),
            config.variable_value_patterns.len(),
            config.exclude_variables.len(),
            self.path.display()
        );
        config.compile()
    }
}

/// The compiled-in default patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPatternProvider;

impl PatternProvider for BuiltinPatternProvider {
    fn describe(&self) -> String {
        "built-in patterns".to_string()
    }

    fn load(&self) -> Result<PatternSet> {
        PatternConfig::builtin().compile()
    }
}

/// Choose the pattern source for a run.
///
/// 1. An explicitly configured file (must exist)
/// 2. `<project>/.vault/secret-patterns.json` when present
/// 3. The built-in patterns
pub fn select_provider(explicit: Option<&Path>, project_root: &Path) -> Box<dyn PatternProvider> {
    if let Some(path) = explicit {
        return Box::new(FilePatternProvider::new(path));
    }

    let discovered = project_root.join(DEFAULT_PATTERN_FILE);
    if discovered.exists() {
        Box::new(FilePatternProvider::new(discovered))
    } else {
        Box::new(BuiltinPatternProvider)
    }
}

/// Load patterns using [`select_provider`].
pub fn load_patterns(explicit: Option<&Path>, project_root: &Path) -> Result<PatternSet> {
    let provider = select_provider(explicit, project_root);
    tracing::debug!("Using secret patterns from {}", provider.describe());
    provider.load()
}
