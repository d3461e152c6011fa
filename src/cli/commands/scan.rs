//! Scan command implementation.
//!
//! The `vault-onboard scan` command lists the secrets an env file holds.
//! It reads only; the file and the store are left alone.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ScanArgs;
use crate::config::EnvFile;
use crate::error::{OnboardError, Result};
use crate::secrets::{preview, Classifier, Verdict};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// One secret found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFinding {
    pub key: String,
    pub line: usize,
    /// `name` or `value`, whichever pattern matched.
    pub matched: &'static str,
    /// Masked preview of the value.
    pub preview: String,
}

/// Everything a scan found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub path: PathBuf,
    pub secrets: Vec<ScanFinding>,
    pub retained: Vec<String>,
    pub malformed_lines: Vec<usize>,
}

/// Classify every entry of `file`.
pub fn scan(path: &Path, file: &EnvFile, classifier: &Classifier) -> ScanReport {
    let mut report = ScanReport {
        path: path.to_path_buf(),
        malformed_lines: file.malformed_lines().to_vec(),
        ..Default::default()
    };

    for entry in file.entries() {
        let matched = match classifier.verdict(&entry.key, &entry.value) {
            Verdict::SecretName => "name",
            Verdict::SecretValue => "value",
            _ => {
                report.retained.push(entry.key.clone());
                continue;
            }
        };
        report.secrets.push(ScanFinding {
            key: entry.key.clone(),
            line: entry.line,
            matched,
            preview: preview(&entry.value),
        });
    }

    report
}

/// The scan command implementation.
pub struct ScanCommand {
    project_root: PathBuf,
    args: ScanArgs,
}

impl ScanCommand {
    /// Create a new scan command.
    pub fn new(project_root: &Path, args: ScanArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }
}

impl Command for ScanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let env_path = display::resolve(&self.project_root, &self.args.source.env_file);
        let classifier = display::load_classifier(&self.project_root, &self.args.source)?;
        let file = EnvFile::load(&env_path)?;
        let report = scan(&env_path, &file, &classifier);

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&report).map_err(|e| OnboardError::Other(e.into()))?;
            ui.print(&json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("Scan {}", self.args.source.env_file.display()));
        for line in &report.malformed_lines {
            ui.warning(&format!("Line {} has no '=' and is ignored", line));
        }
        for finding in &report.secrets {
            ui.print(&format!(
                "  {} (line {}, {} match) {}",
                finding.key, finding.line, finding.matched, finding.preview
            ));
        }
        if ui.output_mode().shows_details() {
            for key in &report.retained {
                ui.message(&format!("  {} (kept)", key));
            }
        }
        if report.secrets.is_empty() {
            ui.success("No secrets found");
        } else {
            ui.warning(&format!(
                "{} secret(s) found, {} other variable(s)",
                report.secrets.len(),
                report.retained.len()
            ));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{MockUI, OutputMode};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reports_which_pattern_matched() {
        let file = EnvFile::parse(&format!(
            "API_KEY=sk_live_abc123\nDEPLOYER=0x{}\nPORT=3000\n",
            "ab".repeat(32)
        ));
        let report = scan(Path::new(".env"), &file, &Classifier::with_builtins());

        let matched: Vec<_> = report.secrets.iter().map(|f| (f.key.as_str(), f.matched)).collect();
        assert_eq!(matched, [("API_KEY", "name"), ("DEPLOYER", "value")]);
        assert_eq!(report.retained, ["PORT"]);
    }

    #[test]
    fn values_are_never_printed() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "DB_PASSWORD=hunter2hunter2\n").unwrap();
        let mut ui = MockUI::new();

        ScanCommand::new(temp.path(), ScanArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.printed("DB_PASSWORD"));
        assert!(!ui.printed("hunter2hunter2"));
    }

    #[test]
    fn json_output_parses() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "API_KEY=abc\nbroken\n").unwrap();
        let mut ui = MockUI::new();
        let args = ScanArgs {
            json: true,
            ..Default::default()
        };

        ScanCommand::new(temp.path(), args).execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.printed_lines()[0]).unwrap();
        assert_eq!(value["secrets"][0]["key"], "API_KEY");
        assert_eq!(value["malformed_lines"][0], 2);
    }

    #[test]
    fn verbose_lists_kept_variables() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "API_KEY=abc
PORT=3000
").unwrap();

        let mut normal = MockUI::new();
        ScanCommand::new(temp.path(), ScanArgs::default())
            .execute(&mut normal)
            .unwrap();
        assert!(!normal.has_message("PORT"));

        let mut verbose = MockUI::with_mode(OutputMode::Verbose);
        ScanCommand::new(temp.path(), ScanArgs::default())
            .execute(&mut verbose)
            .unwrap();
        assert!(verbose.has_message("PORT (kept)"));
        assert!(verbose.printed_lines().iter().any(|l| l.contains("API_KEY")));
    }
}
