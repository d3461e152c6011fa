//! Validate command implementation.
//!
//! The `vault-onboard validate` command checks that an env file holds no
//! secrets and that the store has keys under the project path.

use std::path::{Path, PathBuf};

use crate::cli::args::ValidateArgs;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::validate::validate;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// The validate command implementation.
pub struct ValidateCommand {
    project_root: PathBuf,
    args: ValidateArgs,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(project_root: &Path, args: ValidateArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let env_path = display::resolve(&self.project_root, &self.args.source.env_file);
        let classifier = display::load_classifier(&self.project_root, &self.args.source)?;
        let base_path = display::base_path(&self.project_root, &self.args.store);
        let client = display::vault_client(&self.args.store)?;

        ui.show_header(&format!("Validate {}", self.args.source.env_file.display()));

        let report = validate(&env_path, &base_path, &classifier, &client)?;
        display::show_validation_report(ui, &report);

        match report.into_result() {
            Ok(_) => Ok(CommandResult::success()),
            Err(e) => {
                tracing::debug!("validation failed: {}", e);
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn args_for(server: &MockServer) -> ValidateArgs {
        let mut args = ValidateArgs::default();
        args.store.vault_addr = Some(server.base_url());
        args.store.vault_token = Some("test-token".into());
        args.store.path = Some("myapp".into());
        args
    }

    #[test]
    fn clean_file_passes() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "PORT=3000\n").unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/secret/metadata/myapp")
                .query_param("list", "true");
            then.status(200)
                .json_body(json!({"data": {"keys": ["API_KEY"]}}));
        });
        let mut ui = MockUI::new();

        let result = ValidateCommand::new(temp.path(), args_for(&server))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("1 key(s) stored under myapp"));
        assert!(ui.errors().is_empty());
    }

    #[test]
    fn residual_secret_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "PORT=3000\nAPI_KEY=abc\n").unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/secret/metadata/myapp");
            then.status(404);
        });
        let mut ui = MockUI::new();

        let result = ValidateCommand::new(temp.path(), args_for(&server))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Residual secret 'API_KEY' found on line 2"));
        assert!(ui.has_warning("No secrets found"));
    }
}
