//! Migrate command implementation.
//!
//! The `vault-onboard migrate` command moves the secrets in an env file into
//! Vault and rewrites the file without them.

use std::path::{Path, PathBuf};

use crate::cli::args::MigrateArgs;
use crate::error::{OnboardError, Result};
use crate::migrate::{MigrateOptions, MigrationReport, Migrator};
use crate::secrets::Classifier;
use crate::store::{MemoryStore, SecretStoreClient};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// The migrate command implementation.
pub struct MigrateCommand {
    project_root: PathBuf,
    args: MigrateArgs,
}

impl MigrateCommand {
    /// Create a new migrate command.
    pub fn new(project_root: &Path, args: MigrateArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    fn run(
        &self,
        classifier: &Classifier,
        store: &dyn SecretStoreClient,
        env_path: &Path,
        base_path: &str,
    ) -> Result<MigrationReport> {
        let options = MigrateOptions {
            dry_run: self.args.dry_run,
            register_backup_ignore: !self.args.no_gitignore,
        };
        Migrator::new(classifier, store)
            .with_options(options)
            .migrate(env_path, base_path)
    }
}

impl Command for MigrateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let env_path = display::resolve(&self.project_root, &self.args.source.env_file);
        let classifier = display::load_classifier(&self.project_root, &self.args.source)?;
        let base_path = display::base_path(&self.project_root, &self.args.store);

        ui.show_header(&format!("Migrate {}", self.args.source.env_file.display()));

        let report = if self.args.dry_run {
            // Nothing is written in a dry run; Vault need not be up.
            self.run(&classifier, &MemoryStore::new(), &env_path, &base_path)?
        } else {
            let client = display::vault_client(&self.args.store)?;
            let health = client.health()?;
            if health.sealed {
                return Err(OnboardError::Connectivity {
                    addr: client.addr().to_string(),
                    message: "Vault is sealed. Unseal it or run `vault-onboard setup`".to_string(),
                });
            }
            self.run(&classifier, &client, &env_path, &base_path)?
        };

        display::show_migration_report(
            ui,
            &report,
            &display::store_path(&self.args.store, &base_path),
        );
        Ok(CommandResult::success())
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

    fn args_for(server: &MockServer) -> MigrateArgs {
        let mut args = MigrateArgs::default();
        args.store.vault_addr = Some(server.base_url());
        args.store.vault_token = Some("test-token".into());
        args.store.path = Some("myapp".into());
        args
    }

    #[test]
    fn dry_run_changes_nothing() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join(".env");
        fs::write(&env, "API_KEY=sk_live_abc123\nPORT=3000\n").unwrap();
        let mut args = MigrateArgs::default();
        args.dry_run = true;
        let mut ui = MockUI::new();

        let result = MigrateCommand::new(temp.path(), args).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.printed("Would move 1 secret(s)"));
        assert_eq!(
            fs::read_to_string(&env).unwrap(),
            "API_KEY=sk_live_abc123\nPORT=3000\n"
        );
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn migrates_into_vault() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join(".env");
        fs::write(&env, "API_KEY=sk_live_abc123\nPORT=3000\n").unwrap();

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/sys/health");
            then.status(200)
                .json_body(json!({"initialized": true, "sealed": false}));
        });
        let put = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/secret/data/myapp/API_KEY")
                .header("x-vault-token", "test-token");
            then.status(200).json_body(json!({"data": {"version": 1}}));
        });
        let mut ui = MockUI::new();

        let result = MigrateCommand::new(temp.path(), args_for(&server))
            .execute(&mut ui)
            .unwrap();

        put.assert();
        assert!(result.success);
        assert!(ui.has_success("Moved 1 secret(s) to secret/myapp"));
        let content = fs::read_to_string(&env).unwrap();
        assert!(content.contains("PORT=3000"));
        assert!(!content.contains("sk_live_abc123"));
    }

    #[test]
    fn sealed_vault_is_refused() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "API_KEY=abc\n").unwrap();

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/sys/health");
            then.status(503)
                .json_body(json!({"initialized": true, "sealed": true}));
        });
        let mut ui = MockUI::new();

        let err = MigrateCommand::new(temp.path(), args_for(&server))
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, OnboardError::Connectivity { .. }));
        assert_eq!(
            fs::read_to_string(temp.path().join(".env")).unwrap(),
            "API_KEY=abc\n"
        );
    }
}
