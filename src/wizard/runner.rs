//! Runs the wizard steps in order.

use std::fs;

use chrono::Utc;

use crate::config::{load_patterns, upsert_env_var, ModeConfig, VaultMode};
use crate::error::{OnboardError, Result};
use crate::migrate::Migrator;
use crate::secrets::{Classifier, OutputMasker};
use crate::shell::{execute, find_on_path};
use crate::store::{join_path, wait_until_reachable, SecretStoreClient, VaultClient};
use crate::ui::{Prompt, PromptOption, UserInterface};
use crate::validate::validate;

use super::context::{WizardContext, WizardOptions, DEFAULT_VAULT_ADDR};
use super::services::{DockerCompose, ServiceManager};
use super::steps::{Step, Transition};
use super::unseal::UnsealKeys;

/// Key shares created when initializing a persistent server.
const INIT_SHARES: u32 = 1;
const INIT_THRESHOLD: u32 = 1;

/// Upper bound on prompted unseal keys before giving up.
const MAX_UNSEAL_PROMPTS: usize = 5;

/// How a wizard run ended.
#[derive(Debug)]
pub enum WizardOutcome {
    /// Every step ran.
    Completed(WizardContext),
    /// The user declined at `at`.
    Cancelled { at: Step },
}

/// The setup wizard.
///
/// Steps run in [`Step::ALL`] order; each one receives the context and
/// returns the updated context or cancels. The first failing step ends the
/// run with its error. Nothing is retried except the health poll.
pub struct Wizard<'a> {
    options: WizardOptions,
    ui: &'a mut dyn UserInterface,
    services: Box<dyn ServiceManager + 'a>,
    masker: OutputMasker,
}

impl<'a> Wizard<'a> {
    /// Create a wizard that starts Vault with Docker Compose.
    pub fn new(options: WizardOptions, ui: &'a mut dyn UserInterface) -> Self {
        let services = Box::new(DockerCompose::new(
            options.compose_path(),
            options.project_root.clone(),
        ));
        Self {
            options,
            ui,
            services,
            masker: OutputMasker::new(),
        }
    }

    /// Replace the service manager.
    pub fn with_services(mut self, services: Box<dyn ServiceManager + 'a>) -> Self {
        self.services = services;
        self
    }

    /// Run every step.
    pub fn run(mut self, mut ctx: WizardContext) -> Result<WizardOutcome> {
        self.masker.add_optional(ctx.vault_token.as_deref());
        self.masker.add_optional(ctx.github_token.as_deref());

        let total = Step::ALL.len();
        for step in Step::ALL {
            ctx.current_step = Some(step);
            self.ui.show_progress(step.number(), total);
            self.ui.show_header(step.title());
            tracing::debug!("step {} started", step);

            match self.run_step(step, ctx) {
                Ok(Transition::Continue(next)) => ctx = next,
                Ok(Transition::Cancel) => {
                    tracing::info!("setup cancelled at {}", step);
                    return Ok(WizardOutcome::Cancelled { at: step });
                }
                Err(e) => {
                    tracing::debug!("step {} failed: {}", step, e);
                    self.ui.error(&format!("Step '{}' failed", step.name()));
                    return Err(e);
                }
            }
        }

        Ok(WizardOutcome::Completed(ctx))
    }

    fn run_step(&mut self, step: Step, ctx: WizardContext) -> Result<Transition> {
        match step {
            Step::SelectMode => self.select_mode(ctx),
            Step::AutoUnseal => self.auto_unseal(ctx),
            Step::Welcome => self.welcome(ctx),
            Step::Prerequisites => self.prerequisites(ctx),
            Step::ConfigureAddress => self.configure_address(ctx),
            Step::AuthSetup => self.auth_setup(ctx),
            Step::StartServices => self.start_services(ctx),
            Step::Initialize => self.initialize(ctx),
            Step::Authenticate => self.authenticate(ctx),
            Step::TemplateInit => self.template_init(ctx),
            Step::MigrateSecrets => self.migrate_secrets(ctx),
            Step::Verify => self.verify(ctx),
            Step::Complete => self.complete(ctx),
        }
    }

    fn previous_config(&mut self) -> Option<ModeConfig> {
        match ModeConfig::load(&self.options.project_root) {
            Ok(config) => config,
            Err(e) => {
                self.ui.warning(&format!("Ignoring unreadable mode config: {}", e));
                None
            }
        }
    }

    fn client(&self, ctx: &WizardContext) -> Result<VaultClient> {
        let client = VaultClient::with_timeout(&ctx.vault_addr, self.options.http_timeout)?
            .with_mount(&self.options.mount);
        Ok(match &ctx.vault_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    fn classifier(&self) -> Result<Classifier> {
        let explicit = self.options.patterns_path();
        let patterns = load_patterns(explicit.as_deref(), &self.options.project_root)?;
        Ok(Classifier::new(patterns))
    }

    fn select_mode(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        let mode = match self.options.mode {
            Some(mode) => {
                self.ui.message(&format!("Using {} mode", mode));
                mode
            }
            None => {
                let previous = self
                    .previous_config()
                    .map(|c| c.mode)
                    .unwrap_or_default();
                let prompt = Prompt::select(
                    "mode",
                    "Which Vault mode do you want?",
                    vec![
                        PromptOption::new(
                            "Ephemeral (dev server, data is lost on restart)",
                            VaultMode::Ephemeral.as_str(),
                        ),
                        PromptOption::new(
                            "Persistent (file storage, needs unsealing)",
                            VaultMode::Persistent.as_str(),
                        ),
                    ],
                    previous.as_str(),
                );
                let answer = self.ui.prompt(&prompt)?.as_string();
                answer
                    .parse::<VaultMode>()
                    .map_err(|message| OnboardError::UnknownOption { message })?
            }
        };

        ctx.vault_mode = mode;
        Ok(Transition::Continue(ctx))
    }

    fn auto_unseal(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        if !ctx.vault_mode.is_persistent() {
            ctx.auto_unseal = false;
            self.ui.message("Not needed in ephemeral mode");
            return Ok(Transition::Continue(ctx));
        }

        ctx.auto_unseal = match self.options.auto_unseal {
            Some(choice) => choice,
            None => self
                .ui
                .prompt(&Prompt::confirm(
                    "auto_unseal",
                    "Save unseal keys locally and unseal Vault automatically?",
                    false,
                ))?
                .as_bool(),
        };

        if ctx.auto_unseal {
            self.ui.warning(&format!(
                "Unseal keys will be stored in {}. Keep it out of version control.",
                self.options.unseal_key_path().display()
            ));
        }
        Ok(Transition::Continue(ctx))
    }

    fn welcome(&mut self, ctx: WizardContext) -> Result<Transition> {
        self.ui.message(&format!(
            "This will set up a {} Vault for {} and move the secrets in {} into it.",
            ctx.vault_mode,
            self.options.project_root.display(),
            self.options.env_file.display()
        ));
        self.ui.message(&format!(
            "A backup of {} is kept next to it.",
            self.options.env_file.display()
        ));

        let consent = self
            .ui
            .prompt(&Prompt::confirm("consent", "Continue?", true))?
            .as_bool();
        if !consent {
            self.ui.message("Setup cancelled. Nothing was changed.");
            return Ok(Transition::Cancel);
        }
        Ok(Transition::Continue(ctx))
    }

    fn prerequisites(&mut self, ctx: WizardContext) -> Result<Transition> {
        if self.options.skip_services {
            self.ui.message("Skipping container checks");
        } else {
            self.services.check_available()?;
            self.ui.success(&format!("{} is available", self.services.describe()));
        }

        if find_on_path("gh").is_some() {
            self.ui.success("GitHub CLI found");
        } else {
            self.ui
                .warning("GitHub CLI (gh) not found. Pass --github-token to use GitHub login.");
        }
        Ok(Transition::Continue(ctx))
    }

    fn configure_address(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        if ctx.vault_addr.trim().is_empty() {
            let default = self
                .previous_config()
                .map(|c| c.vault_addr)
                .unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string());
            ctx.vault_addr = self
                .ui
                .prompt(&Prompt::input(
                    "vault_addr",
                    "Vault address",
                    Some(default.as_str()),
                ))?
                .as_string();
        }

        let addr = ctx.vault_addr.trim().trim_end_matches('/').to_string();
        if !(addr.starts_with("http://") || addr.starts_with("https://")) {
            return Err(OnboardError::Connectivity {
                addr,
                message: "address must start with http:// or https://".to_string(),
            });
        }

        self.ui.message(&format!("Vault address: {}", addr));
        ctx.vault_addr = addr;
        Ok(Transition::Continue(ctx))
    }

    fn auth_setup(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        if ctx.github_token.is_some() {
            self.ui.message("Using the GitHub token from the command line");
            return Ok(Transition::Continue(ctx));
        }

        if self.options.use_gh_cli && find_on_path("gh").is_some() {
            match execute("gh", &["auth", "token"], None) {
                Ok(result) if result.success && !result.stdout.trim().is_empty() => {
                    ctx.github_token = Some(result.stdout.trim().to_string());
                }
                Ok(_) => tracing::debug!("gh is not logged in"),
                Err(e) => tracing::debug!("gh auth token failed: {}", e),
            }
        }

        if ctx.github_token.is_none() && ctx.vault_mode.is_persistent() && self.ui.is_interactive()
        {
            let answer = self
                .ui
                .prompt(&Prompt::secret(
                    "github_token",
                    "GitHub token for Vault login (leave empty to skip)",
                ))?
                .as_string();
            if !answer.trim().is_empty() {
                ctx.github_token = Some(answer.trim().to_string());
            }
        }

        match &ctx.github_token {
            Some(token) => {
                self.masker.add_secret(token.clone());
                self.ui.success("GitHub token available");
            }
            None => self.ui.message("No GitHub token. GitHub login will be skipped."),
        }
        Ok(Transition::Continue(ctx))
    }

    fn start_services(&mut self, ctx: WizardContext) -> Result<Transition> {
        if self.options.skip_services {
            self.ui.message("Not starting containers");
        } else {
            let service = self.options.service_for(ctx.vault_mode);
            let mut spinner = self.ui.start_spinner(&format!("Starting {}", service));
            let result = match self.services.start(&service) {
                Ok(result) => result,
                Err(e) => {
                    spinner.finish_error(&format!("Could not start {}", service));
                    return Err(e);
                }
            };
            if !result.success {
                spinner.finish_error(&format!("Could not start {}", service));
                let output = self.masker.mask(result.stderr.trim());
                if !output.is_empty() {
                    self.ui.error(&output);
                }
                return Err(OnboardError::CommandFailed {
                    command: format!("{} up -d {}", self.services.describe(), service),
                    code: result.exit_code,
                });
            }
            spinner.finish_success(&format!("Started {}", service));
            if self.ui.output_mode().shows_details() {
                for stream in [&result.stdout, &result.stderr] {
                    let output = self.masker.mask(stream.trim());
                    if !output.is_empty() {
                        self.ui.message(&output);
                    }
                }
            }
        }

        let client = self.client(&ctx)?;
        let retry = self.options.retry;
        let mut spinner = self
            .ui
            .start_spinner(&format!("Waiting for Vault at {}", ctx.vault_addr));
        let health = wait_until_reachable(&client, &retry, |attempt| {
            spinner.set_message(&format!(
                "Waiting for Vault ({}/{})",
                attempt + 1,
                retry.attempts
            ))
        });
        match health {
            Ok(health) => {
                let version = health.version.unwrap_or_else(|| "unknown".to_string());
                spinner.finish_success(&format!("Vault {} is reachable", version));
            }
            Err(e) => {
                spinner.finish_error("Vault did not answer");
                return Err(e);
            }
        }
        Ok(Transition::Continue(ctx))
    }

    fn initialize(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        let client = self.client(&ctx)?;
        let health = client.health()?;

        if !ctx.vault_mode.is_persistent() {
            if health.is_ready() {
                self.ui.message("Dev server is initialized and unsealed");
            } else {
                self.ui.warning("Dev server reports it is not ready; continuing");
            }
            return Ok(Transition::Continue(ctx));
        }

        if !health.initialized {
            let init = client.init(INIT_SHARES, INIT_THRESHOLD)?;
            self.masker.add_secret(init.root_token.clone());
            for key in &init.keys {
                self.masker.add_secret(key.clone());
            }
            self.ui.success("Vault initialized");

            if ctx.auto_unseal {
                let path = UnsealKeys::new(init.keys.clone(), INIT_THRESHOLD)
                    .save(&self.options.unseal_key_path())?;
                self.ui.success(&format!("Unseal keys saved to {}", path.display()));
            } else {
                self.ui
                    .warning("Store the unseal key below somewhere safe. It is shown only once.");
                for key in &init.keys {
                    self.ui.show_key_value("Unseal key", key);
                }
            }

            if ctx.vault_token.is_none() {
                ctx.vault_token = Some(init.root_token);
            }
            ctx.unseal_keys = init.keys;
        }

        if client.health()?.sealed {
            self.unseal(&client, &ctx)?;
        }
        self.ui.success("Vault is unsealed");
        Ok(Transition::Continue(ctx))
    }

    fn unseal(&mut self, client: &VaultClient, ctx: &WizardContext) -> Result<()> {
        let known = if !ctx.unseal_keys.is_empty() {
            ctx.unseal_keys.clone()
        } else if ctx.auto_unseal {
            UnsealKeys::load(&self.options.unseal_key_path())?.keys
        } else {
            Vec::new()
        };

        for key in &known {
            if !client.unseal(key)?.sealed {
                return Ok(());
            }
        }

        for _ in 0..MAX_UNSEAL_PROMPTS {
            let key = self
                .ui
                .prompt(&Prompt::secret("unseal_key", "Unseal key"))?
                .as_string();
            if key.trim().is_empty() {
                break;
            }
            let status = client.unseal(key.trim())?;
            if !status.sealed {
                return Ok(());
            }
            self.ui.message(&format!("Unseal progress: {}/{}", status.progress, status.t));
        }

        Err(OnboardError::Auth {
            message: "Vault is still sealed".to_string(),
        })
    }

    fn authenticate(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        let mut client = self.client(&ctx)?;

        let (token, source) = match (&ctx.vault_token, &ctx.github_token) {
            (Some(token), _) => (token.clone(), "Vault token"),
            (None, Some(github)) => match client.github_login(github) {
                Ok(token) => (token, "GitHub login"),
                Err(e) if !ctx.vault_mode.is_persistent() => {
                    self.ui.warning(&format!(
                        "GitHub login failed ({}); using the dev root token",
                        self.masker.mask(&e.to_string())
                    ));
                    (self.options.dev_root_token.clone(), "dev root token")
                }
                Err(e) => return Err(e),
            },
            (None, None) if !ctx.vault_mode.is_persistent() => {
                (self.options.dev_root_token.clone(), "dev root token")
            }
            (None, None) => {
                return Err(OnboardError::Auth {
                    message: "no Vault token. Set VAULT_TOKEN or provide a GitHub token"
                        .to_string(),
                })
            }
        };

        self.masker.add_secret(token.clone());
        client.set_token(token.clone());
        let info = client.lookup_self()?;

        let who = if info.display_name.is_empty() {
            "token".to_string()
        } else {
            info.display_name
        };
        self.ui.success(&format!("Authenticated with {} as {}", source, who));
        ctx.vault_token = Some(token);
        Ok(Transition::Continue(ctx))
    }

    fn template_init(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        let env = self.options.env_path();
        let template = self.options.template_path();

        if env.exists() {
            self.ui.message(&format!("Using {}", env.display()));
        } else if template.exists() {
            fs::copy(&template, &env)?;
            self.ui.success(&format!(
                "Created {} from {}",
                self.options.env_file.display(),
                self.options.env_template.display()
            ));
        } else {
            self.ui.warning(&format!(
                "Neither {} nor {} exists. Skipping secret migration.",
                self.options.env_file.display(),
                self.options.env_template.display()
            ));
            ctx.skip_migration = true;
        }
        Ok(Transition::Continue(ctx))
    }

    fn migrate_secrets(&mut self, mut ctx: WizardContext) -> Result<Transition> {
        if ctx.skip_migration {
            self.ui.message("Nothing to migrate");
            return Ok(Transition::Continue(ctx));
        }

        let classifier = self.classifier()?;
        let client = self.client(&ctx)?;
        let env = self.options.env_path();
        let report = Migrator::new(&classifier, &client).migrate(&env, &self.options.base_path)?;

        if report.is_noop() {
            self.ui.message(&format!(
                "No secrets found in {}",
                self.options.env_file.display()
            ));
        } else {
            self.ui.success(&format!(
                "Moved {} secret(s) to {}",
                report.migrated,
                join_path(&[&self.options.mount, &self.options.base_path])
            ));
            if let Some(backup) = &report.backup_path {
                self.ui.message(&format!("Original saved as {}", backup.display()));
            }
        }

        ctx.migration = Some(report);
        Ok(Transition::Continue(ctx))
    }

    fn verify(&mut self, ctx: WizardContext) -> Result<Transition> {
        if ctx.skip_migration {
            self.ui.message("Nothing to verify");
            return Ok(Transition::Continue(ctx));
        }

        let classifier = self.classifier()?;
        let client = self.client(&ctx)?;
        let report = validate(
            &self.options.env_path(),
            &self.options.base_path,
            &classifier,
            &client,
        )?;

        for warning in &report.warnings {
            self.ui.warning(warning);
        }
        for error in report.errors() {
            self.ui.error(&error.to_string());
        }
        let report = report.into_result()?;

        let stored = report.store_keys.as_ref().map(Vec::len).unwrap_or(0);
        self.ui.success(&format!(
            "No secrets left in {} ({} key(s) in {})",
            self.options.env_file.display(),
            stored,
            client.describe()
        ));
        Ok(Transition::Continue(ctx))
    }

    fn complete(&mut self, ctx: WizardContext) -> Result<Transition> {
        let config = ModeConfig {
            mode: ctx.vault_mode,
            auto_unseal: ctx.auto_unseal,
            vault_addr: ctx.vault_addr.clone(),
            updated_at: Utc::now(),
        };
        let config_path = config.save(&self.options.project_root)?;

        let env = self.options.env_path();
        upsert_env_var(&env, "VAULT_ADDR", &ctx.vault_addr)?;
        upsert_env_var(&env, "VAULT_MODE", ctx.vault_mode.as_str())?;

        self.ui.success("Vault setup complete");
        self.ui.show_key_value("Mode", ctx.vault_mode.as_str());
        self.ui.show_key_value("Address", &ctx.vault_addr);
        self.ui.show_key_value(
            "Secrets path",
            &join_path(&[&self.options.mount, &self.options.base_path]),
        );
        if let Some(report) = &ctx.migration {
            self.ui.show_key_value("Migrated", &report.migrated.to_string());
        }
        self.ui.show_key_value("Mode config", &config_path.display().to_string());
        Ok(Transition::Continue(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvFile;
    use crate::shell::CommandResult;
    use crate::store::RetryPolicy;
    use crate::ui::{MockUI, OutputMode};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Service manager that records starts.
    struct FakeServices {
        started: Rc<RefCell<Vec<String>>>,
        exit_code: i32,
    }

    impl ServiceManager for FakeServices {
        fn describe(&self) -> String {
            "fake compose".to_string()
        }

        fn check_available(&self) -> Result<()> {
            Ok(())
        }

        fn start(&self, service: &str) -> Result<CommandResult> {
            self.started.borrow_mut().push(service.to_string());
            Ok(CommandResult {
                exit_code: Some(self.exit_code),
                stdout: String::new(),
                stderr: if self.exit_code == 0 {
                    format!("Container {} Started", service)
                } else {
                    "pull access denied".to_string()
                },
                duration: Duration::ZERO,
                success: self.exit_code == 0,
            })
        }
    }

    fn options(root: &Path, server: &MockServer) -> (WizardOptions, WizardContext) {
        let mut options = WizardOptions::new(root);
        options.base_path = "myapp".to_string();
        options.skip_services = true;
        options.use_gh_cli = false;
        options.retry = RetryPolicy::new(2, Duration::ZERO);
        options.http_timeout = Duration::from_secs(5);
        let ctx = WizardContext::new(Some(server.base_url()), None, None);
        (options, ctx)
    }

    fn mock_ready_dev_server(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/v1/sys/health");
            then.status(200).json_body(json!({
                "initialized": true,
                "sealed": false,
                "standby": false,
                "version": "1.15.0"
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/auth/token/lookup-self")
                .header("x-vault-token", "root");
            then.status(200)
                .json_body(json!({"data": {"display_name": "root", "policies": ["root"]}}));
        });
    }

    #[test]
    fn ephemeral_run_migrates_and_records_mode() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".env"),
            "API_KEY=sk_live_abc123\nPORT=3000\n",
        )
        .unwrap();

        let server = MockServer::start();
        mock_ready_dev_server(&server);
        let put = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/secret/data/myapp/API_KEY")
                .header("x-vault-token", "root")
                .json_body(json!({"data": {"value": "sk_live_abc123"}}));
            then.status(200).json_body(json!({"data": {"version": 1}}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/secret/metadata/myapp")
                .query_param("list", "true");
            then.status(200).json_body(json!({"data": {"keys": ["API_KEY"]}}));
        });

        let (mut options, ctx) = options(temp.path(), &server);
        options.mode = Some(VaultMode::Ephemeral);
        let mut ui = MockUI::new();

        let outcome = Wizard::new(options, &mut ui).run(ctx).unwrap();

        put.assert();
        let ctx = match outcome {
            WizardOutcome::Completed(ctx) => ctx,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(ctx.vault_token.as_deref(), Some("root"));
        assert_eq!(ctx.current_step, Some(Step::Complete));
        assert_eq!(ctx.migration.as_ref().map(|r| r.migrated), Some(1));

        let env = EnvFile::load(&temp.path().join(".env")).unwrap();
        assert_eq!(env.get("PORT"), Some("3000"));
        assert_eq!(env.get("API_KEY"), None);
        assert_eq!(env.get("VAULT_ADDR"), Some(server.base_url().as_str()));
        assert_eq!(env.get("VAULT_MODE"), Some("ephemeral"));

        let config = ModeConfig::load(temp.path()).unwrap().unwrap();
        assert_eq!(config.mode, VaultMode::Ephemeral);
        assert_eq!(ui.progress().len(), 13);
        assert!(ui.has_success("Vault setup complete"));
    }

    #[test]
    fn declining_consent_cancels_without_changes() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "API_KEY=abc\n").unwrap();
        let server = MockServer::start();

        let (options, ctx) = options(temp.path(), &server);
        let mut ui = MockUI::new();
        ui.set_prompt_response("consent", "no");

        let outcome = Wizard::new(options, &mut ui).run(ctx).unwrap();

        assert!(matches!(outcome, WizardOutcome::Cancelled { at: Step::Welcome }));
        assert_eq!(ui.prompts_shown(), &["mode", "consent"]);
        assert_eq!(
            fs::read_to_string(temp.path().join(".env")).unwrap(),
            "API_KEY=abc\n"
        );
        assert!(!ModeConfig::path_in(temp.path()).exists());
    }

    #[test]
    fn empty_store_listing_is_a_warning() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "API_KEY=abc\nPORT=1\n").unwrap();
        let server = MockServer::start();
        mock_ready_dev_server(&server);
        server.mock(|when, then| {
            when.method(POST).path("/v1/secret/data/myapp/API_KEY");
            then.status(200).json_body(json!({}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1/secret/metadata/myapp");
            then.status(404);
        });

        let (mut options, ctx) = options(temp.path(), &server);
        options.mode = Some(VaultMode::Ephemeral);
        let mut ui = MockUI::new();

        let outcome = Wizard::new(options, &mut ui).run(ctx).unwrap();

        assert!(matches!(outcome, WizardOutcome::Completed(_)));
        assert!(ui.has_warning("No secrets found"));
    }

    #[test]
    fn missing_env_and_template_skips_migration() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        mock_ready_dev_server(&server);

        let (mut options, ctx) = options(temp.path(), &server);
        options.mode = Some(VaultMode::Ephemeral);
        let mut ui = MockUI::new();

        let outcome = Wizard::new(options, &mut ui).run(ctx).unwrap();

        assert!(matches!(outcome, WizardOutcome::Completed(_)));
        assert!(ui.has_warning("Skipping secret migration"));
        // The completion step still records the address.
        let env = EnvFile::load(&temp.path().join(".env")).unwrap();
        assert_eq!(env.get("VAULT_MODE"), Some("ephemeral"));
    }

    #[test]
    fn template_is_copied_when_env_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env.example"), "PORT=3000\n").unwrap();
        let server = MockServer::start();
        mock_ready_dev_server(&server);
        server.mock(|when, then| {
            when.method(GET).path("/v1/secret/metadata/myapp");
            then.status(404);
        });

        let (mut options, ctx) = options(temp.path(), &server);
        options.mode = Some(VaultMode::Ephemeral);
        let mut ui = MockUI::new();

        Wizard::new(options, &mut ui).run(ctx).unwrap();

        assert!(ui.has_success("Created .env from .env.example"));
        let env = EnvFile::load(&temp.path().join(".env")).unwrap();
        assert_eq!(env.get("PORT"), Some("3000"));
        assert!(temp.path().join(".env.example").exists());
    }

    #[test]
    fn unreachable_vault_fails_start_services() {
        let temp = TempDir::new().unwrap();
        let mut options = WizardOptions::new(temp.path());
        options.skip_services = true;
        options.use_gh_cli = false;
        options.mode = Some(VaultMode::Ephemeral);
        options.retry = RetryPolicy::new(2, Duration::ZERO);
        options.http_timeout = Duration::from_secs(2);
        let ctx = WizardContext::new(Some("http://127.0.0.1:9".into()), None, None);
        let mut ui = MockUI::new();

        let err = Wizard::new(options, &mut ui).run(ctx).unwrap_err();

        assert!(matches!(err, OnboardError::Connectivity { .. }));
        assert!(ui.has_error("start_services"));
    }

    #[test]
    fn failed_compose_start_is_command_failed() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        let (mut options, ctx) = options(temp.path(), &server);
        options.skip_services = false;
        options.mode = Some(VaultMode::Ephemeral);
        let started = Rc::new(RefCell::new(Vec::new()));
        let mut ui = MockUI::new();

        let err = Wizard::new(options, &mut ui)
            .with_services(Box::new(FakeServices {
                started: Rc::clone(&started),
                exit_code: 1,
            }))
            .run(ctx)
            .unwrap_err();

        assert!(matches!(err, OnboardError::CommandFailed { code: Some(1), .. }));
        assert_eq!(started.borrow().as_slice(), ["vault-dev"]);
        assert!(ui.has_error("pull access denied"));
    }

    #[test]
    fn verbose_start_echoes_compose_output() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        mock_ready_dev_server(&server);
        let (mut options, ctx) = options(temp.path(), &server);
        options.skip_services = false;
        let fake = || FakeServices {
            started: Rc::new(RefCell::new(Vec::new())),
            exit_code: 0,
        };

        let mut normal = MockUI::new();
        Wizard::new(options.clone(), &mut normal)
            .with_services(Box::new(fake()))
            .run_step(Step::StartServices, ctx.clone())
            .unwrap();
        assert!(!normal.printed("Container vault-dev Started"));

        let mut verbose = MockUI::with_mode(OutputMode::Verbose);
        Wizard::new(options, &mut verbose)
            .with_services(Box::new(fake()))
            .run_step(Step::StartServices, ctx)
            .unwrap();
        assert!(verbose.has_message("Container vault-dev Started"));
    }

    #[test]
    fn invalid_address_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut options = WizardOptions::new(temp.path());
        options.skip_services = true;
        options.use_gh_cli = false;
        options.mode = Some(VaultMode::Ephemeral);
        let ctx = WizardContext::new(Some("vault:8200".into()), None, None);
        let mut ui = MockUI::new();

        let err = Wizard::new(options, &mut ui).run(ctx).unwrap_err();

        assert!(matches!(err, OnboardError::Connectivity { .. }));
    }

    #[test]
    fn persistent_init_saves_keys_and_unseals() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/v1/sys/health");
            then.status(501)
                .json_body(json!({"initialized": false, "sealed": true}));
        });

        let (mut options, ctx) = options(temp.path(), &server);
        options.mode = Some(VaultMode::Persistent);
        options.auto_unseal = Some(true);
        let key_path = options.unseal_key_path();

        server.mock(|when, then| {
            when.method(PUT).path("/v1/sys/init");
            then.status(200).json_body(json!({
                "keys": ["unseal-key-1"],
                "keys_base64": ["a2V5"],
                "root_token": "s.root"
            }));
        });
        let unseal = server.mock(|when, then| {
            when.method(PUT)
                .path("/v1/sys/unseal")
                .json_body(json!({"key": "unseal-key-1"}));
            then.status(200)
                .json_body(json!({"sealed": false, "t": 1, "progress": 0}));
        });

        let mut ui = MockUI::new();
        let mut wizard = Wizard::new(options, &mut ui);
        let mut ctx = ctx;
        for step in [
            Step::SelectMode,
            Step::AutoUnseal,
            Step::ConfigureAddress,
            Step::Initialize,
        ] {
            ctx = match wizard.run_step(step, ctx).unwrap() {
                Transition::Continue(next) => next,
                Transition::Cancel => panic!("unexpected cancel"),
            };
        }

        assert!(ctx.auto_unseal);
        unseal.assert();
        assert_eq!(ctx.vault_token.as_deref(), Some("s.root"));
        assert_eq!(
            UnsealKeys::load(&key_path).unwrap().keys,
            vec!["unseal-key-1".to_string()]
        );
    }

    #[test]
    fn persistent_without_token_is_auth_error() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        let (mut options, ctx) = options(temp.path(), &server);
        options.mode = Some(VaultMode::Persistent);
        let mut ui = MockUI::new();
        let mut wizard = Wizard::new(options, &mut ui);

        let mut ctx = ctx;
        ctx.vault_mode = VaultMode::Persistent;
        let err = wizard.run_step(Step::Authenticate, ctx).unwrap_err();

        assert!(matches!(err, OnboardError::Auth { .. }));
    }

    #[test]
    fn persistent_github_login_provides_token() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1/auth/github/login")
                .json_body(json!({"token": "ghp_example"}));
            then.status(200)
                .json_body(json!({"auth": {"client_token": "s.github"}}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/auth/token/lookup-self")
                .header("x-vault-token", "s.github");
            then.status(200)
                .json_body(json!({"data": {"display_name": "github-octocat"}}));
        });

        let (options, _) = options(temp.path(), &server);
        let mut ctx = WizardContext::new(Some(server.base_url()), None, Some("ghp_example".into()));
        ctx.vault_mode = VaultMode::Persistent;
        let mut ui = MockUI::new();
        let mut wizard = Wizard::new(options, &mut ui);

        let ctx = match wizard.run_step(Step::Authenticate, ctx).unwrap() {
            Transition::Continue(next) => next,
            Transition::Cancel => panic!("unexpected cancel"),
        };
        drop(wizard);

        assert_eq!(ctx.vault_token.as_deref(), Some("s.github"));
        assert!(ui.has_success("github-octocat"));
    }
}
