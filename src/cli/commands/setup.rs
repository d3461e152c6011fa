//! Setup command implementation.
//!
//! The `vault-onboard setup` command runs the setup wizard.

use std::path::{Path, PathBuf};

use crate::cli::args::SetupArgs;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::wizard::{Wizard, WizardContext, WizardOptions, WizardOutcome};

use super::dispatcher::{Command, CommandResult};
use super::display;

/// The setup command implementation.
pub struct SetupCommand {
    project_root: PathBuf,
    args: SetupArgs,
}

impl SetupCommand {
    /// Create a new setup command.
    pub fn new(project_root: &Path, args: SetupArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Wizard options from the command-line flags.
    pub fn options(&self) -> WizardOptions {
        let args = &self.args;
        let mut options = WizardOptions::new(&self.project_root);
        options.env_file = args.source.env_file.clone();
        options.env_template = args.env_template.clone();
        options.patterns = args.source.patterns.clone();
        options.base_path = display::base_path(&self.project_root, &args.store);
        options.mount = args.store.mount.clone();
        options.mode = args.mode;
        options.auto_unseal = args.auto_unseal.then_some(true);
        options.skip_services = args.skip_services;
        options.compose_file = args.compose_file.clone();
        options.service = args.service.clone();
        options.use_gh_cli = !args.no_gh;
        options
    }

    /// Initial wizard context from the command-line flags.
    pub fn context(&self) -> WizardContext {
        WizardContext::new(
            self.args.store.vault_addr.clone(),
            self.args.store.vault_token.clone(),
            self.args.github_token.clone(),
        )
    }
}

impl Command for SetupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match Wizard::new(self.options(), ui).run(self.context())? {
            WizardOutcome::Completed(ctx) => {
                tracing::info!("setup finished in {} mode", ctx.vault_mode);
            }
            WizardOutcome::Cancelled { at } => {
                tracing::info!("setup cancelled at {}", at);
            }
        }
        Ok(CommandResult::success())
    }
}
