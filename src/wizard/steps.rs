//! The ordered list of wizard steps.

use std::fmt;

use super::context::WizardContext;

/// One wizard step. Steps run strictly in [`Step::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    SelectMode,
    AutoUnseal,
    Welcome,
    Prerequisites,
    ConfigureAddress,
    AuthSetup,
    StartServices,
    Initialize,
    Authenticate,
    TemplateInit,
    MigrateSecrets,
    Verify,
    Complete,
}

impl Step {
    /// Every step, in execution order.
    pub const ALL: [Step; 13] = [
        Step::SelectMode,
        Step::AutoUnseal,
        Step::Welcome,
        Step::Prerequisites,
        Step::ConfigureAddress,
        Step::AuthSetup,
        Step::StartServices,
        Step::Initialize,
        Step::Authenticate,
        Step::TemplateInit,
        Step::MigrateSecrets,
        Step::Verify,
        Step::Complete,
    ];

    /// Stable snake_case name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Step::SelectMode => "select_mode",
            Step::AutoUnseal => "auto_unseal",
            Step::Welcome => "welcome",
            Step::Prerequisites => "prerequisites",
            Step::ConfigureAddress => "configure_address",
            Step::AuthSetup => "auth_setup",
            Step::StartServices => "start_services",
            Step::Initialize => "initialize",
            Step::Authenticate => "authenticate",
            Step::TemplateInit => "template_init",
            Step::MigrateSecrets => "migrate_secrets",
            Step::Verify => "verify",
            Step::Complete => "complete",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Step::SelectMode => "Choose Vault mode",
            Step::AutoUnseal => "Auto-unseal",
            Step::Welcome => "Welcome",
            Step::Prerequisites => "Check prerequisites",
            Step::ConfigureAddress => "Configure Vault address",
            Step::AuthSetup => "Set up GitHub authentication",
            Step::StartServices => "Start Vault",
            Step::Initialize => "Initialize and unseal",
            Step::Authenticate => "Authenticate",
            Step::TemplateInit => "Prepare env file",
            Step::MigrateSecrets => "Migrate secrets",
            Step::Verify => "Verify",
            Step::Complete => "Complete",
        }
    }

    /// 1-based position in [`Step::ALL`].
    pub fn number(&self) -> usize {
        Step::ALL
            .iter()
            .position(|s| s == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a step hands back to the runner.
#[derive(Debug)]
pub enum Transition {
    /// Go on to the next step with the updated context.
    Continue(WizardContext),
    /// Stop without error.
    Cancel,
}
