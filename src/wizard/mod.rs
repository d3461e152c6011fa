//! Guided setup of a local Vault.
//!
//! The wizard runs thirteen fixed steps: choose a mode, bring Vault up,
//! initialize and authenticate, then migrate and verify the project's env
//! file. State moves between steps in a [`WizardContext`].
//!
//! - [`context`] - options and the context record
//! - [`steps`] - the step list
//! - [`runner`] - step implementations
//! - [`services`] - starting Vault with Docker Compose
//! - [`unseal`] - unseal key storage

pub mod context;
pub mod runner;
pub mod services;
pub mod steps;
pub mod unseal;

pub use context::{
    default_base_path, WizardContext, WizardOptions, DEFAULT_DEV_ROOT_TOKEN, DEFAULT_VAULT_ADDR,
    UNSEAL_KEY_FILE,
};
pub use runner::{Wizard, WizardOutcome};
pub use services::{ComposeFlavor, DockerCompose, ServiceManager};
pub use steps::{Step, Transition};
pub use unseal::UnsealKeys;
