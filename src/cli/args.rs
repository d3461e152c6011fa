//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::VaultMode;

/// vault-onboard - Move a project's secrets from .env into a local Vault.
#[derive(Debug, Parser)]
#[command(name = "vault-onboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the setup wizard (default if no command specified)
    Setup(SetupArgs),

    /// Move secrets from an env file into Vault
    Migrate(MigrateArgs),

    /// Check that no secrets remain in an env file
    Validate(ValidateArgs),

    /// List the secrets an env file contains, without changing anything
    Scan(ScanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Which env file to read and how to classify it.
#[derive(Debug, Clone, clap::Args)]
pub struct SourceArgs {
    /// Env file, relative to the project root
    #[arg(long, default_value = ".env", value_name = "FILE")]
    pub env_file: PathBuf,

    /// Secret pattern file (JSON). Defaults to .vault/secret-patterns.json when present
    #[arg(long, value_name = "FILE")]
    pub patterns: Option<PathBuf>,
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            patterns: None,
        }
    }
}

/// Where secrets go in Vault.
#[derive(Debug, Clone, clap::Args)]
pub struct StoreArgs {
    /// Vault address
    #[arg(long, env = "VAULT_ADDR", value_name = "URL")]
    pub vault_addr: Option<String>,

    /// Vault token
    #[arg(long, env = "VAULT_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub vault_token: Option<String>,

    /// KV v2 mount
    #[arg(long, default_value = "secret")]
    pub mount: String,

    /// Path under the mount (defaults to the project directory name)
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,
}

impl Default for StoreArgs {
    fn default() -> Self {
        Self {
            vault_addr: None,
            vault_token: None,
            mount: "secret".to_string(),
            path: None,
        }
    }
}

/// Arguments for the `setup` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SetupArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Template copied to the env file when it is missing
    #[arg(long, default_value = ".env.example", value_name = "FILE")]
    pub env_template: PathBuf,

    /// GitHub token used for Vault's GitHub auth method
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Vault mode: ephemeral or persistent
    #[arg(long, value_name = "MODE")]
    pub mode: Option<VaultMode>,

    /// Save unseal keys locally and unseal automatically (persistent mode)
    #[arg(long)]
    pub auto_unseal: bool,

    /// Use defaults, no prompts
    #[arg(long)]
    pub non_interactive: bool,

    /// Do not check for or start containers
    #[arg(long)]
    pub skip_services: bool,

    /// Compose file that defines the Vault services
    #[arg(long, default_value = "docker-compose.yml", value_name = "FILE")]
    pub compose_file: PathBuf,

    /// Compose service to start (defaults to vault-dev or vault by mode)
    #[arg(long)]
    pub service: Option<String>,

    /// Do not ask the GitHub CLI for a token
    #[arg(long)]
    pub no_gh: bool,
}

impl Default for SetupArgs {
    fn default() -> Self {
        Self {
            source: SourceArgs::default(),
            store: StoreArgs::default(),
            env_template: PathBuf::from(".env.example"),
            github_token: None,
            mode: None,
            auto_unseal: false,
            non_interactive: false,
            skip_services: false,
            compose_file: PathBuf::from("docker-compose.yml"),
            service: None,
            no_gh: false,
        }
    }
}

/// Arguments for the `migrate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Show what would move without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not add the backup pattern to .gitignore
    #[arg(long)]
    pub no_gitignore: bool,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Arguments for the `scan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_setup_flags() {
        let cli = Cli::try_parse_from([
            "vault-onboard",
            "setup",
            "--mode",
            "persistent",
            "--auto-unseal",
            "--non-interactive",
            "--path",
            "myapp",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Setup(args)) => {
                assert_eq!(args.mode, Some(VaultMode::Persistent));
                assert!(args.auto_unseal);
                assert!(args.non_interactive);
                assert_eq!(args.store.path.as_deref(), Some("myapp"));
                assert_eq!(args.source.env_file, PathBuf::from(".env"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = Cli::try_parse_from(["vault-onboard", "setup", "--mode", "cloud"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vault-onboard", "scan", "--quiet", "--project", "/tmp/x"])
            .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn migrate_dry_run() {
        let cli = Cli::try_parse_from(["vault-onboard", "migrate", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Migrate(ref a)) if a.dry_run));
    }
}
