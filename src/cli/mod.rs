//! Command-line interface for vault-onboard.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, MigrateArgs, ScanArgs, SetupArgs, SourceArgs, StoreArgs,
    ValidateArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
