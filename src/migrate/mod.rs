//! Secret migration.
//!
//! Reads an env file, moves every secret into the store and rewrites the
//! file with only the remaining entries. The original is kept as a
//! timestamped backup next to it.

pub mod backup;
pub mod pipeline;

pub use backup::{atomic_write, backup_glob, create_backup, register_in_ignore_file};
pub use pipeline::{migrate, render_filtered, MigrateOptions, MigrationReport, Migrator};
