//! External command execution and tool lookup.

pub mod command;
pub mod platform;

pub use command::{execute, CommandResult};
pub use platform::{find_on_path, is_ci, is_executable, parse_system_path, resolve_tool_path};
