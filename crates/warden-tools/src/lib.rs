//! warden-tools: Built-in tools (read, list, write, edit, delete, bash) and
//! the path and command safety checks that gate them.

pub mod builtin;
pub mod command_guard;
mod error;
pub mod path_guard;
pub mod registry;
pub mod traits;

pub use builtin::register_all;
pub use command_guard::{check_command, is_allowlisted, CommandVerdict};
pub use error::ToolError;
pub use path_guard::{check_path, PathVerdict};
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolContext, ToolResult};
