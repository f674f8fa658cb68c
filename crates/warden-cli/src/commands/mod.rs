//! Subcommand implementations.

pub mod config;
pub mod run;
pub mod session;
pub mod tools;

use crate::cli::{Cli, Commands};
use warden_core::{build_effective_config, Settings};
use warden_tools::ToolRegistry;

/// Ends the process with `code` after printing `message` to stderr.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExitCodeError {
    pub code: i32,
    pub message: String,
}

impl ExitCodeError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Config { action } => config::run(cli, action).await,
        Commands::Tools { name, json } => tools::run(name.as_deref(), *json),
        Commands::Run {
            tool,
            args,
            session,
        } => run::run(cli, tool, args, session.as_deref()).await,
        Commands::Session { action } => session::run(cli, action).await,
    }
}

/// Effective settings for this invocation. A type violation in any layer
/// ends the process with exit code 2.
pub fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    build_effective_config(&cli.config_store(), &cli.overrides())
        .map_err(|e| ExitCodeError::new(2, e.to_string()).into())
}

pub fn builtin_registry() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    warden_tools::register_all(&mut tools);
    tools
}
