//! CLI argument and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use warden_core::{CliOverrides, ConfigStore};

#[derive(Parser)]
#[command(
    name = "warden",
    version,
    about = "Security-gated file and shell tools with layered configuration"
)]
pub struct Cli {
    /// Path to the YAML config file.
    #[arg(long, env = "WARDEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// LLM provider override.
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model override.
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Apply file writes, edits and deletes without asking.
    #[arg(long, global = true)]
    pub auto_approve_edits: bool,

    /// Run shell commands without asking. Dangerous commands stay blocked.
    #[arg(long, global = true)]
    pub auto_approve_commands: bool,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Overrides for the top configuration layer. Unset flags do not override.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            auto_approve_edits: self.auto_approve_edits.then_some(true),
            auto_approve_native_commands: self.auto_approve_commands.then_some(true),
            ..Default::default()
        }
    }

    pub fn config_store(&self) -> ConfigStore {
        match &self.config {
            Some(path) => ConfigStore::with_path(path),
            None => ConfigStore::new(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and manage the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List tools, or show one tool's parameters.
    Tools {
        /// Tool to describe.
        name: Option<String>,
        /// Print every tool definition as JSON.
        #[arg(long, conflicts_with = "name")]
        json: bool,
    },

    /// Invoke a tool through the safety checks and confirmation prompt.
    Run {
        /// Tool name.
        tool: String,
        /// Tool arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Record the call and its result in this session.
        #[arg(long)]
        session: Option<String>,
    },

    /// Manage sessions.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check the effective configuration; exits non-zero on errors.
    Validate,
    /// Print the effective configuration with API keys masked.
    Show,
    /// Overwrite the config file with the default template.
    Reset {
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Print the config file path.
    Path,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a new session for the current directory.
    New,
    /// List recent sessions.
    List {
        /// Maximum number of sessions to show.
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Search a session's memory by keyword.
    Search {
        /// Session ID.
        id: String,
        /// Keywords to look for.
        query: String,
        /// Maximum number of hits.
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
}
