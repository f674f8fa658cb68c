//! Security and native-command policy sections of the settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Toggles for the path and command safety checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Test file paths against the dangerous path patterns.
    pub path_validation: bool,
    /// Require every file path to resolve inside the workspace root.
    pub workspace_restriction: bool,
    /// Run the risky-pattern and allowlist checks on shell commands.
    ///
    /// Dangerous command patterns are blocked even when this is off.
    pub command_validation: bool,
    /// Replacement for the built-in risky command patterns. `None` keeps the built-ins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risky_command_patterns: Option<Vec<String>>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            path_validation: true,
            workspace_restriction: true,
            command_validation: true,
            risky_command_patterns: None,
        }
    }
}

/// Defaults applied to shell command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeCommandConfig {
    /// Timeout in seconds. Must be positive when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timeout: Option<i64>,
    /// Directory commands run in instead of the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_working_directory: Option<PathBuf>,
}
