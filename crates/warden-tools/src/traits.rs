//! Tool trait definition and common types.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use warden_core::{
    requires_confirmation, ActionKind, ApprovalRequest, Approver, AutoApprover, Settings,
    SettingsHandle,
};

/// Context provided to tools during execution.
#[derive(Clone)]
pub struct ToolContext {
    /// Workspace root. Paths are checked against it and resolved from it.
    pub working_dir: PathBuf,
    /// Active session ID.
    pub session_id: String,
    /// Fallback command timeout.
    pub timeout: Duration,
    /// Live effective settings.
    pub settings: Arc<SettingsHandle>,
    /// Answers confirmation prompts.
    pub approver: Arc<dyn Approver>,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_default(),
            session_id: String::new(),
            timeout: Duration::from_secs(120),
            settings: Arc::new(SettingsHandle::default()),
            approver: Arc::new(AutoApprover::deny_all()),
        }
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("working_dir", &self.working_dir)
            .field("session_id", &self.session_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ToolContext {
    /// Settings snapshot for this invocation.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.get()
    }

    /// Ask for confirmation when the settings require it.
    ///
    /// Returns `true` when the action may proceed.
    pub async fn approve(&self, action: ActionKind, request: ApprovalRequest) -> bool {
        if !requires_confirmation(&self.settings(), action) {
            return true;
        }
        let approved = self.approver.confirm(&request).await.is_approved();
        if !approved {
            tracing::info!(tool = %request.tool, summary = %request.summary, "Declined by user");
        }
        approved
    }
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Output text.
    pub output: String,
    /// Optional metadata (e.g., line count, file size).
    pub metadata: serde_json::Value,
    /// Whether the result represents an error.
    pub is_error: bool,
    /// Whether the user declined the action. Not an error.
    #[serde(default)]
    pub cancelled: bool,
}

impl ToolResult {
    /// Create a successful tool result.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            metadata: serde_json::Value::Null,
            is_error: false,
            cancelled: false,
        }
    }

    /// Create a successful result with metadata.
    pub fn success_with_metadata(output: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            output: output.into(),
            metadata,
            is_error: false,
            cancelled: false,
        }
    }

    /// Create an error tool result.
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            metadata: serde_json::Value::Null,
            is_error: true,
            cancelled: false,
        }
    }

    /// The user declined the confirmation prompt.
    pub fn cancelled() -> Self {
        Self {
            output: "Operation cancelled by user".to_string(),
            metadata: serde_json::Value::Null,
            is_error: false,
            cancelled: true,
        }
    }
}

/// Trait that all tools must implement.
///
/// Tools are how the agent touches the environment (file system and shell).
/// State-changing tools run their safety check and confirmation before any I/O.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Machine-readable tool name (e.g., "read").
    fn name(&self) -> &str;

    /// Human-readable label (e.g., "Read File").
    fn label(&self) -> &str;

    /// Description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError>;
}

// Compile-time check: Tool must be object-safe
const _: () = {
    fn _assert_object_safe(_: &dyn Tool) {}
};
