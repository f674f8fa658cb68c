//! Confirmation policy for state-changing tool actions.

use crate::config::Settings;
use async_trait::async_trait;

/// What a tool is about to do, as far as confirmation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Reads and listings. Never confirmed.
    Read,
    /// Writes, edits and deletes.
    Edit,
    /// Shell command, with the command checker's verdict flags.
    Command { is_warning: bool, allowlisted: bool },
}

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalResponse {
    Approve,
    Deny,
}

impl ApprovalResponse {
    pub fn is_approved(self) -> bool {
        self == Self::Approve
    }
}

/// Shown to whoever confirms the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    /// Tool asking for confirmation.
    pub tool: String,
    /// One-line description, e.g. the command or the target path.
    pub summary: String,
    /// Set when the command checker flagged the action as risky.
    pub warning: Option<String>,
}

impl ApprovalRequest {
    pub fn new(tool: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            summary: summary.into(),
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// Asks the user to approve an action.
#[async_trait]
pub trait Approver: Send + Sync {
    async fn confirm(&self, request: &ApprovalRequest) -> ApprovalResponse;
}

/// Answers every request the same way. Used for non-interactive runs.
#[derive(Debug, Clone, Copy)]
pub struct AutoApprover(ApprovalResponse);

impl AutoApprover {
    pub fn approve_all() -> Self {
        Self(ApprovalResponse::Approve)
    }

    pub fn deny_all() -> Self {
        Self(ApprovalResponse::Deny)
    }
}

#[async_trait]
impl Approver for AutoApprover {
    async fn confirm(&self, request: &ApprovalRequest) -> ApprovalResponse {
        tracing::debug!(tool = %request.tool, response = ?self.0, "Auto-answered confirmation");
        self.0
    }
}

/// Whether `action` must be confirmed before it runs under `settings`.
///
/// Commands need confirmation when flagged or not allow-listed; the
/// matching auto-approve flag skips the prompt in both cases.
pub fn requires_confirmation(settings: &Settings, action: ActionKind) -> bool {
    match action {
        ActionKind::Read => false,
        ActionKind::Edit => !settings.auto_approve_edits,
        ActionKind::Command {
            is_warning,
            allowlisted,
        } => (is_warning || !allowlisted) && !settings.auto_approve_native_commands,
    }
}
