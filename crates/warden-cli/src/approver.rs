//! Interactive confirmation on the terminal.

use async_trait::async_trait;
use console::style;
use dialoguer::Confirm;
use warden_core::{ApprovalRequest, ApprovalResponse, Approver};

/// Asks on stderr/stdin. Any prompt failure (e.g. no TTY) counts as a denial.
pub struct TerminalApprover;

#[async_trait]
impl Approver for TerminalApprover {
    async fn confirm(&self, request: &ApprovalRequest) -> ApprovalResponse {
        let request = request.clone();
        match tokio::task::spawn_blocking(move || prompt(&request)).await {
            Ok(Ok(true)) => ApprovalResponse::Approve,
            Ok(Ok(false)) => ApprovalResponse::Deny,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Confirmation prompt failed; denying");
                ApprovalResponse::Deny
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation task failed; denying");
                ApprovalResponse::Deny
            }
        }
    }
}

fn prompt(request: &ApprovalRequest) -> dialoguer::Result<bool> {
    eprintln!(
        "{} {}",
        style(format!("[{}]", request.tool)).cyan().bold(),
        request.summary
    );
    if let Some(warning) = &request.warning {
        eprintln!("{} {}", style("warning:").yellow().bold(), warning);
    }
    Confirm::new()
        .with_prompt("Proceed?")
        .default(false)
        .interact()
}
