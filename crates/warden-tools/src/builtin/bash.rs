//! Bash tool: shell command execution.

use super::{params_schema, truncate_utf8, MAX_OUTPUT_BYTES};
use crate::command_guard::check_command;
use crate::error::ToolError;
use crate::path_guard::resolve_target;
use crate::traits::{Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use warden_core::{ActionKind, ApprovalRequest, Settings};
use warden_process::{run_shell_command, ProcessError};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BashParams {
    /// Shell command to execute.
    pub command: String,
    /// Optional timeout in seconds. Defaults to native_commands.default_timeout, then 120.
    #[serde(default)]
    pub timeout: Option<u64>,
}

pub struct BashTool;

impl BashTool {
    fn timeout(params: &BashParams, settings: &Settings, ctx: &ToolContext) -> Duration {
        if let Some(secs) = params.timeout.filter(|secs| *secs > 0) {
            return Duration::from_secs(secs);
        }
        match settings.native_commands.default_timeout {
            Some(secs) if secs > 0 => Duration::from_secs(secs.unsigned_abs()),
            _ => ctx.timeout,
        }
    }

    fn working_dir(settings: &Settings, ctx: &ToolContext) -> PathBuf {
        match &settings.native_commands.default_working_directory {
            Some(dir) => resolve_target(&dir.to_string_lossy(), &ctx.working_dir),
            None => ctx.working_dir.clone(),
        }
    }
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "bash"
    }
    fn label(&self) -> &str {
        "Bash"
    }
    fn description(&self) -> &str {
        "Execute a shell command and return stdout/stderr. Dangerous commands are refused; \
         risky or unlisted commands need confirmation."
    }
    fn parameters_schema(&self) -> serde_json::Value {
        params_schema::<BashParams>()
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: BashParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
        if params.command.trim().is_empty() {
            return Err(ToolError::InvalidParameters("command must not be empty".to_string()));
        }

        let settings = ctx.settings();
        let verdict = check_command(&params.command, &settings);
        if !verdict.is_safe {
            tracing::warn!(command = %params.command, reason = %verdict.reason, "Command rejected");
            return Err(ToolError::Blocked(verdict.reason));
        }

        let mut request = ApprovalRequest::new(self.name(), params.command.clone());
        if verdict.is_warning {
            tracing::warn!(command = %params.command, reason = %verdict.reason, "Risky command");
            request = request.with_warning(verdict.reason.clone());
        }
        let action = ActionKind::Command {
            is_warning: verdict.is_warning,
            allowlisted: verdict.allowlisted,
        };
        if !ctx.approve(action, request).await {
            return Ok(ToolResult::cancelled());
        }

        let timeout = Self::timeout(&params, &settings, ctx);
        let cwd = Self::working_dir(&settings, ctx);

        let output = run_shell_command(&params.command, &cwd, timeout)
            .await
            .map_err(|e| match e {
                ProcessError::Timeout(secs) => ToolError::Timeout(format!(
                    "Command '{}' timed out after {secs}s and was terminated",
                    params.command
                )),
                ProcessError::Spawn(io) => ToolError::from_io("run", &params.command, io),
            })?;

        let stdout = output.stdout_lossy();
        let stderr = output.stderr_lossy();
        let exit_code = output.exit_code;

        let mut text = String::new();
        if !stdout.is_empty() {
            text.push_str(&stdout);
        }
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("STDERR:\n");
            text.push_str(&stderr);
        }

        if truncate_utf8(&mut text, MAX_OUTPUT_BYTES) {
            text.push_str("\n\n... (truncated at 50KB)");
        }

        if text.is_empty() {
            text = "(no output)".to_string();
        }

        let is_error = !output.success;
        if is_error {
            text = format!("Exit code: {exit_code}\n{text}");
        }

        Ok(ToolResult {
            output: text,
            metadata: serde_json::json!({
                "exit_code": exit_code,
                "warning": verdict.is_warning.then_some(verdict.reason),
            }),
            is_error,
            cancelled: false,
        })
    }
}
