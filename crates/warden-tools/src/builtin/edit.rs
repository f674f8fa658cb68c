//! Edit file tool: surgical string replacement in files.

use super::params_schema;
use crate::error::ToolError;
use crate::path_guard::checked_path;
use crate::traits::{Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use warden_core::{ActionKind, ApprovalRequest};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EditParams {
    /// File path to edit (relative to working directory).
    pub path: String,
    /// The exact string to find in the file.
    pub old_string: String,
    /// The string to replace it with.
    pub new_string: String,
    /// If true, replace ALL occurrences. Default: false.
    #[serde(default)]
    pub replace_all: bool,
}

pub struct EditTool;

#[async_trait]
impl Tool for EditTool {
    fn name(&self) -> &str {
        "edit"
    }
    fn label(&self) -> &str {
        "Edit File"
    }
    fn description(&self) -> &str {
        "Edit a file by replacing an exact string match. Fails if the string is not found \
         or appears multiple times without replace_all=true."
    }
    fn parameters_schema(&self) -> serde_json::Value {
        params_schema::<EditParams>()
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: EditParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
        if params.old_string.is_empty() {
            return Err(ToolError::InvalidParameters(
                "old_string must not be empty".to_string(),
            ));
        }

        let path = checked_path(ctx, &params.path)?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::from_io("read", &params.path, e))?;

        let count = content.matches(&params.old_string).count();

        if count == 0 {
            return Err(ToolError::ExecutionError(format!(
                "old_string not found in {}",
                params.path
            )));
        }

        if count > 1 && !params.replace_all {
            return Err(ToolError::ExecutionError(format!(
                "old_string found {count} times. Use replace_all=true to replace all occurrences."
            )));
        }

        let replaced = if params.replace_all { count } else { 1 };
        let request = ApprovalRequest::new(
            self.name(),
            format!("Replace {replaced} occurrence(s) in {}", params.path),
        );
        if !ctx.approve(ActionKind::Edit, request).await {
            return Ok(ToolResult::cancelled());
        }

        let new_content = if params.replace_all {
            content.replace(&params.old_string, &params.new_string)
        } else {
            content.replacen(&params.old_string, &params.new_string, 1)
        };

        tokio::fs::write(&path, &new_content)
            .await
            .map_err(|e| ToolError::from_io("write", &params.path, e))?;

        Ok(ToolResult::success_with_metadata(
            format!("Replaced {replaced} occurrence(s) in {}", params.path),
            serde_json::json!({"replacements": replaced}),
        ))
    }
}
