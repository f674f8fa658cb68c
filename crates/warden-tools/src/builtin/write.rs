//! Write file tool: creates or overwrites files.

use super::params_schema;
use crate::error::ToolError;
use crate::path_guard::checked_path;
use crate::traits::{Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use warden_core::{ActionKind, ApprovalRequest};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteParams {
    /// File path to write (relative to working directory).
    pub path: String,
    /// Content to write to the file.
    pub content: String,
}

pub struct WriteTool;

#[async_trait]
impl Tool for WriteTool {
    fn name(&self) -> &str {
        "write"
    }
    fn label(&self) -> &str {
        "Write File"
    }
    fn description(&self) -> &str {
        "Create or overwrite a file with the given content. Creates parent directories if needed."
    }
    fn parameters_schema(&self) -> serde_json::Value {
        params_schema::<WriteParams>()
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: WriteParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let path = checked_path(ctx, &params.path)?;

        let bytes = params.content.len();
        let verb = if path.exists() { "Overwrite" } else { "Create" };
        let request = ApprovalRequest::new(
            self.name(),
            format!("{verb} {} ({bytes} bytes)", params.path),
        );
        if !ctx.approve(ActionKind::Edit, request).await {
            return Ok(ToolResult::cancelled());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::from_io("create directories for", &params.path, e))?;
        }

        tokio::fs::write(&path, &params.content)
            .await
            .map_err(|e| ToolError::from_io("write", &params.path, e))?;

        let lines = params.content.lines().count();
        Ok(ToolResult::success_with_metadata(
            format!("Wrote {} bytes ({} lines) to {}", bytes, lines, params.path),
            serde_json::json!({"bytes": bytes, "lines": lines}),
        ))
    }
}
