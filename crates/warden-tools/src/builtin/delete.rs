//! Delete file tool.

use super::params_schema;
use crate::error::ToolError;
use crate::path_guard::checked_path;
use crate::traits::{Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use warden_core::{ActionKind, ApprovalRequest};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteParams {
    /// File path to delete (relative to working directory). Directories are refused.
    pub path: String,
}

pub struct DeleteTool;

#[async_trait]
impl Tool for DeleteTool {
    fn name(&self) -> &str {
        "delete"
    }
    fn label(&self) -> &str {
        "Delete File"
    }
    fn description(&self) -> &str {
        "Delete a single file. Directories cannot be deleted with this tool."
    }
    fn parameters_schema(&self) -> serde_json::Value {
        params_schema::<DeleteParams>()
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: DeleteParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let path = checked_path(ctx, &params.path)?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::from_io("delete", &params.path, e))?;
        if metadata.is_dir() {
            return Err(ToolError::InvalidParameters(format!(
                "'{}' is a directory",
                params.path
            )));
        }

        let request = ApprovalRequest::new(self.name(), format!("Delete {}", params.path));
        if !ctx.approve(ActionKind::Edit, request).await {
            return Ok(ToolResult::cancelled());
        }

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| ToolError::from_io("delete", &params.path, e))?;

        Ok(ToolResult::success(format!("Deleted {}", params.path)))
    }
}
