//! List directory tool.

use super::params_schema;
use crate::error::ToolError;
use crate::path_guard::checked_path;
use crate::traits::{Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".".to_string()
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListParams {
    /// Directory to list (relative to working directory). Default: ".".
    #[serde(default = "default_path")]
    pub path: String,
}

pub struct ListTool;

#[async_trait]
impl Tool for ListTool {
    fn name(&self) -> &str {
        "list"
    }
    fn label(&self) -> &str {
        "List Directory"
    }
    fn description(&self) -> &str {
        "List the entries of a directory, sorted by name. Directories end with '/'."
    }
    fn parameters_schema(&self) -> serde_json::Value {
        params_schema::<ListParams>()
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: ListParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let path = checked_path(ctx, &params.path)?;

        let mut reader = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::from_io("list", &params.path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ToolError::from_io("list", &params.path, e))?
        {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                name.push('/');
            }
            entries.push(name);
        }
        entries.sort();

        let count = entries.len();
        let output = if entries.is_empty() {
            "(empty directory)".to_string()
        } else {
            entries.join("\n")
        };
        Ok(ToolResult::success_with_metadata(
            output,
            serde_json::json!({"entries": count}),
        ))
    }
}
