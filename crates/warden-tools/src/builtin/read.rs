//! Read file tool: reads file contents with optional offset/limit.

use super::{params_schema, truncate_utf8, MAX_OUTPUT_BYTES};
use crate::error::ToolError;
use crate::path_guard::checked_path;
use crate::traits::{Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: usize = 2000;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadParams {
    /// File path to read (relative to working directory).
    pub path: String,
    /// Line offset (0-indexed). Default: 0.
    #[serde(default)]
    pub offset: Option<usize>,
    /// Maximum number of lines to return. Default: 2000.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

pub struct ReadTool;

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "read"
    }
    fn label(&self) -> &str {
        "Read File"
    }
    fn description(&self) -> &str {
        "Read the contents of a file. Supports line offset and limit."
    }
    fn parameters_schema(&self) -> serde_json::Value {
        params_schema::<ReadParams>()
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: ReadParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let path = checked_path(ctx, &params.path)?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::from_io("read", &params.path, e))?;

        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit;

        if offset >= total_lines {
            return Ok(ToolResult::success_with_metadata(
                format!("(empty: offset {offset} exceeds {total_lines} total lines)"),
                serde_json::json!({"total_lines": total_lines}),
            ));
        }

        let end = offset.saturating_add(limit).min(total_lines);
        let mut selected: String = lines[offset..end]
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>4} | {}", offset + i + 1, line))
            .collect::<Vec<_>>()
            .join("\n");

        let output = if truncate_utf8(&mut selected, MAX_OUTPUT_BYTES) {
            format!("{selected}\n\n... (truncated at 50KB, showing {end}/{total_lines} lines)")
        } else if end < total_lines {
            format!("{selected}\n\n({end}/{total_lines} lines shown, use offset to see more)")
        } else {
            selected
        };

        Ok(ToolResult::success_with_metadata(
            output,
            serde_json::json!({
                "total_lines": total_lines,
                "offset": offset,
                "lines_shown": end - offset,
            }),
        ))
    }
}
