//! Built-in tool implementations.

pub mod bash;
pub mod delete;
pub mod edit;
pub mod list;
pub mod read;
pub mod write;

use crate::ToolRegistry;
use schemars::JsonSchema;
use std::sync::Arc;

pub(crate) const MAX_OUTPUT_BYTES: usize = 50 * 1024; // 50KB

/// Register all built-in tools into a registry.
pub fn register_all(registry: &mut ToolRegistry) {
    registry.register(Arc::new(read::ReadTool));
    registry.register(Arc::new(list::ListTool));
    registry.register(Arc::new(write::WriteTool));
    registry.register(Arc::new(edit::EditTool));
    registry.register(Arc::new(delete::DeleteTool));
    registry.register(Arc::new(bash::BashTool));
}

pub(crate) fn params_schema<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize parameter schema");
        serde_json::Value::Null
    })
}

/// Cut `text` to at most `max` bytes on a char boundary. Returns whether it was cut.
pub(crate) fn truncate_utf8(text: &mut String, max: usize) -> bool {
    if text.len() <= max {
        return false;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    true
}
