//! Tool registry for managing available tools.

use crate::traits::{Tool, ToolContext, ToolResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available tools.
///
/// Stores tools by name and provides lookup functionality.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all registered tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get all registered tools, sorted by name.
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = self.tools.values().cloned().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    /// Run a tool by name. Failures come back as error results, never as `Err`.
    pub async fn invoke(
        &self,
        name: &str,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> ToolResult {
        let Some(tool) = self.get(name) else {
            return ToolResult::error(format!("Unknown tool: {name}"));
        };
        tracing::debug!(tool = name, session = %ctx.session_id, "Invoking tool");
        match tool.execute(args, ctx).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(tool = name, error = %e, "Tool failed");
                ToolResult::error(e.to_string())
            }
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate tool definitions for the provider API.
    pub fn tool_definitions(&self) -> Vec<serde_json::Value> {
        self.all()
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use async_trait::async_trait;

    struct MockTool;

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            "mock"
        }
        fn label(&self) -> &str {
            "Mock Tool"
        }
        fn description(&self) -> &str {
            "A mock tool for testing"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {},
            })
        }
        async fn execute(
            &self,
            args: serde_json::Value,
            _ctx: &ToolContext,
        ) -> Result<ToolResult, ToolError> {
            if args["fail"].as_bool().unwrap_or(false) {
                return Err(ToolError::NotFound("Failed to read 'x': missing".to_string()));
            }
            Ok(ToolResult::success("mock output"))
        }
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool));

        assert!(registry.has("mock"));
        assert!(!registry.has("nonexistent"));
        assert_eq!(registry.len(), 1);

        let tool = registry.get("mock").unwrap();
        assert_eq!(tool.name(), "mock");
    }

    #[test]
    fn test_registry_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool));

        let names = registry.names();
        assert_eq!(names, vec!["mock"]);
    }

    #[test]
    fn test_registry_tool_definitions() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool));

        let defs = registry.tool_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0]["name"], "mock");
        assert_eq!(defs[0]["description"], "A mock tool for testing");
    }

    #[test]
    fn test_registry_empty() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_invoke_converts_errors_to_results() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool));
        let ctx = ToolContext::default();

        let ok = registry.invoke("mock", serde_json::json!({}), &ctx).await;
        assert!(!ok.is_error);

        let failed = registry
            .invoke("mock", serde_json::json!({"fail": true}), &ctx)
            .await;
        assert!(failed.is_error);
        assert!(failed.output.starts_with("Not found:"));

        let unknown = registry.invoke("nope", serde_json::json!({}), &ctx).await;
        assert!(unknown.is_error);
        assert_eq!(unknown.output, "Unknown tool: nope");
    }
}
