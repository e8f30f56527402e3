use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

pub type BoxedTool = Box<dyn Tool>;

/// Holds every tool an agent may call, keyed by name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<BoxedTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: BoxedTool) -> Result<()> {
        let name = tool.name().to_string();

        if self.tools.contains_key(&name) {
            anyhow::bail!("Tool '{}' is already registered", name);
        }

        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<BoxedTool>> {
        self.tools.get(name).cloned()
    }

    pub fn list_tools(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Schemas for every registered tool, in the shape a function
    /// declaration expects.
    pub fn get_all_schemas(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters()
                })
            })
            .collect()
    }

    pub async fn execute_tool(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        let tool = self.get_tool(&input.name).ok_or_else(|| {
            ToolError::new(
                input.name.clone(),
                format!("Tool '{}' not found in registry", input.name),
                false,
            )
        })?;

        tool.execute(input).await
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
