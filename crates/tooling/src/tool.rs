use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInput {
    pub name: String,
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolInput {
    pub fn new(name: String) -> Self {
        Self {
            name,
            arguments: HashMap::new(),
        }
    }

    /// Builds an input from the argument object a model sends with a
    /// function call. Non-object argument payloads yield an empty map.
    pub fn from_call(name: &str, args: &serde_json::Value) -> Self {
        let arguments = match args.as_object() {
            Some(map) => map.clone().into_iter().collect(),
            None => HashMap::new(),
        };
        Self {
            name: name.to_string(),
            arguments,
        }
    }

    pub fn with_argument<T: Serialize>(mut self, key: &str, value: T) -> Result<Self> {
        let json_value = serde_json::to_value(value)?;
        self.arguments.insert(key.to_string(), json_value);
        Ok(self)
    }

    pub fn get_argument<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .arguments
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("Argument '{}' not found", key))?;

        let result: T = serde_json::from_value(value.clone())?;
        Ok(result)
    }

    pub fn get_optional_argument<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.arguments
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    pub result: serde_json::Value,
    pub error_message: Option<String>,
}

impl ToolOutput {
    pub fn success<T: Serialize>(result: T) -> Result<Self> {
        Ok(Self {
            success: true,
            result: serde_json::to_value(result)?,
            error_message: None,
        })
    }

    pub fn error(error_message: String) -> Self {
        Self {
            success: false,
            result: serde_json::Value::Null,
            error_message: Some(error_message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    pub tool_name: String,
    pub message: String,
    pub recoverable: bool,
}

impl ToolError {
    pub fn new(tool_name: String, message: String, recoverable: bool) -> Self {
        Self {
            tool_name,
            message,
            recoverable,
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tool '{}' error: {}", self.tool_name, self.message)
    }
}

impl std::error::Error for ToolError {}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> serde_json::Value;

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError>;

    fn validate_input(&self, input: &ToolInput) -> Result<(), ToolError> {
        if input.name != self.name() {
            return Err(ToolError::new(
                self.name().to_string(),
                format!("Expected tool '{}', got '{}'", self.name(), input.name),
                false,
            ));
        }
        Ok(())
    }
}
