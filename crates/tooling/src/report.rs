use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

/// Writes the agent's final report to disk under a fixed directory.
pub struct SaveReportTool {
    report_dir: PathBuf,
}

impl SaveReportTool {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    fn resolve_path(&self, filename: &str) -> Result<PathBuf, ToolError> {
        // Only bare file names are accepted, so the model cannot write
        // outside the report directory.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| {
                ToolError::new(
                    self.name().to_string(),
                    format!("Invalid filename '{}'", filename),
                    false,
                )
            })?;

        Ok(self.report_dir.join(name))
    }
}

#[async_trait]
impl Tool for SaveReportTool {
    fn name(&self) -> &str {
        "save_report"
    }

    fn description(&self) -> &str {
        "Saves the final report text to a file with the given filename."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Name of the file to write, e.g. report.md"
                },
                "content": {
                    "type": "string",
                    "description": "The full report text"
                }
            },
            "required": ["filename", "content"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        let filename: String = input
            .get_argument("filename")
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;
        let content: String = input
            .get_argument("content")
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;

        let path = self.resolve_path(&filename)?;

        tokio::fs::create_dir_all(&self.report_dir)
            .await
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;

        info!(path = %path.display(), "report saved");

        ToolOutput::success(json!({
            "result": format!("Successfully saved to {}.", path.display())
        }))
        .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))
    }
}
