pub mod registry;
pub mod report;
pub mod tool;
pub mod weather;
pub mod web_search;
pub mod webpage;

pub use registry::{BoxedTool, ToolRegistry};
pub use report::SaveReportTool;
pub use tool::{Tool, ToolError, ToolInput, ToolOutput};
pub use weather::WeatherTool;
pub use web_search::WebSearchTool;
pub use webpage::ReadWebpageTool;
