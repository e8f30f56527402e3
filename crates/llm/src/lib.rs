pub mod gemini;
pub mod models;

pub use gemini::{GeminiClient, GeminiConfig};
pub use models::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateRequest,
    GenerateResponse, GenerationConfig, Part, ToolSpec,
};
