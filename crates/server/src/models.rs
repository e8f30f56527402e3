use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub show_sources: bool,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceSnippet>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceSnippet {
    pub content: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub initialized: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    /// Base64-encoded PNG, with or without a data-URL prefix.
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub digit: usize,
    pub probabilities: Vec<f32>,
}
