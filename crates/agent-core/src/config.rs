use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Workspace-wide configuration, loaded from a single TOML file.
///
/// Every section has sensible development defaults so a missing section
/// does not prevent startup; `CONFIG_PATH` selects the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub digits: DigitsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.2,
        }
    }
}

impl LlmConfig {
    pub fn with_env_overrides(&self) -> Self {
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| self.model.clone());
        Self {
            model,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "fallback".to_string(),
            model: None,
            dimensions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    pub notes_dir: String,
    pub snapshot_dir: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            notes_dir: "./notes".to_string(),
            snapshot_dir: "./vectorstore".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
        }
    }
}

impl RagConfig {
    pub fn with_env_overrides(&self) -> Self {
        let notes_dir = env::var("NOTES_DIR").unwrap_or_else(|_| self.notes_dir.clone());
        let snapshot_dir = env::var("SNAPSHOT_DIR").unwrap_or_else(|_| self.snapshot_dir.clone());
        Self {
            notes_dir,
            snapshot_dir,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Pause before each web search, to stay under the search
    /// provider's rate limit.
    pub search_delay_secs: u64,
    pub fetch_delay_secs: u64,
    pub max_steps: usize,
    pub report_dir: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            search_delay_secs: 10,
            fetch_delay_secs: 1,
            max_steps: 8,
            report_dir: "./reports".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Idle chat sessions older than this are swept on the next request.
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            session_ttl_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitsConfig {
    pub model_path: String,
}

impl Default for DigitsConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/mnist_cnn.onnx".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_from_env() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| Self::default_config_path());
        Self::load(Path::new(&config_path))
    }

    pub fn default_config_path() -> String {
        "./config.toml".to_string()
    }
}
