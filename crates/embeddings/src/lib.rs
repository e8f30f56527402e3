pub mod chunker;
pub mod fallback;
pub mod gemini;

pub use chunker::{ChunkConfig, TextChunk, TextChunker};
pub use fallback::FallbackEmbeddingProvider;
pub use gemini::{GeminiEmbeddingClient, GeminiEmbeddingConfig};

use agent_core::EmbeddingConfig;
use anyhow::Result;

type EmbedFuture<'a> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send + 'a>>;

pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, texts: Vec<String>) -> EmbedFuture<'_>;
    fn dimension(&self) -> usize;
}

impl EmbeddingProvider for GeminiEmbeddingClient {
    fn embed(&self, texts: Vec<String>) -> EmbedFuture<'_> {
        Box::pin(self.embed(texts))
    }
    fn dimension(&self) -> usize {
        768
    }
}

impl EmbeddingProvider for FallbackEmbeddingProvider {
    fn embed(&self, texts: Vec<String>) -> EmbedFuture<'_> {
        Box::pin(self.embed(texts))
    }
    fn dimension(&self) -> usize {
        self.embedding_dimension()
    }
}

pub fn create_embedding_provider(cfg: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match cfg.provider.as_str() {
        "gemini" => {
            let mut gemini_cfg = GeminiEmbeddingConfig {
                api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
                ..GeminiEmbeddingConfig::default()
            };
            if let Some(model) = cfg.model.clone() {
                gemini_cfg.model = model;
            }
            Ok(Box::new(GeminiEmbeddingClient::new(gemini_cfg)?))
        }
        _ => {
            let dim = cfg.dimensions.unwrap_or(768);
            Ok(Box::new(FallbackEmbeddingProvider::new(dim)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_fallback_provider_by_default() {
        let cfg = EmbeddingConfig::default();

        let provider = create_embedding_provider(&cfg).unwrap();

        assert_eq!(provider.dimension(), 768);
    }

    #[test]
    fn should_respect_configured_fallback_dimension() {
        let cfg = EmbeddingConfig {
            provider: "fallback".to_string(),
            model: None,
            dimensions: Some(384),
        };

        let provider = create_embedding_provider(&cfg).unwrap();

        assert_eq!(provider.dimension(), 384);
    }

    #[test]
    fn should_create_gemini_provider() {
        let cfg = EmbeddingConfig {
            provider: "gemini".to_string(),
            model: Some("models/embedding-001".to_string()),
            dimensions: Some(768),
        };

        let provider = create_embedding_provider(&cfg).unwrap();

        assert_eq!(provider.dimension(), 768);
    }
}
