use anyhow::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic offline embeddings for development and tests when no
/// real embedding API is available. Similar texts do not get similar
/// vectors, but identical texts always get identical ones.
pub struct FallbackEmbeddingProvider {
    embedding_dim: usize,
}

impl FallbackEmbeddingProvider {
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Matches the dimension of the real Gemini embeddings (768).
    pub fn with_gemini_dimension() -> Self {
        Self::new(768)
    }

    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let embeddings = texts
            .iter()
            .map(|text| self.embed_one(text))
            .collect();

        Ok(embeddings)
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        // Cheap xorshift stream seeded from the text hash, scaled into
        // [-0.5, 0.5] so cosine similarity stays meaningful.
        (0..self.embedding_dim)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                ((state % 1000) as f32 / 1000.0) - 0.5
            })
            .collect()
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedding_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_create_fallback_provider_with_custom_dimension() {
        let provider = FallbackEmbeddingProvider::new(512);
        assert_eq!(provider.embedding_dimension(), 512);
    }

    #[tokio::test]
    async fn should_create_fallback_provider_with_gemini_dimension() {
        let provider = FallbackEmbeddingProvider::with_gemini_dimension();
        assert_eq!(provider.embedding_dimension(), 768);
    }

    #[tokio::test]
    async fn should_return_empty_embeddings_for_empty_input() {
        let provider = FallbackEmbeddingProvider::new(768);
        let result = provider.embed(vec![]).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn should_return_different_embeddings_for_different_texts() {
        let provider = FallbackEmbeddingProvider::new(16);
        let texts = vec![
            "first text".to_string(),
            "second text".to_string(),
        ];

        let result = provider.embed(texts).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_ne!(result[0], result[1]);
    }

    #[tokio::test]
    async fn should_be_deterministic() {
        let provider = FallbackEmbeddingProvider::new(16);
        let texts = vec!["same text".to_string()];

        let result1 = provider.embed(texts.clone()).await.unwrap();
        let result2 = provider.embed(texts).await.unwrap();

        assert_eq!(result1, result2);
        assert!(result1[0].iter().any(|&x| x != 0.0));
    }
}
