use std::path::Path;

use agent_core::Config;
use embeddings::{create_embedding_provider, ChunkConfig, EmbeddingProvider, TextChunker};
use llm::{Content, GeminiClient, GeminiConfig};
use tracing::{info, warn};
use vector_store::{DocumentChunk, SnapshotVectorStore};
use walkdir::WalkDir;

use crate::errors::AppError;
use crate::markdown::markdown_to_html;
use crate::models::SourceSnippet;

const PROMPT_TEMPLATE: &str = "\
Use the following context to answer the user's question as helpfully and accurately as possible.
If the answer isn't directly in the context, feel free to suggest ideas or related insights.
Format your response with proper line breaks and use markdown formatting where appropriate.
Use bullet points or numbered lists when listing items.

Context:
{context}

Question: {input}";

const PLACEHOLDER_NOTE: &str = "This is a placeholder. Add your own notes.";
const SNIPPET_MAX_CHARS: usize = 200;

/// Retrieval-augmented answering over a directory of text notes.
///
/// The index is built once from the notes directory and persisted as
/// a snapshot. When notes are absent a placeholder document keeps the
/// index usable, but nothing is written to disk so real notes are
/// picked up on the next start.
pub struct RagService {
    provider: Box<dyn EmbeddingProvider>,
    store: SnapshotVectorStore,
    client: GeminiClient,
    top_k: usize,
}

impl RagService {
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let provider = create_embedding_provider(&config.embedding)
            .map_err(|e| AppError::InitError(e.to_string()))?;

        let llm_config = config.llm.with_env_overrides();
        let client = GeminiClient::new(GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: llm_config.model,
            base_url: llm_config.base_url,
            temperature: llm_config.temperature,
            ..GeminiConfig::default()
        })
        .map_err(|e| AppError::InitError(e.to_string()))?;

        let rag_config = config.rag.with_env_overrides();
        let snapshot_dir = Path::new(&rag_config.snapshot_dir);

        let store = if SnapshotVectorStore::exists(snapshot_dir) {
            SnapshotVectorStore::load(snapshot_dir)
                .map_err(|e| AppError::VectorStoreError(e.to_string()))?
        } else {
            Self::build_index(
                provider.as_ref(),
                Path::new(&rag_config.notes_dir),
                snapshot_dir,
                rag_config.chunk_size,
                rag_config.chunk_overlap,
            )
            .await?
        };

        info!(documents = store.len(), "RAG service initialized");

        Ok(Self {
            provider,
            store,
            client,
            top_k: rag_config.top_k,
        })
    }

    async fn build_index(
        provider: &dyn EmbeddingProvider,
        notes_dir: &Path,
        snapshot_dir: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<SnapshotVectorStore, AppError> {
        let chunker = TextChunker::new(ChunkConfig {
            chunk_size,
            chunk_overlap,
        });

        let mut file_names = Vec::new();
        let mut chunk_ids = Vec::new();
        let mut texts = Vec::new();

        for entry in WalkDir::new(notes_dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }

            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable note");
                    continue;
                }
            };

            for chunk in chunker.chunk_text(&content) {
                file_names.push(path.display().to_string());
                chunk_ids.push(chunk.chunk_id);
                texts.push(chunk.content);
            }
        }

        let mut store = SnapshotVectorStore::new();

        if texts.is_empty() {
            info!(dir = %notes_dir.display(), "no notes found, indexing placeholder");
            let embedding = provider
                .embed(vec![PLACEHOLDER_NOTE.to_string()])
                .await
                .map_err(|e| AppError::EmbeddingError(e.to_string()))?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::EmbeddingError("empty embedding batch".to_string()))?;

            store
                .add_chunks(vec![DocumentChunk::new(
                    "placeholder".to_string(),
                    0,
                    PLACEHOLDER_NOTE.to_string(),
                    embedding,
                )])
                .map_err(|e| AppError::VectorStoreError(e.to_string()))?;

            // Not persisted, so real notes replace it on next start.
            return Ok(store);
        }

        let embeddings = provider
            .embed(texts.clone())
            .await
            .map_err(|e| AppError::EmbeddingError(e.to_string()))?;

        let chunks = file_names
            .into_iter()
            .zip(chunk_ids)
            .zip(texts.into_iter().zip(embeddings))
            .map(|((file_name, chunk_id), (content, embedding))| {
                DocumentChunk::new(file_name, chunk_id, content, embedding)
            })
            .collect();

        store
            .add_chunks(chunks)
            .map_err(|e| AppError::VectorStoreError(e.to_string()))?;
        store
            .save(snapshot_dir)
            .map_err(|e| AppError::VectorStoreError(e.to_string()))?;

        Ok(store)
    }

    /// Answers a question from the indexed notes. Returns rendered
    /// HTML plus the matched snippets when `show_sources` is set.
    pub async fn answer(
        &self,
        question: &str,
        show_sources: bool,
    ) -> Result<(String, Option<Vec<SourceSnippet>>), AppError> {
        let query_embedding = self
            .provider
            .embed(vec![question.to_string()])
            .await
            .map_err(|e| AppError::EmbeddingError(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::EmbeddingError("empty embedding batch".to_string()))?;

        let results = self
            .store
            .search(&query_embedding, self.top_k)
            .map_err(|e| AppError::VectorStoreError(e.to_string()))?;

        let context = results
            .iter()
            .map(|r| r.document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = PROMPT_TEMPLATE
            .replace("{context}", &context)
            .replace("{input}", question);

        let reply = self
            .client
            .generate(vec![Content::user(prompt)], None, None)
            .await
            .map_err(|e| AppError::LlmError(e.to_string()))?;

        let html = markdown_to_html(&reply.text());

        let sources = show_sources.then(|| {
            results
                .iter()
                .map(|r| SourceSnippet {
                    content: truncate_snippet(&r.document.content),
                    source: r.document.file_name.clone(),
                })
                .collect()
        });

        Ok((html, sources))
    }

    pub fn document_count(&self) -> usize {
        self.store.len()
    }
}

fn truncate_snippet(content: &str) -> String {
    if content.len() <= SNIPPET_MAX_CHARS {
        return content.to_string();
    }

    let mut end = SNIPPET_MAX_CHARS;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &content[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{EmbeddingConfig, RagConfig};
    use tempfile::TempDir;

    fn test_config(notes_dir: &Path, snapshot_dir: &Path) -> Config {
        Config {
            embedding: EmbeddingConfig {
                provider: "fallback".to_string(),
                model: None,
                dimensions: Some(32),
            },
            rag: RagConfig {
                notes_dir: notes_dir.display().to_string(),
                snapshot_dir: snapshot_dir.display().to_string(),
                chunk_size: 100,
                chunk_overlap: 20,
                top_k: 2,
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn should_index_notes_and_save_snapshot() {
        let notes = TempDir::new().unwrap();
        let snapshots = TempDir::new().unwrap();
        let snapshot_dir = snapshots.path().join("store");
        std::fs::write(notes.path().join("rust.txt"), "Rust is a systems language.").unwrap();
        std::fs::write(notes.path().join("ignored.md"), "not indexed").unwrap();

        let config = test_config(notes.path(), &snapshot_dir);
        let service = RagService::initialize(&config).await.unwrap();

        assert_eq!(service.document_count(), 1);
        assert!(SnapshotVectorStore::exists(&snapshot_dir));
    }

    #[tokio::test]
    async fn should_index_placeholder_without_saving_when_no_notes() {
        let notes = TempDir::new().unwrap();
        let snapshots = TempDir::new().unwrap();
        let snapshot_dir = snapshots.path().join("store");

        let config = test_config(notes.path(), &snapshot_dir);
        let service = RagService::initialize(&config).await.unwrap();

        assert_eq!(service.document_count(), 1);
        assert!(!SnapshotVectorStore::exists(&snapshot_dir));
    }

    #[tokio::test]
    async fn should_load_existing_snapshot_instead_of_reindexing() {
        let notes = TempDir::new().unwrap();
        let snapshots = TempDir::new().unwrap();
        let snapshot_dir = snapshots.path().join("store");
        std::fs::write(notes.path().join("a.txt"), "first note").unwrap();

        let config = test_config(notes.path(), &snapshot_dir);
        RagService::initialize(&config).await.unwrap();

        // New notes must not be picked up while a snapshot exists.
        std::fs::write(notes.path().join("b.txt"), "second note").unwrap();
        let service = RagService::initialize(&config).await.unwrap();

        assert_eq!(service.document_count(), 1);
    }

    #[test]
    fn should_truncate_long_snippets() {
        let long = "y".repeat(300);

        let snippet = truncate_snippet(&long);

        assert_eq!(snippet.len(), SNIPPET_MAX_CHARS + 3);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn should_keep_short_snippets() {
        assert_eq!(truncate_snippet("short"), "short");
    }

    #[test]
    fn should_fill_prompt_template() {
        let prompt = PROMPT_TEMPLATE
            .replace("{context}", "CTX")
            .replace("{input}", "QUESTION");

        assert!(prompt.contains("Context:\nCTX"));
        assert!(prompt.contains("Question: QUESTION"));
    }
}
