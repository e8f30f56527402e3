use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::{Document, DocumentChunk, SearchResult};

const INDEX_FILE: &str = "index.json";
const META_FILE: &str = "meta.json";

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotMeta {
    dimension: usize,
    document_count: usize,
    saved_at: DateTime<Utc>,
}

/// In-memory vector store with cosine-similarity search, persisted as
/// a directory snapshot so the index survives restarts.
#[derive(Debug, Default)]
pub struct SnapshotVectorStore {
    documents: Vec<Document>,
    dimension: Option<usize>,
}

impl SnapshotVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given chunks, assigning each a fresh document id.
    /// Every embedding must share the store's dimension, which is
    /// fixed by the first document added.
    pub fn add_chunks(&mut self, chunks: Vec<DocumentChunk>) -> Result<usize> {
        for chunk in &chunks {
            self.check_dimension(chunk.embedding.len())?;
        }

        let added = chunks.len();
        for chunk in chunks {
            if self.dimension.is_none() {
                self.dimension = Some(chunk.embedding.len());
            }
            self.documents.push(chunk.into_document());
        }

        Ok(added)
    }

    /// Returns the `top_k` most similar documents, best first.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(query_embedding.len())?;

        let mut results: Vec<SearchResult> = self
            .documents
            .iter()
            .map(|doc| {
                SearchResult::new(doc.clone(), cosine_similarity(query_embedding, &doc.embedding))
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;

        let meta = SnapshotMeta {
            dimension: self.dimension.unwrap_or(0),
            document_count: self.documents.len(),
            saved_at: Utc::now(),
        };

        let index_json = serde_json::to_string(&self.documents)?;
        fs::write(dir.join(INDEX_FILE), index_json)?;
        let meta_json = serde_json::to_string_pretty(&meta)?;
        fs::write(dir.join(META_FILE), meta_json)?;

        info!(
            dir = %dir.display(),
            documents = self.documents.len(),
            "vector store snapshot saved"
        );
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let index_path = dir.join(INDEX_FILE);
        let index_json = fs::read_to_string(&index_path)
            .with_context(|| format!("Failed to read snapshot index {}", index_path.display()))?;
        let documents: Vec<Document> = serde_json::from_str(&index_json)
            .context("Failed to parse snapshot index")?;

        let dimension = documents.first().map(|doc| doc.embedding.len());

        info!(
            dir = %dir.display(),
            documents = documents.len(),
            "vector store snapshot loaded"
        );

        Ok(Self {
            documents,
            dimension,
        })
    }

    /// Whether a usable snapshot exists at the given directory.
    pub fn exists(dir: &Path) -> bool {
        dir.join(INDEX_FILE).is_file()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if let Some(expected) = self.dimension {
            if len != expected {
                anyhow::bail!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    expected,
                    len
                );
            }
        }
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
