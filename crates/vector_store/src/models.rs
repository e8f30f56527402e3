use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub file_name: String,
    pub chunk_id: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(file_name: String, chunk_id: usize, content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name,
            chunk_id,
            content,
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// A chunk of a source file plus its embedding, before it is assigned
/// an id and stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub file_name: String,
    pub chunk_id: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

impl DocumentChunk {
    pub fn new(file_name: String, chunk_id: usize, content: String, embedding: Vec<f32>) -> Self {
        Self {
            file_name,
            chunk_id,
            content,
            embedding,
        }
    }

    pub fn into_document(self) -> Document {
        Document::new(self.file_name, self.chunk_id, self.content, self.embedding)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,
    pub similarity: f32,
}

impl SearchResult {
    pub fn new(document: Document, similarity: f32) -> Self {
        Self {
            document,
            similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_document_with_unique_id() {
        let doc1 = Document::new("notes.md".to_string(), 0, "text".to_string(), vec![0.1]);
        let doc2 = Document::new("notes.md".to_string(), 0, "text".to_string(), vec![0.1]);

        assert_ne!(doc1.id, doc2.id);
        assert_eq!(doc1.file_name, "notes.md");
    }

    #[test]
    fn should_convert_chunk_into_document() {
        let chunk = DocumentChunk::new(
            "guide.md".to_string(),
            3,
            "chunk content".to_string(),
            vec![0.5, 0.6],
        );

        let doc = chunk.into_document();

        assert_eq!(doc.file_name, "guide.md");
        assert_eq!(doc.chunk_id, 3);
        assert_eq!(doc.content, "chunk content");
        assert_eq!(doc.embedding, vec![0.5, 0.6]);
    }

    #[test]
    fn should_round_trip_document_through_json() {
        let doc = Document::new("a.md".to_string(), 1, "body".to_string(), vec![1.0, 2.0]);

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: Document = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, doc);
    }
}
