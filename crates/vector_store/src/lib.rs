pub mod models;
pub mod store;

pub use models::{Document, DocumentChunk, SearchResult};
pub use store::SnapshotVectorStore;
