/// A text chunk with its position in the source document
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub content: String,
    pub chunk_id: usize,
}

/// Configuration for text chunking, measured in characters
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Splits text into overlapping chunks on word boundaries. Each chunk
/// stays within the character budget unless a single word exceeds it,
/// in which case that word becomes its own chunk.
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn chunk_text(&self, text: &str) -> Vec<TextChunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return vec![];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let mut end = start;
            let mut length = 0;

            while end < words.len() {
                let word_len = words[end].len();
                let extra = if length == 0 { word_len } else { word_len + 1 };
                if length + extra > self.config.chunk_size && end > start {
                    break;
                }
                length += extra;
                end += 1;
            }

            chunks.push(TextChunk {
                content: words[start..end].join(" "),
                chunk_id: chunks.len(),
            });

            if end >= words.len() {
                break;
            }

            // Walk back from the chunk end until roughly chunk_overlap
            // characters are re-included, keeping at least one new word
            // of forward progress.
            let mut overlap_start = end;
            let mut overlap_len = 0;
            while overlap_start > start + 1 && overlap_len < self.config.chunk_overlap {
                overlap_start -= 1;
                overlap_len += words[overlap_start].len() + 1;
            }
            start = overlap_start;
        }

        chunks
    }
}
