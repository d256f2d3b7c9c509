// Hosted vector index module
// Record types plus the HTTP client for upsert and nearest-neighbor search

pub mod pinecone;

pub use pinecone::{IndexStats, PineconeClient};

use serde::{Deserialize, Serialize};

/// Vector record stored in the hosted index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    /// Unique identifier; upserting the same id overwrites the stored record
    pub id: String,
    /// The embedding vector
    pub values: Vec<f32>,
    /// Metadata stored alongside the vector
    pub metadata: RecordMetadata,
}

/// Metadata stored with each vector. Carries the source text so that query
/// results are human-readable rather than raw numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordMetadata {
    /// The text this vector was derived from
    pub text: String,
    /// RFC 3339 timestamp of when the record was created
    pub created_at: String,
}

/// A nearest-neighbor match returned by the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    /// Similarity score reported by the index (higher is better)
    pub score: f32,
    /// Stored metadata; absent for records written without any
    #[serde(default)]
    pub metadata: Option<RecordMetadata>,
}

impl Match {
    /// Source text of the matched record, when stored
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.text.as_str())
    }
}
