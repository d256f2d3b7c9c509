// Document and query pipelines
// Each is a single linear sequence: the document pipeline embeds and stores an
// uploaded text, the query pipeline retrieves neighbors and asks the LLM

#[cfg(test)]
mod tests;

use tracing::{debug, info};
use uuid::Uuid;

use crate::completion::CompletionClient;
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::index::{Match, PineconeClient, RecordMetadata, VectorRecord};
use crate::{Result, SearchError};

/// Number of nearest neighbors requested per query
pub const TOP_K: usize = 3;

/// Embeds an uploaded document and writes it to the hosted index
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    embedder: OllamaClient,
    index: PineconeClient,
}

/// Outcome of a successful document ingest
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    /// Generated identifier the document was stored under
    pub document_id: String,
    /// The decoded document text
    pub text: String,
    /// Dimensionality of the stored embedding
    pub dimension: usize,
}

impl DocumentPipeline {
    #[inline]
    pub fn new(embedder: OllamaClient, index: PineconeClient) -> Self {
        Self { embedder, index }
    }

    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            OllamaClient::new(config)?,
            PineconeClient::new(config)?,
        ))
    }

    /// Decode the uploaded bytes as UTF-8, embed the text, and upsert the
    /// vector with its source text under a freshly generated id.
    #[inline]
    pub fn ingest(&self, bytes: &[u8]) -> Result<IngestReceipt> {
        let text = std::str::from_utf8(bytes).map_err(|e| SearchError::Decode(e.to_string()))?;

        debug!("Ingesting document ({} bytes)", bytes.len());

        let vector = self
            .embedder
            .embed(text)
            .map_err(|e| SearchError::Embedding(format!("{:#}", e)))?;

        let expected = self.embedder.dimension() as usize;
        if vector.len() != expected {
            return Err(SearchError::Embedding(format!(
                "Embedding has {} dimensions, expected {}",
                vector.len(),
                expected
            )));
        }

        let document_id = Uuid::new_v4().to_string();
        let record = VectorRecord {
            id: document_id.clone(),
            values: vector,
            metadata: RecordMetadata {
                text: text.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        };

        self.index.upsert(std::slice::from_ref(&record))?;

        info!(
            "Ingested document {} ({} chars, {} dimensions)",
            document_id,
            text.chars().count(),
            expected
        );

        Ok(IngestReceipt {
            document_id,
            text: text.to_string(),
            dimension: expected,
        })
    }
}

/// Answers a free-text query from the indexed documents
#[derive(Debug, Clone)]
pub struct QueryPipeline {
    embedder: OllamaClient,
    index: PineconeClient,
    completion: CompletionClient,
}

/// Completion text plus the matches it was grounded on
#[derive(Debug, Clone)]
pub struct Answer {
    pub completion: String,
    pub matches: Vec<Match>,
}

impl QueryPipeline {
    #[inline]
    pub fn new(
        embedder: OllamaClient,
        index: PineconeClient,
        completion: CompletionClient,
    ) -> Self {
        Self {
            embedder,
            index,
            completion,
        }
    }

    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            OllamaClient::new(config)?,
            PineconeClient::new(config)?,
            CompletionClient::new(config)?,
        ))
    }

    /// Embed the query, retrieve the top matches, and ask the completion
    /// endpoint. Zero matches still produce a prompt with empty context.
    #[inline]
    pub fn answer(&self, query: &str) -> Result<Answer> {
        debug!("Answering query ({} chars)", query.chars().count());

        let vector = self
            .embedder
            .embed(query)
            .map_err(|e| SearchError::Embedding(format!("{:#}", e)))?;

        let matches = self.index.query(&vector, TOP_K)?;
        debug!("Retrieved {} matches for prompt context", matches.len());

        let prompt = build_prompt(&matches, query);

        let completion = self
            .completion
            .complete(&prompt)
            .map_err(|e| SearchError::Completion(format!("{:#}", e)))?;

        info!(
            "Answered query with {} matches and {} completion chars",
            matches.len(),
            completion.chars().count()
        );

        Ok(Answer {
            completion,
            matches,
        })
    }
}

/// Interpolate retrieved match texts and the raw query into a single prompt
pub fn build_prompt(matches: &[Match], query: &str) -> String {
    let mut prompt = String::from("Based on the document:\n");
    for text in matches.iter().filter_map(Match::text) {
        prompt.push_str(text);
        prompt.push('\n');
    }
    prompt.push_str("\nAnswer the query: ");
    prompt.push_str(query);
    prompt
}
