
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{Match, VectorRecord};
use crate::{SearchError, config::Config};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Client for a hosted Pinecone-style vector index
#[derive(Debug, Clone)]
pub struct PineconeClient {
    base_url: Url,
    api_key: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

/// Aggregate statistics reported by the index
#[derive(Debug, Clone, Deserialize)]
pub struct IndexStats {
    #[serde(rename = "totalVectorCount", default)]
    pub total_vector_count: u64,
    #[serde(default)]
    pub dimension: u32,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: u32,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
    #[serde(rename = "includeValues")]
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

impl PineconeClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let base_url = config
            .index
            .index_url()
            .map_err(|e| SearchError::Config(format!("Invalid index endpoint: {}", e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            api_key: config.index.api_key.clone(),
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Write records to the index; existing ids are overwritten. Returns the
    /// number of vectors the index reports as upserted.
    #[inline]
    pub fn upsert(&self, records: &[VectorRecord]) -> Result<u32, SearchError> {
        if records.is_empty() {
            debug!("No records to upsert");
            return Ok(0);
        }

        debug!("Upserting {} records", records.len());

        let body = serde_json::to_string(&UpsertRequest { vectors: records })
            .map_err(|e| SearchError::Index(format!("Failed to serialize upsert request: {}", e)))?;

        let response_text = self.post_json("/vectors/upsert", &body)?;

        let response: UpsertResponse = serde_json::from_str(&response_text)
            .map_err(|e| SearchError::Index(format!("Failed to parse upsert response: {}", e)))?;

        info!("Upserted {} vectors", response.upserted_count);
        Ok(response.upserted_count)
    }

    /// Nearest-neighbor search. Asks for `top_k` matches with stored metadata;
    /// an index holding fewer records simply returns fewer matches.
    #[inline]
    pub fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>, SearchError> {
        debug!("Querying index for top {} matches", top_k);

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| SearchError::Index(format!("Failed to serialize query request: {}", e)))?;

        let response_text = self.post_json("/query", &body)?;

        let response: QueryResponse = serde_json::from_str(&response_text)
            .map_err(|e| SearchError::Index(format!("Failed to parse query response: {}", e)))?;

        debug!("Index returned {} matches", response.matches.len());
        Ok(response.matches)
    }

    /// Fetch aggregate index statistics (vector count and dimension)
    #[inline]
    pub fn stats(&self) -> Result<IndexStats, SearchError> {
        let response_text = self.post_json("/describe_index_stats", "{}")?;

        serde_json::from_str(&response_text)
            .map_err(|e| SearchError::Index(format!("Failed to parse stats response: {}", e)))
    }

    fn post_json(&self, path: &str, body: &str) -> Result<String, SearchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| SearchError::Index(format!("Failed to build URL for {}: {}", path, e)))?;

        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            let result = self
                .agent
                .post(url.as_str())
                .header("Api-Key", self.api_key.as_str())
                .header("Content-Type", "application/json")
                .send(body)
                .and_then(|mut resp| resp.body_mut().read_to_string());

            match result {
                Ok(text) => return Ok(text),
                Err(error) => {
                    if !is_retryable(&error) {
                        return Err(SearchError::Index(format!(
                            "Request to {} failed: {}",
                            path, error
                        )));
                    }

                    warn!(
                        "Index request to {} failed (attempt {}/{}): {}",
                        path, attempt, self.retry_attempts, error
                    );
                    last_error = Some(error);

                    if attempt < self.retry_attempts {
                        let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                        std::thread::sleep(Duration::from_millis(delay_ms));
                    }
                }
            }
        }

        Err(SearchError::Index(match last_error {
            Some(error) => format!(
                "Request to {} failed after {} attempts: {}",
                path, self.retry_attempts, error
            ),
            None => format!("Request to {} failed", path),
        }))
    }
}

fn is_retryable(error: &ureq::Error) -> bool {
    match error {
        ureq::Error::StatusCode(status) => *status >= 500,
        ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound
        | ureq::Error::Timeout(_)
        | ureq::Error::Io(_) => true,
        _ => false,
    }
}
