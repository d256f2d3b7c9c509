// Completion provider module
// Single-shot HTTP client for a hosted LLM completion endpoint


use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone)]
pub struct CompletionClient {
    api_url: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    completion: Option<String>,
}

impl CompletionClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let api_url = config
            .completion
            .completion_url()
            .context("Failed to build completion endpoint URL from config")?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            api_url,
            api_key: config.completion.api_key.clone(),
            model: config.completion.model.clone(),
            max_tokens: config.completion.max_tokens,
            agent,
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

    /// Request a completion for the given prompt. A response that lacks the
    /// `completion` field yields an empty string, not an error.
    #[inline]
    pub fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting completion (prompt length: {}, max_tokens: {})",
            prompt.len(),
            self.max_tokens
        );

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize completion request")?;

        let authorization = format!("Bearer {}", self.api_key);
        let response_text = self
            .agent
            .post(self.api_url.as_str())
            .header("Authorization", authorization.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .context("Completion request failed")?;

        let response: CompletionResponse = serde_json::from_str(&response_text)
            .context("Failed to parse completion response")?;

        match response.completion {
            Some(completion) => {
                debug!("Received completion ({} chars)", completion.len());
                Ok(completion)
            }
            None => {
                warn!("Completion response had no 'completion' field, returning empty string");
                Ok(String::new())
            }
        }
    }
}
