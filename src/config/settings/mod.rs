#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 768;
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 200;

const ENV_INDEX_API_KEY: &str = "DOCSEARCH_INDEX_API_KEY";
const ENV_INDEX_ENVIRONMENT: &str = "DOCSEARCH_INDEX_ENVIRONMENT";
const ENV_INDEX_NAME: &str = "DOCSEARCH_INDEX_NAME";
const ENV_COMPLETION_API_KEY: &str = "DOCSEARCH_COMPLETION_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Connection settings for the Ollama-compatible embedding server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub dimension: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: "nomic-embed-text:latest".to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

/// Credentials and addressing for the hosted vector index
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub api_key: String,
    pub environment: String,
    pub name: String,
    /// Direct endpoint override; when set, `environment` and `name` are not used
    /// for addressing (but are still required to be present)
    pub host: Option<String>,
}

/// Credentials and request parameters for the LLM completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.anthropic.com/v1/complete".to_string(),
            model: "claude-v1".to_string(),
            max_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
        }
    }
}

/// Bind address for the web UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid embedding dimension: {0} (must be between 64 and 4096)")]
    InvalidEmbeddingDimension(u32),
    #[error("Invalid max_tokens: {0} (must be between 1 and 4096)")]
    InvalidMaxTokens(u32),
    #[error("Missing required secret: {0} (set it in config.toml or the environment)")]
    MissingSecret(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from `config.toml` in the given directory, apply
    /// environment overrides for the secrets, and validate. Missing files fall
    /// back to defaults, but validation still fails if any secret is absent.
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str::<Config>(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            Config::default()
        };
        config.base_dir = config_dir.as_ref().to_path_buf();

        config.apply_env_overrides();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Secrets may come from the environment instead of the config file; env
    /// values take precedence when both are present.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(ENV_INDEX_API_KEY) {
            self.index.api_key = value;
        }
        if let Ok(value) = env::var(ENV_INDEX_ENVIRONMENT) {
            self.index.environment = value;
        }
        if let Ok(value) = env::var(ENV_INDEX_NAME) {
            self.index.name = value;
        }
        if let Ok(value) = env::var(ENV_COMPLETION_API_KEY) {
            self.completion.api_key = value;
        }
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.embedding.validate()?;
        self.index.validate()?;
        self.completion.validate()?;
        self.server.validate()?;
        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if !(64..=4096).contains(&self.dimension) {
            return Err(ConfigError::InvalidEmbeddingDimension(self.dimension));
        }

        Ok(())
    }

    pub fn embedding_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret("index.api_key"));
        }

        if self.environment.trim().is_empty() {
            return Err(ConfigError::MissingSecret("index.environment"));
        }

        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingSecret("index.name"));
        }

        self.index_url()?;
        Ok(())
    }

    /// Endpoint of the hosted index, derived from the index name and
    /// environment unless a direct host override is configured.
    pub fn index_url(&self) -> Result<Url, ConfigError> {
        let url_str = self.host.clone().unwrap_or_else(|| {
            format!("https://{}.svc.{}.pinecone.io", self.name, self.environment)
        });
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

impl CompletionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret("completion.api_key"));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.max_tokens == 0 || self.max_tokens > 4096 {
            return Err(ConfigError::InvalidMaxTokens(self.max_tokens));
        }

        self.completion_url()?;
        Ok(())
    }

    pub fn completion_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_url).map_err(|_| ConfigError::InvalidUrl(self.api_url.clone()))
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        Ok(())
    }

    #[inline]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
