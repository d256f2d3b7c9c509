use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document is not valid UTF-8: {0}")]
    Decode(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Completion provider error: {0}")]
    Completion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod completion;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod pipeline;
pub mod server;
