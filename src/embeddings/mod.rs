// Embedding provider module
// Wraps an Ollama-compatible embedding server behind a blocking HTTP client

pub mod ollama;

pub use ollama::OllamaClient;
