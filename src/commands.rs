use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::{Config, get_config_dir};
use crate::embeddings::OllamaClient;
use crate::index::PineconeClient;
use crate::pipeline::{DocumentPipeline, QueryPipeline};
use crate::server::Server;

/// Start the web UI, verifying provider connectivity first
#[inline]
pub async fn serve() -> Result<()> {
    let config = Config::load(get_config_dir()?).context("Failed to load configuration")?;

    match OllamaClient::new(&config) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                info!(
                    "Embedding server connected at {}:{} with model {}",
                    config.embedding.host, config.embedding.port, config.embedding.model
                );
            }
            Err(e) => {
                warn!("Embedding server is reachable but unhealthy: {}", e);
                println!("Warning: embedding server may not be ready. Uploads may fail.");
            }
        },
        Err(e) => {
            error!("Failed to create embedding client: {}", e);
            return Err(e);
        }
    }

    println!(
        "Starting web UI on http://{}",
        config.server.bind_addr()
    );
    println!("Press Ctrl+C to stop");

    Server::new(config).run().await?;
    Ok(())
}

/// Upload a document file through the document pipeline
#[inline]
pub fn upload_document(file: &Path) -> Result<()> {
    let config = Config::load(get_config_dir()?).context("Failed to load configuration")?;

    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let pipeline = DocumentPipeline::from_config(&config)?;
    let receipt = pipeline.ingest(&bytes)?;

    println!("Document uploaded and embedded successfully.");
    println!("  ID: {}", receipt.document_id);
    println!("  Characters: {}", receipt.text.chars().count());
    println!("  Dimensions: {}", receipt.dimension);

    Ok(())
}

/// Answer a query from the command line
#[inline]
pub fn run_query(text: &str) -> Result<()> {
    let config = Config::load(get_config_dir()?).context("Failed to load configuration")?;

    let pipeline = QueryPipeline::from_config(&config)?;
    let answer = pipeline.answer(text)?;

    println!("Response: {}", answer.completion);

    if !answer.matches.is_empty() {
        println!();
        println!("Matches used:");
        for m in &answer.matches {
            println!("  {} (score {:.3})", m.id, m.score);
        }
    }

    Ok(())
}

/// Print the resolved configuration with secrets redacted
#[inline]
pub fn show_config() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config = Config::load(&config_dir).unwrap_or_else(|e| {
        println!("Warning: configuration is incomplete: {:#}", e);
        println!();
        Config {
            base_dir: config_dir.clone(),
            ..Config::default()
        }
    });

    println!("Config file: {}", config.config_file_path().display());
    println!();
    println!("[embedding]");
    println!(
        "  endpoint: {}://{}:{}",
        config.embedding.protocol, config.embedding.host, config.embedding.port
    );
    println!("  model: {}", config.embedding.model);
    println!("  dimension: {}", config.embedding.dimension);
    println!("[index]");
    println!("  environment: {}", config.index.environment);
    println!("  name: {}", config.index.name);
    if let Some(host) = &config.index.host {
        println!("  host override: {}", host);
    }
    println!("  api_key: {}", redact(&config.index.api_key));
    println!("[completion]");
    println!("  endpoint: {}", config.completion.api_url);
    println!("  model: {}", config.completion.model);
    println!("  max_tokens: {}", config.completion.max_tokens);
    println!("  api_key: {}", redact(&config.completion.api_key));
    println!("[server]");
    println!("  bind: {}", config.server.bind_addr());

    Ok(())
}

/// Report connectivity to each external provider
#[inline]
pub fn show_status() -> Result<()> {
    let config = Config::load(get_config_dir()?).context("Failed to load configuration")?;

    println!("Embedding server:");
    match OllamaClient::new(&config) {
        Ok(client) => match client.health_check() {
            Ok(()) => println!(
                "  ✅ Connected ({}:{}, model {})",
                config.embedding.host, config.embedding.port, config.embedding.model
            ),
            Err(e) => println!("  ⚠️  Reachable but unhealthy - {}", e),
        },
        Err(e) => println!("  ❌ Failed - {}", e),
    }

    println!("Vector index:");
    match PineconeClient::new(&config).and_then(|client| client.stats()) {
        Ok(stats) => println!(
            "  ✅ Connected ({} vectors, dimension {})",
            stats.total_vector_count, stats.dimension
        ),
        Err(e) => println!("  ❌ Failed - {}", e),
    }

    println!("Completion endpoint:");
    println!(
        "  {} (model {}, max_tokens {})",
        config.completion.api_url, config.completion.model, config.completion.max_tokens
    );

    Ok(())
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "(unset)" } else { "(set)" }
}
