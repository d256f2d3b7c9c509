use super::*;
use crate::config::{CompletionConfig, Config, IndexConfig};

fn test_config() -> Config {
    Config {
        index: IndexConfig {
            api_key: "test-key".to_string(),
            environment: "us-east1-gcp".to_string(),
            name: "documents".to_string(),
            host: None,
        },
        completion: CompletionConfig {
            api_key: "test-key".to_string(),
            ..CompletionConfig::default()
        },
        ..Config::default()
    }
}

fn match_with_text(id: &str, score: f32, text: &str) -> Match {
    Match {
        id: id.to_string(),
        score,
        metadata: Some(RecordMetadata {
            text: text.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }),
    }
}

#[test]
fn prompt_contains_query_and_context() {
    let matches = vec![
        match_with_text("doc-1", 0.9, "The sky is blue."),
        match_with_text("doc-2", 0.4, "Grass is green."),
    ];

    let prompt = build_prompt(&matches, "What color is the sky?");

    assert!(prompt.contains("The sky is blue."));
    assert!(prompt.contains("Grass is green."));
    assert!(prompt.contains("Answer the query: What color is the sky?"));
}

#[test]
fn prompt_with_no_matches() {
    let prompt = build_prompt(&[], "What color is the sky?");

    assert!(prompt.starts_with("Based on the document:"));
    assert!(prompt.ends_with("Answer the query: What color is the sky?"));
}

#[test]
fn prompt_skips_matches_without_text() {
    let matches = vec![Match {
        id: "doc-1".to_string(),
        score: 0.5,
        metadata: None,
    }];

    let prompt = build_prompt(&matches, "anything");

    // A record without stored text contributes nothing to the context
    assert!(prompt.contains("Answer the query: anything"));
    assert!(!prompt.contains("doc-1"));
}

#[test]
fn ingest_rejects_invalid_utf8() {
    let pipeline =
        DocumentPipeline::from_config(&test_config()).expect("pipeline should construct");

    // 0xFF is never valid in UTF-8; the decode fails before any network call
    let result = pipeline.ingest(&[0xFF, 0xFE, 0x00, 0x41]);

    assert!(matches!(result, Err(SearchError::Decode(_))));
}

#[test]
fn pipelines_construct_from_config() {
    let config = test_config();
    assert!(DocumentPipeline::from_config(&config).is_ok());
    assert!(QueryPipeline::from_config(&config).is_ok());
}
