use super::*;
use crate::index::RecordMetadata;

#[test]
fn error_response_status_mapping() {
    let (status, _) = error_response(SearchError::Decode("bad bytes".to_string()));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = error_response(SearchError::Embedding("down".to_string()));
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = error_response(SearchError::Index("down".to_string()));
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = error_response(SearchError::Completion("down".to_string()));
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = error_response(SearchError::Config("missing".to_string()));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn json_error_body_shape() {
    let body = serde_json::to_value(JsonError::new("boom".to_string()))
        .expect("error should serialize");
    assert_eq!(body["message"], "boom");
}

#[test]
fn match_summary_carries_stored_text() {
    let summary = MatchSummary::from(Match {
        id: "doc-1".to_string(),
        score: 0.8,
        metadata: Some(RecordMetadata {
            text: "The sky is blue.".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }),
    });

    assert_eq!(summary.text.as_deref(), Some("The sky is blue."));
}

#[test]
fn query_request_deserialization() {
    let request: QueryRequest =
        serde_json::from_str(r#"{"query": "What color is the sky?"}"#)
            .expect("request should parse");
    assert_eq!(request.query, "What color is the sky?");
}

#[test]
fn index_page_embeds_form_controls() {
    assert!(INDEX_HTML.contains("type=\"file\""));
    assert!(INDEX_HTML.contains("type=\"text\""));
}
