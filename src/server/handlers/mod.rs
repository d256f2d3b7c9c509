// Request handlers for the web UI

#[cfg(test)]
mod tests;

use axum::{
    extract::{Json, Multipart, State},
    http::StatusCode,
    response::Html,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use super::AppState;
use crate::SearchError;
use crate::index::Match;

const INDEX_HTML: &str = include_str!("../index.html");

/// JSON error body returned with non-success status codes
#[derive(Serialize)]
pub struct JsonError {
    message: String,
}

impl JsonError {
    #[inline]
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

type HandlerError = (StatusCode, Json<JsonError>);

#[derive(Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub characters: usize,
    pub dimension: usize,
    /// Echo of the decoded document text, rendered by the page
    pub content: String,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub completion: String,
    pub matches: Vec<MatchSummary>,
}

#[derive(Serialize)]
pub struct MatchSummary {
    pub id: String,
    pub score: f32,
    pub text: Option<String>,
}

impl From<Match> for MatchSummary {
    #[inline]
    fn from(m: Match) -> Self {
        Self {
            id: m.id,
            score: m.score,
            text: m.metadata.map(|meta| meta.text),
        }
    }
}

/// The single-page upload-and-query form
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Accept a multipart document upload and run it through the document pipeline
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HandlerError> {
    let mut bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request(format!("Invalid multipart request: {}", e))
    })? {
        if field.name() == Some("document") {
            bytes = Some(field.bytes().await.map_err(|e| {
                bad_request(format!("Failed to read uploaded file: {}", e))
            })?);
        }
    }

    let Some(bytes) = bytes else {
        return Err(bad_request("Missing 'document' field".to_string()));
    };

    debug!("Received upload of {} bytes", bytes.len());

    let documents = Arc::clone(&state.documents);
    let receipt = tokio::task::spawn_blocking(move || documents.ingest(&bytes))
        .await
        .map_err(|e| internal(format!("Upload task failed: {}", e)))?
        .map_err(error_response)?;

    Ok(Json(UploadResponse {
        document_id: receipt.document_id,
        characters: receipt.text.chars().count(),
        dimension: receipt.dimension,
        content: receipt.text,
    }))
}

/// Answer a free-text query against the indexed documents
pub async fn run_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, HandlerError> {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(bad_request("Query must not be empty".to_string()));
    }

    let queries = Arc::clone(&state.queries);
    let answer = tokio::task::spawn_blocking(move || queries.answer(&query))
        .await
        .map_err(|e| internal(format!("Query task failed: {}", e)))?
        .map_err(error_response)?;

    Ok(Json(QueryResponse {
        completion: answer.completion,
        matches: answer.matches.into_iter().map(MatchSummary::from).collect(),
    }))
}

fn error_response(err: SearchError) -> HandlerError {
    let status = match &err {
        SearchError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SearchError::Embedding(_) | SearchError::Index(_) | SearchError::Completion(_) => {
            StatusCode::BAD_GATEWAY
        }
        SearchError::Config(_) | SearchError::Io(_) | SearchError::Other(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error!("Request failed: {}", err);
    (status, Json(JsonError::new(err.to_string())))
}

fn bad_request(message: String) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(JsonError::new(message)))
}

fn internal(message: String) -> HandlerError {
    error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonError::new(message)),
    )
}
