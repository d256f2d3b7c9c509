// Web UI module
// axum router serving the upload form page and the two JSON endpoints

pub mod handlers;

use axum::{
    Router,
    http::{self, Method},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::pipeline::{DocumentPipeline, QueryPipeline};
use handlers::{index_page, run_query, upload_document};

/// Shared router state: the two pipelines behind Arc, cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentPipeline>,
    pub queries: Arc<QueryPipeline>,
}

impl AppState {
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            documents: Arc::new(DocumentPipeline::from_config(config)?),
            queries: Arc::new(QueryPipeline::from_config(config)?),
        })
    }
}

pub struct AppBuilder {
    pub app: Router,
}

impl AppBuilder {
    #[inline]
    pub fn new(state: AppState) -> Self {
        let app: Router = Router::new()
            .route("/", get(index_page))
            .route("/api/v1/upload", post(upload_document))
            .route("/api/v1/query", post(run_query))
            .with_state(state);
        Self { app }
    }

    #[inline]
    pub fn with_trace_layer(self) -> Self {
        Self {
            app: self.app.layer(TraceLayer::new_for_http()),
        }
    }

    #[inline]
    pub fn with_cors_layer(self) -> Self {
        let cors_layer = if cfg!(debug_assertions) {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([http::header::CONTENT_TYPE])
                .allow_origin(AllowOrigin::any())
        };
        Self {
            app: self.app.layer(cors_layer),
        }
    }

    #[inline]
    pub fn build(self) -> Router {
        self.app
    }
}

pub struct Server {
    config: Config,
}

impl Server {
    #[inline]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the web UI until the process is stopped
    #[inline]
    pub async fn run(&self) -> Result<()> {
        let state = AppState::from_config(&self.config)?;
        let app = AppBuilder::new(state)
            .with_trace_layer()
            .with_cors_layer()
            .build();

        let addr = self.config.server.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Web UI listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
