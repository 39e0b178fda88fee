use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::future::IntoFuture;
use std::sync::Arc;
use sync_core::error::AppError;
use sync_core::middleware::tracing::request_id_middleware;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{Settings, UploadSettings};
use crate::handlers::{
    app::health_check,
    documents::{delete_document, documents_page, upload_document},
    metrics::metrics,
};
use crate::middleware::metrics::metrics_middleware;
use crate::services::{DocumentStore, HttpDocumentStore, SyncController};
use crate::AppState;

pub fn build_router(state: AppState, upload: &UploadSettings) -> Router {
    Router::new()
        .route("/", get(documents_page))
        .route(
            "/documents",
            post(upload_document).layer(DefaultBodyLimit::max(upload.max_bytes)),
        )
        .route("/documents/:id/delete", post(delete_document))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the trace span sees the assigned request id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Build against the HTTP store named in `settings.store`.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let store = HttpDocumentStore::new(&settings.store).map_err(|e| {
            tracing::error!("Invalid document store configuration: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;
        tracing::info!(store = %store.base_url(), "Using remote document store");

        Self::build_with_store(settings, Arc::new(store)).await
    }

    pub async fn build_with_store(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(Arc::new(SyncController::new(store)));
        let app = build_router(state.clone(), &settings.upload);

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}:{}", settings.server.host, port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn controller(&self) -> &Arc<SyncController> {
        &self.state.controller
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
