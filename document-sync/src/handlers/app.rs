use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "document-sync",
        "version": env!("CARGO_PKG_VERSION"),
        "snapshot_loaded": state.controller.has_snapshot().await,
    }))
}
