//! Runtime configuration endpoint
//!
//! Exposes the confidence band edges so the review UI can label the band a
//! queued candidate fell into instead of hardcoding the thresholds.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use spir_common::ConfidenceBands;

use crate::AppState;

/// GET /api/config response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub bands: ConfidenceBands,
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        bands: state.bands,
    })
}

/// Build config routes
pub fn config_routes() -> Router<AppState> {
    Router::new().route("/api/config", get(get_config))
}
