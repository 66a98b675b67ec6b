//! Resolved-match list API handlers
//!
//! GET /api/matches/auto-approved, GET /api/matches/manually-approved

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use spir_common::db::CandidateStatus;

use crate::error::ApiResult;
use crate::services::{load_status_list, StatusList, DEFAULT_DISPLAY_CAP};
use crate::AppState;

/// Query parameters for resolved-match lists
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Display cap; defaults to 100
    pub limit: Option<i64>,
}

/// GET /api/matches/auto-approved
///
/// Most recent engine-confirmed matches by creation time, plus the true
/// total for the tab badge.
pub async fn auto_approved(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<StatusList>> {
    let cap = params.limit.unwrap_or(DEFAULT_DISPLAY_CAP);
    let list = load_status_list(&state.db, CandidateStatus::AutoApproved, cap).await?;
    Ok(Json(list))
}

/// GET /api/matches/manually-approved
///
/// Most recent reviewer-confirmed matches by last update time.
pub async fn manually_approved(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<StatusList>> {
    let cap = params.limit.unwrap_or(DEFAULT_DISPLAY_CAP);
    let list = load_status_list(&state.db, CandidateStatus::ManuallyApproved, cap).await?;
    Ok(Json(list))
}

/// Build resolved-match routes
pub fn matches_routes() -> Router<AppState> {
    Router::new()
        .route("/api/matches/auto-approved", get(auto_approved))
        .route("/api/matches/manually-approved", get(manually_approved))
}
