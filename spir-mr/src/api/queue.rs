//! Review queue API handlers
//!
//! GET /api/queue, POST /api/queue/{guid}/approve, POST /api/queue/{guid}/reject

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use spir_common::db::ReviewQueueEntry;

use crate::error::ApiResult;
use crate::services::{self, ApprovedMatch, EnrichedQueueEntry};
use crate::AppState;

/// GET /api/queue response
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub count: usize,
    pub entries: Vec<EnrichedQueueEntry>,
}

/// POST /api/queue/{guid}/approve request
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub stats_player_id: String,
}

/// POST /api/queue/{guid}/reject request
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    /// Free-text reason; empty falls back to a case-appropriate default
    #[serde(default)]
    pub reason: Option<String>,
}

/// GET /api/queue
///
/// The enriched unreviewed backlog, best candidates first.
pub async fn get_queue(State(state): State<AppState>) -> ApiResult<Json<QueueResponse>> {
    let entries = services::load_unreviewed_queue(&state.db).await?;
    Ok(Json(QueueResponse {
        count: entries.len(),
        entries,
    }))
}

/// POST /api/queue/{guid}/approve
///
/// Approve one candidate. 409 if the entry was already resolved, 400 if the
/// chosen id is not one of the entry's candidates.
pub async fn approve_entry(
    State(state): State<AppState>,
    Path(guid): Path<Uuid>,
    Json(request): Json<ApproveRequest>,
) -> ApiResult<Json<ApprovedMatch>> {
    match services::approve(&state.db, guid, &request.stats_player_id).await {
        Ok(approved) => Ok(Json(approved)),
        Err(e) => {
            state.record_error(&e.to_string()).await;
            Err(e.into())
        }
    }
}

/// POST /api/queue/{guid}/reject
///
/// Reject an entry, closing out all of its candidates.
pub async fn reject_entry(
    State(state): State<AppState>,
    Path(guid): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> ApiResult<Json<ReviewQueueEntry>> {
    match services::reject(&state.db, guid, request.reason).await {
        Ok(entry) => Ok(Json(entry)),
        Err(e) => {
            state.record_error(&e.to_string()).await;
            Err(e.into())
        }
    }
}

/// Build review queue routes
pub fn queue_routes() -> Router<AppState> {
    Router::new()
        .route("/api/queue", get(get_queue))
        .route("/api/queue/:guid/approve", post(approve_entry))
        .route("/api/queue/:guid/reject", post(reject_entry))
}
