//! Review workflow controller
//!
//! The approve/reject state machine for ambiguous cases. Both transitions
//! run their writes inside a single transaction, with the queue entry's
//! compare-and-swap on `reviewed = 0` doubling as the stale-reviewer guard:
//! either every postcondition commits together or none are observable, and
//! a retry of an already-resolved entry gets a conflict instead of silently
//! succeeding twice.
//!
//! Approve transitions:
//!   entry{reviewed=false} + candidate{pending}
//!     -> entry{reviewed=true, approved id} + candidate{manually_approved}
//!        + market player{cross-reference written}
//!
//! Reject transitions the entry to reviewed with a reason and closes out
//! every still-pending candidate for that player.
//!
//! Both return the committed state re-read from the store; there is no
//! optimistic in-memory patching to drift from the database.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use spir_common::db::{CandidateStatus, MarketPlayer, MatchCandidate, ReviewQueueEntry, StatsPlayer};
use spir_common::{Error, Result};

use crate::db::{candidates, players, queue};

/// Default reason recorded when a normal entry is rejected without one
pub const DEFAULT_REJECT_REASON: &str = "No suitable match among candidates";

/// Default reason for rejecting an inverse entry (no market-side player)
pub const DEFAULT_INVERSE_REJECT_REASON: &str = "No market-side profile for this player";

/// Committed result of an approval, re-read from the store
#[derive(Debug, Clone, Serialize)]
pub struct ApprovedMatch {
    pub entry: ReviewQueueEntry,
    pub candidate: MatchCandidate,
    pub market_player: Option<MarketPlayer>,
    pub stats_player: Option<StatsPlayer>,
}

/// Approve one candidate for a queue entry
///
/// # Errors
/// - `NotFound`: unknown entry, or no candidate row for the chosen pair
/// - `Conflict`: entry already reviewed (including concurrent reviewers)
/// - `InvalidInput`: chosen id is not one of the entry's candidates, or
///   the entry is an inverse case with no market player to cross-reference
pub async fn approve(
    pool: &SqlitePool,
    entry_guid: Uuid,
    stats_player_id: &str,
) -> Result<ApprovedMatch> {
    let entry = queue::load_entry(pool, entry_guid)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Queue entry not found: {}", entry_guid)))?;

    if entry.reviewed {
        return Err(Error::Conflict(format!(
            "Queue entry {} already reviewed",
            entry_guid
        )));
    }

    let market_player_id = entry.market_player_id.clone().ok_or_else(|| {
        Error::InvalidInput(format!(
            "Queue entry {} has no market player; inverse entries can only be rejected",
            entry_guid
        ))
    })?;

    if !entry.has_candidate(stats_player_id) {
        return Err(Error::InvalidInput(format!(
            "Stats player {} is not a candidate of queue entry {}",
            stats_player_id, entry_guid
        )));
    }

    let reviewed_at = Utc::now();
    let mut tx = pool.begin().await?;

    players::set_cross_reference(&mut *tx, &market_player_id, stats_player_id)
        .await
        .map_err(|e| step_failed("Cross-reference write", e))?;

    queue::mark_approved(&mut *tx, entry_guid, stats_player_id, reviewed_at)
        .await
        .map_err(|e| step_failed("Queue entry update", e))?;

    candidates::set_status(
        &mut *tx,
        &market_player_id,
        stats_player_id,
        CandidateStatus::ManuallyApproved,
    )
    .await
    .map_err(|e| step_failed("Candidate status update", e))?;

    tx.commit().await?;

    info!(
        entry_id = %entry_guid,
        market_player_id = %market_player_id,
        stats_player_id = %stats_player_id,
        "Match approved"
    );

    // Reconciling refresh: hand back what actually committed
    let entry = queue::load_entry(pool, entry_guid)
        .await?
        .ok_or_else(|| Error::Internal(format!("Queue entry vanished after approve: {}", entry_guid)))?;
    let candidate = candidates::load_candidate(pool, &market_player_id, stats_player_id)
        .await?
        .ok_or_else(|| {
            Error::Internal(format!(
                "Candidate vanished after approve: ({}, {})",
                market_player_id, stats_player_id
            ))
        })?;
    let market_player = players::load_market_player(pool, &market_player_id).await?;
    let stats_player = players::load_stats_player(pool, stats_player_id).await?;

    Ok(ApprovedMatch {
        entry,
        candidate,
        market_player,
        stats_player,
    })
}

/// Reject a queue entry, closing out all of its candidates
///
/// An empty or missing reason falls back to a default: inverse entries get
/// [`DEFAULT_INVERSE_REJECT_REASON`], normal entries [`DEFAULT_REJECT_REASON`].
///
/// # Errors
/// - `NotFound`: unknown entry
/// - `Conflict`: entry already reviewed
pub async fn reject(
    pool: &SqlitePool,
    entry_guid: Uuid,
    reason: Option<String>,
) -> Result<ReviewQueueEntry> {
    let entry = queue::load_entry(pool, entry_guid)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Queue entry not found: {}", entry_guid)))?;

    if entry.reviewed {
        return Err(Error::Conflict(format!(
            "Queue entry {} already reviewed",
            entry_guid
        )));
    }

    let reason = reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| default_reject_reason(&entry).to_string());

    let reviewed_at = Utc::now();
    let mut tx = pool.begin().await?;

    queue::mark_rejected(&mut *tx, entry_guid, &reason, reviewed_at)
        .await
        .map_err(|e| step_failed("Queue entry update", e))?;

    let swept = match &entry.market_player_id {
        Some(market_player_id) => {
            candidates::reject_pending_for_market(&mut *tx, market_player_id)
                .await
                .map_err(|e| step_failed("Candidate sweep", e))?
        }
        None => {
            let stats_ids: Vec<String> = entry
                .candidate_refs()
                .into_iter()
                .map(|c| c.stats_player_id)
                .collect();
            candidates::reject_pending_for_stats_ids(&mut *tx, &stats_ids)
                .await
                .map_err(|e| step_failed("Candidate sweep", e))?
        }
    };

    tx.commit().await?;

    info!(
        entry_id = %entry_guid,
        candidates_rejected = swept,
        reason = %reason,
        "Match rejected"
    );

    queue::load_entry(pool, entry_guid)
        .await?
        .ok_or_else(|| Error::Internal(format!("Queue entry vanished after reject: {}", entry_guid)))
}

/// Default rejection reason for an entry
pub fn default_reject_reason(entry: &ReviewQueueEntry) -> &'static str {
    if entry.is_inverse() {
        DEFAULT_INVERSE_REJECT_REASON
    } else {
        DEFAULT_REJECT_REASON
    }
}

/// Name the failing workflow step while keeping typed errors intact
///
/// NotFound/Conflict/InvalidInput already identify what went wrong and drive
/// the HTTP status; store-level failures get the step name prepended so the
/// operator sees which write aborted the transaction.
fn step_failed(step: &str, err: Error) -> Error {
    match err {
        Error::NotFound(_) | Error::Conflict(_) | Error::InvalidInput(_) => err,
        other => Error::Internal(format!("{} failed: {}", step, other)),
    }
}
