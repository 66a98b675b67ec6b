//! Match candidate queries
//!
//! The candidate store pairs one market player with one stats player under a
//! multi-factor confidence score. Rows are created by the matching engine and
//! only ever change status here.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use spir_common::db::{parse_timestamp, CandidateStatus, MatchCandidate};
use spir_common::{Error, Result};

use super::placeholders;

fn map_candidate_row(row: &sqlx::sqlite::SqliteRow) -> Result<MatchCandidate> {
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(MatchCandidate {
        market_player_id: row.get("market_player_id"),
        stats_player_id: row.get("stats_player_id"),
        name_match: row.get::<i64, _>("name_match") != 0,
        dob_match: row.get::<i64, _>("dob_match") != 0,
        club_match: row.get::<i64, _>("club_match") != 0,
        nationality_match: row.get::<i64, _>("nationality_match") != 0,
        position_match: row.get::<i64, _>("position_match") != 0,
        name_similarity: row.get("name_similarity"),
        club_similarity: row.get("club_similarity"),
        confidence: row.get("confidence"),
        status: CandidateStatus::parse(&status)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Load the candidate row for one (market, stats) pair
pub async fn load_candidate(
    pool: &SqlitePool,
    market_player_id: &str,
    stats_player_id: &str,
) -> Result<Option<MatchCandidate>> {
    let row = sqlx::query(
        "SELECT * FROM match_candidates WHERE market_player_id = ? AND stats_player_id = ?",
    )
    .bind(market_player_id)
    .bind(stats_player_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_candidate_row).transpose()
}

/// Batched candidate lookup for a set of market players, keyed by
/// (market id, stats id) pair
///
/// Used by the queue loader to pull every detail row for the backlog in one
/// query instead of one lookup per slot.
pub async fn load_candidates_for_markets(
    pool: &SqlitePool,
    market_player_ids: &[String],
) -> Result<HashMap<(String, String), MatchCandidate>> {
    if market_player_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT * FROM match_candidates WHERE market_player_id IN ({})",
        placeholders(market_player_ids.len())
    );
    let mut query = sqlx::query(&sql);
    for id in market_player_ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    let mut map = HashMap::with_capacity(rows.len());
    for row in &rows {
        let candidate = map_candidate_row(row)?;
        map.insert(
            (
                candidate.market_player_id.clone(),
                candidate.stats_player_id.clone(),
            ),
            candidate,
        );
    }
    Ok(map)
}

/// List the most recent candidates in a status, capped for display
///
/// Auto-approved rows sort by creation time (when the engine confirmed
/// them); manually-approved rows sort by last update (when the reviewer
/// acted).
pub async fn list_by_status(
    pool: &SqlitePool,
    status: CandidateStatus,
    cap: i64,
) -> Result<Vec<MatchCandidate>> {
    let order_column = match status {
        CandidateStatus::AutoApproved => "created_at",
        _ => "updated_at",
    };

    let sql = format!(
        "SELECT * FROM match_candidates WHERE status = ? ORDER BY {} DESC LIMIT ?",
        order_column
    );
    let rows = sqlx::query(&sql)
        .bind(status.as_str())
        .bind(cap)
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_candidate_row).collect()
}

/// Count all candidates in a status, irrespective of any display cap
pub async fn count_by_status(pool: &SqlitePool, status: CandidateStatus) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM match_candidates WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Transition one candidate row to a new status
///
/// Runs on any executor so the approve workflow can include it in its
/// transaction. A missing row is an error: the workflow must not commit an
/// approval whose candidate row it could not mark.
pub async fn set_status<'e, E>(
    executor: E,
    market_player_id: &str,
    stats_player_id: &str,
    status: CandidateStatus,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE match_candidates SET status = ?, updated_at = ? \
         WHERE market_player_id = ? AND stats_player_id = ?",
    )
    .bind(status.as_str())
    .bind(Utc::now().to_rfc3339())
    .bind(market_player_id)
    .bind(stats_player_id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Match candidate not found: ({}, {})",
            market_player_id, stats_player_id
        )));
    }

    Ok(())
}

/// Close out every still-pending candidate for a market player
///
/// A manual "no match" decision invalidates every proposed pairing for that
/// player, not just the top slot. Approved rows are left untouched so the
/// at-most-one-approved invariant holds.
pub async fn reject_pending_for_market<'e, E>(executor: E, market_player_id: &str) -> Result<u64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE match_candidates SET status = 'rejected', updated_at = ? \
         WHERE market_player_id = ? AND status = 'pending'",
    )
    .bind(Utc::now().to_rfc3339())
    .bind(market_player_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Close out still-pending candidates referencing the given stats players
///
/// The inverse-entry counterpart of [`reject_pending_for_market`]: with no
/// market player on the entry, the sweep is keyed by the entry's listed
/// stats ids.
pub async fn reject_pending_for_stats_ids<'e, E>(
    executor: E,
    stats_player_ids: &[String],
) -> Result<u64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    if stats_player_ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE match_candidates SET status = 'rejected', updated_at = ? \
         WHERE stats_player_id IN ({}) AND status = 'pending'",
        placeholders(stats_player_ids.len())
    );
    let mut query = sqlx::query(&sql).bind(Utc::now().to_rfc3339());
    for id in stats_player_ids {
        query = query.bind(id);
    }

    let result = query.execute(executor).await?;
    Ok(result.rows_affected())
}

/// Save a candidate row (insert or replace)
pub async fn save_candidate(pool: &SqlitePool, candidate: &MatchCandidate) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO match_candidates (
            market_player_id, stats_player_id,
            name_match, dob_match, club_match, nationality_match, position_match,
            name_similarity, club_similarity, confidence, status,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(market_player_id, stats_player_id) DO UPDATE SET
            name_match = excluded.name_match,
            dob_match = excluded.dob_match,
            club_match = excluded.club_match,
            nationality_match = excluded.nationality_match,
            position_match = excluded.position_match,
            name_similarity = excluded.name_similarity,
            club_similarity = excluded.club_similarity,
            confidence = excluded.confidence,
            status = excluded.status,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&candidate.market_player_id)
    .bind(&candidate.stats_player_id)
    .bind(candidate.name_match as i64)
    .bind(candidate.dob_match as i64)
    .bind(candidate.club_match as i64)
    .bind(candidate.nationality_match as i64)
    .bind(candidate.position_match as i64)
    .bind(candidate.name_similarity)
    .bind(candidate.club_similarity)
    .bind(candidate.confidence)
    .bind(candidate.status.as_str())
    .bind(candidate.created_at.to_rfc3339())
    .bind(candidate.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}
