//! Review queue queries
//!
//! Queue entries are the audit log of disambiguation decisions: created by
//! the matching engine, transitioned to reviewed exactly once, never deleted.
//! Both transitions are compare-and-swap updates on `reviewed = 0` so a
//! second reviewer's late submission surfaces as a conflict instead of
//! double-processing.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use spir_common::db::{parse_timestamp, ReviewQueueEntry};
use spir_common::{Error, Result};

fn map_entry_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReviewQueueEntry> {
    let guid: String = row.get("guid");
    let reviewed_at: Option<String> = row.get("reviewed_at");
    let created_at: String = row.get("created_at");

    Ok(ReviewQueueEntry {
        guid: Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("Bad entry guid '{}': {}", guid, e)))?,
        market_player_id: row.get("market_player_id"),
        candidate1_stats_id: row.get("candidate1_stats_id"),
        candidate1_confidence: row.get("candidate1_confidence"),
        candidate2_stats_id: row.get("candidate2_stats_id"),
        candidate2_confidence: row.get("candidate2_confidence"),
        candidate3_stats_id: row.get("candidate3_stats_id"),
        candidate3_confidence: row.get("candidate3_confidence"),
        reviewed: row.get::<i64, _>("reviewed") != 0,
        reviewed_at: reviewed_at.as_deref().map(parse_timestamp).transpose()?,
        approved_stats_id: row.get("approved_stats_id"),
        rejection_reason: row.get("rejection_reason"),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// List all unreviewed entries, best candidates first
///
/// Orders by top-candidate confidence descending; entries with no known
/// confidence sort last.
pub async fn list_unreviewed(pool: &SqlitePool) -> Result<Vec<ReviewQueueEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM review_queue
        WHERE reviewed = 0
        ORDER BY candidate1_confidence IS NULL, candidate1_confidence DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_entry_row).collect()
}

/// Load one entry by guid
pub async fn load_entry(pool: &SqlitePool, guid: Uuid) -> Result<Option<ReviewQueueEntry>> {
    let row = sqlx::query("SELECT * FROM review_queue WHERE guid = ?")
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_entry_row).transpose()
}

/// Mark an entry approved
///
/// Compare-and-swap on `reviewed = 0`: zero rows affected means the entry
/// was already resolved and the caller gets a conflict.
pub async fn mark_approved<'e, E>(
    executor: E,
    guid: Uuid,
    approved_stats_id: &str,
    reviewed_at: DateTime<Utc>,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE review_queue SET reviewed = 1, reviewed_at = ?, approved_stats_id = ? \
         WHERE guid = ? AND reviewed = 0",
    )
    .bind(reviewed_at.to_rfc3339())
    .bind(approved_stats_id)
    .bind(guid.to_string())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Conflict(format!(
            "Queue entry {} already reviewed",
            guid
        )));
    }

    Ok(())
}

/// Mark an entry rejected with a reason
///
/// Same compare-and-swap contract as [`mark_approved`].
pub async fn mark_rejected<'e, E>(
    executor: E,
    guid: Uuid,
    rejection_reason: &str,
    reviewed_at: DateTime<Utc>,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE review_queue SET reviewed = 1, reviewed_at = ?, rejection_reason = ? \
         WHERE guid = ? AND reviewed = 0",
    )
    .bind(reviewed_at.to_rfc3339())
    .bind(rejection_reason)
    .bind(guid.to_string())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Conflict(format!(
            "Queue entry {} already reviewed",
            guid
        )));
    }

    Ok(())
}

/// Save a queue entry (insert or replace)
pub async fn save_entry(pool: &SqlitePool, entry: &ReviewQueueEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO review_queue (
            guid, market_player_id,
            candidate1_stats_id, candidate1_confidence,
            candidate2_stats_id, candidate2_confidence,
            candidate3_stats_id, candidate3_confidence,
            reviewed, reviewed_at, approved_stats_id, rejection_reason,
            created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.guid.to_string())
    .bind(&entry.market_player_id)
    .bind(&entry.candidate1_stats_id)
    .bind(entry.candidate1_confidence)
    .bind(&entry.candidate2_stats_id)
    .bind(entry.candidate2_confidence)
    .bind(&entry.candidate3_stats_id)
    .bind(entry.candidate3_confidence)
    .bind(entry.reviewed as i64)
    .bind(entry.reviewed_at.map(|ts| ts.to_rfc3339()))
    .bind(&entry.approved_stats_id)
    .bind(&entry.rejection_reason)
    .bind(entry.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}
