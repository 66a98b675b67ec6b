//! Database access shared by SPIR services

pub mod models;

pub use models::*;

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use std::path::Path;

use crate::{Error, Result};

/// Initialize database connection pool
///
/// Connects to the shared SQLite database, creating it (and its parent
/// directory) if missing, then ensures the schema exists.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the reconciliation tables if they don't exist
///
/// The matching engine and the review service share this schema; both call
/// through here at startup so either can be brought up first.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS market_players (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            club_name TEXT,
            club_logo_url TEXT,
            profile_url TEXT,
            date_of_birth TEXT,
            nationality TEXT,
            position TEXT,
            photo_url TEXT,
            stats_player_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stats_players (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            team_name TEXT,
            profile_url TEXT,
            date_of_birth TEXT,
            nationality TEXT,
            position TEXT,
            photo_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS match_candidates (
            market_player_id TEXT NOT NULL,
            stats_player_id TEXT NOT NULL,
            name_match INTEGER NOT NULL DEFAULT 0,
            dob_match INTEGER NOT NULL DEFAULT 0,
            club_match INTEGER NOT NULL DEFAULT 0,
            nationality_match INTEGER NOT NULL DEFAULT 0,
            position_match INTEGER NOT NULL DEFAULT 0,
            name_similarity REAL NOT NULL DEFAULT 0.0,
            club_similarity REAL NOT NULL DEFAULT 0.0,
            confidence REAL NOT NULL DEFAULT 0.0,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (market_player_id, stats_player_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_queue (
            guid TEXT PRIMARY KEY,
            market_player_id TEXT,
            candidate1_stats_id TEXT,
            candidate1_confidence REAL,
            candidate2_stats_id TEXT,
            candidate2_confidence REAL,
            candidate3_stats_id TEXT,
            candidate3_confidence REAL,
            reviewed INTEGER NOT NULL DEFAULT 0,
            reviewed_at TEXT,
            approved_stats_id TEXT,
            rejection_reason TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!(
        "Database tables initialized (market_players, stats_players, match_candidates, review_queue)"
    );

    Ok(())
}

/// Parse a persisted timestamp
///
/// Timestamps are written as RFC 3339; SQLite's CURRENT_TIMESTAMP format is
/// accepted as a fallback for rows seeded outside the service.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::Internal(format!("Unparseable timestamp '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_tables_in_memory() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        init_tables(&pool).await.expect("Failed to init tables");

        // Idempotent
        init_tables(&pool).await.expect("Re-init should succeed");

        let tables = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert!(tables.contains(&"market_players".to_string()));
        assert!(tables.contains(&"stats_players".to_string()));
        assert!(tables.contains(&"match_candidates".to_string()));
        assert!(tables.contains(&"review_queue".to_string()));
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2026-03-01T12:30:00+00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_sqlite_format() {
        assert!(parse_timestamp("2026-03-01 12:30:00").is_ok());
        assert!(parse_timestamp("not a timestamp").is_err());
    }
}
