//! Database test utilities
//!
//! In-memory databases with the reconciliation schema applied, plus seed
//! builders for players, candidates, and queue entries.
#![allow(dead_code)]

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use spir_common::db::{
    CandidateStatus, MarketPlayer, MatchCandidate, ReviewQueueEntry, StatsPlayer,
};
use spir_mr::db::{candidates, players, queue};

/// Create an in-memory test database with the schema applied
///
/// Single connection: an in-memory SQLite database is per-connection, so a
/// larger pool would hand out empty databases.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    spir_common::db::init_tables(&pool)
        .await
        .expect("Failed to init tables");

    pool
}

/// Market player seed with sensible defaults
pub fn market_player(id: &str, name: &str) -> MarketPlayer {
    MarketPlayer {
        id: id.to_string(),
        name: name.to_string(),
        club_name: Some("Grasshopper Club".to_string()),
        club_logo_url: None,
        profile_url: Some(format!("https://market.example/players/{}", id)),
        date_of_birth: Some("2002-09-30".to_string()),
        nationality: Some("Switzerland".to_string()),
        position: Some("Centre-Forward".to_string()),
        photo_url: None,
        stats_player_id: None,
    }
}

/// Stats player seed with sensible defaults
pub fn stats_player(id: &str, name: &str) -> StatsPlayer {
    StatsPlayer {
        id: id.to_string(),
        name: name.to_string(),
        team_name: Some("Grasshoppers".to_string()),
        profile_url: Some(format!("https://stats.example/players/{}", id)),
        date_of_birth: Some("2002-09-30".to_string()),
        nationality: Some("Switzerland".to_string()),
        position: Some("Forward".to_string()),
        photo_url: None,
    }
}

/// Pending candidate seed for a (market, stats) pair
pub fn pending_candidate(market_id: &str, stats_id: &str, confidence: f64) -> MatchCandidate {
    let now = Utc::now();
    MatchCandidate {
        market_player_id: market_id.to_string(),
        stats_player_id: stats_id.to_string(),
        name_match: true,
        dob_match: true,
        club_match: true,
        nationality_match: true,
        position_match: false,
        name_similarity: 88.0,
        club_similarity: 75.0,
        confidence,
        status: CandidateStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

/// Candidate seed in a given status, aged by `age_minutes` for sort tests
pub fn candidate_with_status(
    market_id: &str,
    stats_id: &str,
    confidence: f64,
    status: CandidateStatus,
    age_minutes: i64,
) -> MatchCandidate {
    let ts = Utc::now() - Duration::minutes(age_minutes);
    let mut candidate = pending_candidate(market_id, stats_id, confidence);
    candidate.status = status;
    candidate.created_at = ts;
    candidate.updated_at = ts;
    candidate
}

/// Seed a complete reviewable case: one market player, `slots` stats players
/// with pending candidate rows, and an unreviewed queue entry referencing
/// them in descending-confidence order.
///
/// Stats ids are `{market_id}-sf-1..n`; confidences start at 0.79 and step
/// down by 0.03 per slot.
pub async fn seed_review_case(
    pool: &SqlitePool,
    market_id: &str,
    slots: usize,
) -> ReviewQueueEntry {
    players::save_market_player(pool, &market_player(market_id, "Seeded Player"))
        .await
        .expect("Failed to seed market player");

    let mut slot_refs = Vec::new();
    for i in 1..=slots {
        let stats_id = format!("{}-sf-{}", market_id, i);
        let confidence = 0.79 - 0.03 * (i as f64 - 1.0);

        players::save_stats_player(pool, &stats_player(&stats_id, &format!("Candidate {}", i)))
            .await
            .expect("Failed to seed stats player");
        candidates::save_candidate(pool, &pending_candidate(market_id, &stats_id, confidence))
            .await
            .expect("Failed to seed candidate");

        slot_refs.push((stats_id, confidence));
    }

    let entry = ReviewQueueEntry::new(Some(market_id.to_string()), &slot_refs);
    queue::save_entry(pool, &entry)
        .await
        .expect("Failed to seed queue entry");

    entry
}
