//! Review queue loader
//!
//! Fetches the unreviewed backlog and enriches each entry with the full
//! market player, up to three stats players, and their candidate detail
//! rows.
//!
//! Enrichment is batched: referenced ids are collected across the whole
//! backlog, fetched with set-based lookups, and joined in memory, so a
//! backlog of N entries costs three queries instead of up to 7N point
//! lookups.
//!
//! Failure contract: only the backlog query itself is fatal. A missing or
//! unfetchable player degrades that entry alone (market side `None`, slot
//! skipped) and is logged; a missing detail row leaves the slot's detail
//! empty while the slot still renders.

use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{error, warn};

use spir_common::db::{MarketPlayer, MatchCandidate, ReviewQueueEntry, StatsPlayer};
use spir_common::Result;

use crate::db::{candidates, players, queue};

/// One enriched candidate slot
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCandidate {
    /// Slot rank, 1–3 (1 = highest confidence)
    pub rank: u8,
    pub confidence: Option<f64>,
    pub stats_player: StatsPlayer,
    /// Full candidate detail row, if the engine recorded one for this pair
    pub detail: Option<MatchCandidate>,
}

/// One queue entry with its referenced records resolved
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedQueueEntry {
    pub entry: ReviewQueueEntry,
    /// `None` for inverse entries, and for entries whose market player row
    /// could not be fetched
    pub market_player: Option<MarketPlayer>,
    pub candidates: Vec<EnrichedCandidate>,
}

/// Load and enrich the entire unreviewed backlog
pub async fn load_unreviewed_queue(pool: &SqlitePool) -> Result<Vec<EnrichedQueueEntry>> {
    // Fatal if this fails; there is no queue to show
    let entries = queue::list_unreviewed(pool).await?;

    let mut market_ids: Vec<String> = Vec::new();
    let mut stats_ids: Vec<String> = Vec::new();
    for entry in &entries {
        if let Some(id) = &entry.market_player_id {
            market_ids.push(id.clone());
        }
        for candidate in entry.candidate_refs() {
            if !stats_ids.contains(&candidate.stats_player_id) {
                stats_ids.push(candidate.stats_player_id);
            }
        }
    }

    let market_map = batch_or_empty(
        players::load_market_players(pool, &market_ids).await,
        "market players",
    );
    let stats_map = batch_or_empty(
        players::load_stats_players(pool, &stats_ids).await,
        "stats players",
    );
    let detail_map = batch_or_empty(
        candidates::load_candidates_for_markets(pool, &market_ids).await,
        "candidate details",
    );

    let enriched = entries
        .into_iter()
        .map(|entry| enrich_entry(entry, &market_map, &stats_map, &detail_map))
        .collect();

    Ok(enriched)
}

/// Degrade a failed batch lookup to an empty map
///
/// Equivalent to every referenced row being absent: affected entries load
/// unenriched rather than failing the whole backlog.
fn batch_or_empty<K, V>(
    result: Result<HashMap<K, V>>,
    what: &str,
) -> HashMap<K, V> {
    match result {
        Ok(map) => map,
        Err(e) => {
            error!(error = %e, "Batched {} lookup failed; queue loads unenriched", what);
            HashMap::new()
        }
    }
}

fn enrich_entry(
    entry: ReviewQueueEntry,
    market_map: &HashMap<String, MarketPlayer>,
    stats_map: &HashMap<String, StatsPlayer>,
    detail_map: &HashMap<(String, String), MatchCandidate>,
) -> EnrichedQueueEntry {
    let market_player = match &entry.market_player_id {
        Some(id) => {
            let player = market_map.get(id).cloned();
            if player.is_none() {
                warn!(
                    entry_id = %entry.guid,
                    market_player_id = %id,
                    "Market player missing; entry loads without market side"
                );
            }
            player
        }
        None => None,
    };

    let mut candidates = Vec::new();
    for candidate in entry.candidate_refs() {
        let Some(stats_player) = stats_map.get(&candidate.stats_player_id).cloned() else {
            warn!(
                entry_id = %entry.guid,
                stats_player_id = %candidate.stats_player_id,
                rank = candidate.rank,
                "Stats player missing; candidate slot skipped"
            );
            continue;
        };

        let detail = entry.market_player_id.as_ref().and_then(|market_id| {
            detail_map
                .get(&(market_id.clone(), candidate.stats_player_id.clone()))
                .cloned()
        });

        candidates.push(EnrichedCandidate {
            rank: candidate.rank,
            confidence: candidate.confidence,
            stats_player,
            detail,
        });
    }

    EnrichedQueueEntry {
        entry,
        market_player,
        candidates,
    }
}
