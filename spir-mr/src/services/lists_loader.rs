//! Approved/rejected lists loader
//!
//! Display lists for the resolved tabs: the most recent N candidates in a
//! status, enriched with both players, plus the true total count computed
//! independently of the cap.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use spir_common::db::{CandidateStatus, MarketPlayer, MatchCandidate, StatsPlayer};
use spir_common::{Error, Result};

use crate::db::{candidates, players};

/// Default display cap for resolved-match lists
pub const DEFAULT_DISPLAY_CAP: i64 = 100;

/// A candidate with both players fully resolved
///
/// Rows with a missing player on either side never appear here; the loader
/// drops them rather than returning a partially-populated record.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedMatch {
    pub candidate: MatchCandidate,
    pub market_player: MarketPlayer,
    pub stats_player: StatsPlayer,
}

/// Capped list plus the uncapped total for the status badge
#[derive(Debug, Clone, Serialize)]
pub struct StatusList {
    pub matches: Vec<EnrichedMatch>,
    pub total: i64,
}

/// Load the most recent candidates in a status
///
/// Auto-approved lists sort by creation time descending; manually-approved
/// lists by last update descending. `total` counts every row in the status
/// regardless of the cap.
pub async fn load_status_list(
    pool: &SqlitePool,
    status: CandidateStatus,
    cap: i64,
) -> Result<StatusList> {
    if cap <= 0 {
        return Err(Error::InvalidInput(format!(
            "Display cap must be positive, got {}",
            cap
        )));
    }

    let rows = candidates::list_by_status(pool, status, cap).await?;
    let total = candidates::count_by_status(pool, status).await?;

    let market_ids: Vec<String> = rows.iter().map(|c| c.market_player_id.clone()).collect();
    let stats_ids: Vec<String> = rows.iter().map(|c| c.stats_player_id.clone()).collect();

    let market_map = players::load_market_players(pool, &market_ids).await?;
    let stats_map = players::load_stats_players(pool, &stats_ids).await?;

    let mut matches = Vec::with_capacity(rows.len());
    for candidate in rows {
        let market_player = market_map.get(&candidate.market_player_id).cloned();
        let stats_player = stats_map.get(&candidate.stats_player_id).cloned();

        match (market_player, stats_player) {
            (Some(market_player), Some(stats_player)) => matches.push(EnrichedMatch {
                candidate,
                market_player,
                stats_player,
            }),
            _ => {
                debug!(
                    market_player_id = %candidate.market_player_id,
                    stats_player_id = %candidate.stats_player_id,
                    "Dropping match with incomplete enrichment from display list"
                );
            }
        }
    }

    Ok(StatusList { matches, total })
}
