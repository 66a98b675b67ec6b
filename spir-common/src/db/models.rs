//! Database models
//!
//! Records reconciled by the review workflow: players from the two upstream
//! providers (transfer-market and statistics), scored match candidates, and
//! review queue entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Player record from the transfer-market data source
///
/// Immutable from the review workflow's perspective except for
/// `stats_player_id`, the confirmed cross-reference written on approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPlayer {
    pub id: String,
    pub name: String,
    pub club_name: Option<String>,
    pub club_logo_url: Option<String>,
    pub profile_url: Option<String>,
    /// ISO date (YYYY-MM-DD) as scraped from the provider
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub position: Option<String>,
    pub photo_url: Option<String>,
    /// Confirmed cross-reference into `stats_players`, null until approved
    pub stats_player_id: Option<String>,
}

/// Player record from the statistics data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsPlayer {
    pub id: String,
    pub name: String,
    pub team_name: Option<String>,
    pub profile_url: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub position: Option<String>,
    pub photo_url: Option<String>,
}

/// Lifecycle status of a match candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Confirmed by the engine without human review
    AutoApproved,
    /// Confirmed by a human reviewer
    ManuallyApproved,
    /// Closed out by a human "no match" decision
    Rejected,
    /// Awaiting review
    Pending,
}

impl CandidateStatus {
    /// Convert to the string persisted in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::AutoApproved => "auto_approved",
            CandidateStatus::ManuallyApproved => "manually_approved",
            CandidateStatus::Rejected => "rejected",
            CandidateStatus::Pending => "pending",
        }
    }

    /// Parse the persisted status string
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "auto_approved" => Ok(CandidateStatus::AutoApproved),
            "manually_approved" => Ok(CandidateStatus::ManuallyApproved),
            "rejected" => Ok(CandidateStatus::Rejected),
            "pending" => Ok(CandidateStatus::Pending),
            other => Err(Error::Internal(format!(
                "Unknown candidate status in database: {}",
                other
            ))),
        }
    }
}

/// Scored pairing of one market player and one stats player
///
/// Created by the matching engine; only `status` (and `updated_at`) change
/// afterwards, driven by the review workflow. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub market_player_id: String,
    pub stats_player_id: String,
    pub name_match: bool,
    pub dob_match: bool,
    pub club_match: bool,
    pub nationality_match: bool,
    pub position_match: bool,
    /// Name similarity score, 0–100
    pub name_similarity: f64,
    /// Club/team similarity score, 0–100
    pub club_similarity: f64,
    /// Overall confidence, 0.0–1.0
    pub confidence: f64,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ranked candidate reference on a review queue entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRef {
    /// Slot rank, 1–3 (1 = highest confidence)
    pub rank: u8,
    pub stats_player_id: String,
    pub confidence: Option<f64>,
}

/// One unresolved disambiguation task
///
/// Created by the matching engine when the top candidate's confidence falls
/// in the review band. `reviewed` transitions false→true exactly once, via
/// approval or rejection; entries are never deleted (they are the audit log).
///
/// A null `market_player_id` is the inverse case: a stats-source player with
/// no plausible market-source counterpart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewQueueEntry {
    pub guid: Uuid,
    pub market_player_id: Option<String>,
    pub candidate1_stats_id: Option<String>,
    pub candidate1_confidence: Option<f64>,
    pub candidate2_stats_id: Option<String>,
    pub candidate2_confidence: Option<f64>,
    pub candidate3_stats_id: Option<String>,
    pub candidate3_confidence: Option<f64>,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Stats player id chosen on approval
    pub approved_stats_id: Option<String>,
    /// Free-text reason recorded on rejection
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewQueueEntry {
    /// Create a new unreviewed entry from ranked candidates
    ///
    /// Candidates must already be sorted by descending confidence; at most
    /// three are kept.
    pub fn new(market_player_id: Option<String>, candidates: &[(String, f64)]) -> Self {
        let slot = |i: usize| candidates.get(i).cloned();
        let (c1, c2, c3) = (slot(0), slot(1), slot(2));
        Self {
            guid: Uuid::new_v4(),
            market_player_id,
            candidate1_stats_id: c1.as_ref().map(|(id, _)| id.clone()),
            candidate1_confidence: c1.as_ref().map(|(_, c)| *c),
            candidate2_stats_id: c2.as_ref().map(|(id, _)| id.clone()),
            candidate2_confidence: c2.as_ref().map(|(_, c)| *c),
            candidate3_stats_id: c3.as_ref().map(|(id, _)| id.clone()),
            candidate3_confidence: c3.as_ref().map(|(_, c)| *c),
            reviewed: false,
            reviewed_at: None,
            approved_stats_id: None,
            rejection_reason: None,
            created_at: Utc::now(),
        }
    }

    /// Ranked candidate references, skipping empty slots
    pub fn candidate_refs(&self) -> Vec<CandidateRef> {
        let slots = [
            (1u8, &self.candidate1_stats_id, self.candidate1_confidence),
            (2u8, &self.candidate2_stats_id, self.candidate2_confidence),
            (3u8, &self.candidate3_stats_id, self.candidate3_confidence),
        ];
        slots
            .into_iter()
            .filter_map(|(rank, id, confidence)| {
                id.as_ref().map(|id| CandidateRef {
                    rank,
                    stats_player_id: id.clone(),
                    confidence,
                })
            })
            .collect()
    }

    /// Whether the given stats player id is one of this entry's candidates
    pub fn has_candidate(&self, stats_player_id: &str) -> bool {
        self.candidate_refs()
            .iter()
            .any(|c| c.stats_player_id == stats_player_id)
    }

    /// Inverse case: a stats player with no plausible market counterpart
    pub fn is_inverse(&self) -> bool {
        self.market_player_id.is_none()
    }
}
