//! Confidence band policy
//!
//! The contract between the matching engine and the review workflow: a
//! candidate's overall confidence score determines whether it is accepted
//! without review, queued for human disambiguation, or discarded.
//!
//! Band edges are configuration, not constants baked into call sites. The
//! review band is inclusive at its lower bound and exclusive at the
//! auto-approve bound:
//!
//! ```text
//! confidence >= auto_approve                 -> AutoApprove
//! review_lower <= confidence < auto_approve  -> Review
//! confidence < review_lower                  -> Discard
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Outcome of banding a candidate's confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Confirm the match without human review
    AutoApprove,
    /// Queue for human disambiguation
    Review,
    /// Drop the candidate
    Discard,
}

impl Decision {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::AutoApprove => "auto_approve",
            Decision::Review => "review",
            Decision::Discard => "discard",
        }
    }
}

/// Confidence band thresholds
///
/// Defaults reflect the observed production bands: auto-approve at 0.80 and
/// a 0.70–0.80 review band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceBands {
    /// Scores at or above this value are auto-approved
    #[serde(default = "default_auto_approve")]
    pub auto_approve: f64,

    /// Lower edge of the human-review band
    #[serde(default = "default_review_lower")]
    pub review_lower: f64,
}

fn default_auto_approve() -> f64 {
    0.80
}

fn default_review_lower() -> f64 {
    0.70
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            auto_approve: default_auto_approve(),
            review_lower: default_review_lower(),
        }
    }
}

impl ConfidenceBands {
    /// Create bands with explicit thresholds
    ///
    /// # Errors
    /// Returns `Error::Config` if either threshold is outside [0.0, 1.0] or
    /// the review lower bound is not below the auto-approve bound.
    pub fn new(auto_approve: f64, review_lower: f64) -> Result<Self> {
        let bands = Self {
            auto_approve,
            review_lower,
        };
        bands.validate()?;
        Ok(bands)
    }

    /// Validate threshold ordering and range
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.auto_approve) {
            return Err(Error::Config(format!(
                "auto_approve threshold out of range [0.0, 1.0]: {}",
                self.auto_approve
            )));
        }
        if !(0.0..=1.0).contains(&self.review_lower) {
            return Err(Error::Config(format!(
                "review_lower threshold out of range [0.0, 1.0]: {}",
                self.review_lower
            )));
        }
        if self.review_lower >= self.auto_approve {
            return Err(Error::Config(format!(
                "review_lower ({}) must be below auto_approve ({})",
                self.review_lower, self.auto_approve
            )));
        }
        Ok(())
    }

    /// Band a confidence score
    pub fn decide(&self, confidence: f64) -> Decision {
        if confidence >= self.auto_approve {
            Decision::AutoApprove
        } else if confidence >= self.review_lower {
            Decision::Review
        } else {
            Decision::Discard
        }
    }
}
