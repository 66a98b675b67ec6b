//! Database access for spir-mr
//!
//! Hand-written SQL over the shared reconciliation schema. Read paths take
//! the pool; mutations take any executor so the review workflow can run them
//! inside one transaction.

pub mod candidates;
pub mod players;
pub mod queue;

/// Comma-separated `?` placeholders for an `IN (...)` clause
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
