//! Review services
//!
//! The logic between the HTTP surface and the query layer: queue enrichment,
//! approved-list assembly, and the approve/reject workflow transitions.

pub mod lists_loader;
pub mod queue_loader;
pub mod review_workflow;

pub use lists_loader::{load_status_list, EnrichedMatch, StatusList, DEFAULT_DISPLAY_CAP};
pub use queue_loader::{load_unreviewed_queue, EnrichedCandidate, EnrichedQueueEntry};
pub use review_workflow::{approve, reject, ApprovedMatch};
