//! Review workflow integration tests
//!
//! Approve/reject transitions against a real (in-memory) database: combined
//! postconditions, atomicity on step failure, conflict on re-review, and
//! candidate-sweep behavior on rejection.

mod helpers;

use helpers::db_utils::*;

use spir_common::db::{CandidateStatus, ReviewQueueEntry};
use spir_common::Error;
use spir_mr::db::{candidates, players, queue};
use spir_mr::services::review_workflow::{
    self, DEFAULT_INVERSE_REJECT_REASON, DEFAULT_REJECT_REASON,
};

#[tokio::test]
async fn test_approve_sets_all_postconditions() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 3).await;
    let chosen = "tm-1-sf-2";

    let approved = review_workflow::approve(&pool, entry.guid, chosen)
        .await
        .expect("Approve should succeed");

    // Returned state reflects the commit
    assert!(approved.entry.reviewed);
    assert_eq!(approved.entry.approved_stats_id.as_deref(), Some(chosen));
    assert_eq!(approved.candidate.status, CandidateStatus::ManuallyApproved);
    assert_eq!(
        approved.market_player.as_ref().unwrap().stats_player_id.as_deref(),
        Some(chosen)
    );
    assert_eq!(approved.stats_player.as_ref().unwrap().id, chosen);

    // And so does the store
    let reloaded = queue::load_entry(&pool, entry.guid).await.unwrap().unwrap();
    assert!(reloaded.reviewed);
    assert!(reloaded.reviewed_at.is_some());

    let market = players::load_market_player(&pool, "tm-1").await.unwrap().unwrap();
    assert_eq!(market.stats_player_id.as_deref(), Some(chosen));

    let candidate = candidates::load_candidate(&pool, "tm-1", chosen)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::ManuallyApproved);

    // Unchosen candidates stay pending; only a reject sweeps them
    let other = candidates::load_candidate(&pool, "tm-1", "tm-1-sf-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(other.status, CandidateStatus::Pending);
}

#[tokio::test]
async fn test_approve_already_reviewed_conflicts() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 2).await;

    review_workflow::approve(&pool, entry.guid, "tm-1-sf-1")
        .await
        .expect("First approve should succeed");

    let err = review_workflow::approve(&pool, entry.guid, "tm-1-sf-1").await;
    assert!(matches!(err, Err(Error::Conflict(_))));

    // Nothing changed on retry
    let reloaded = queue::load_entry(&pool, entry.guid).await.unwrap().unwrap();
    assert_eq!(reloaded.approved_stats_id.as_deref(), Some("tm-1-sf-1"));
}

#[tokio::test]
async fn test_approve_unknown_entry_not_found() {
    let pool = create_test_pool().await;
    let err = review_workflow::approve(&pool, uuid::Uuid::new_v4(), "sf-1").await;
    assert!(matches!(err, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_approve_rejects_non_candidate_id() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 2).await;

    let err = review_workflow::approve(&pool, entry.guid, "sf-not-listed").await;
    assert!(matches!(err, Err(Error::InvalidInput(_))));

    // No state changed
    let market = players::load_market_player(&pool, "tm-1").await.unwrap().unwrap();
    assert!(market.stats_player_id.is_none());
    let reloaded = queue::load_entry(&pool, entry.guid).await.unwrap().unwrap();
    assert!(!reloaded.reviewed);
}

#[tokio::test]
async fn test_approve_rejects_inverse_entry() {
    let pool = create_test_pool().await;
    players::save_stats_player(&pool, &stats_player("sf-1", "Orphan"))
        .await
        .unwrap();
    let entry = ReviewQueueEntry::new(None, &[("sf-1".to_string(), 0.72)]);
    queue::save_entry(&pool, &entry).await.unwrap();

    let err = review_workflow::approve(&pool, entry.guid, "sf-1").await;
    assert!(matches!(err, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_approve_aborts_atomically_on_missing_candidate_row() {
    let pool = create_test_pool().await;

    // Entry references a candidate the store has no detail row for; the
    // final workflow step must fail and roll back the earlier writes.
    players::save_market_player(&pool, &market_player("tm-1", "A")).await.unwrap();
    players::save_stats_player(&pool, &stats_player("sf-1", "B")).await.unwrap();
    let entry = ReviewQueueEntry::new(Some("tm-1".to_string()), &[("sf-1".to_string(), 0.75)]);
    queue::save_entry(&pool, &entry).await.unwrap();

    let err = review_workflow::approve(&pool, entry.guid, "sf-1").await;
    assert!(matches!(err, Err(Error::NotFound(_))));

    // None of the postconditions are observable
    let market = players::load_market_player(&pool, "tm-1").await.unwrap().unwrap();
    assert!(market.stats_player_id.is_none());
    let reloaded = queue::load_entry(&pool, entry.guid).await.unwrap().unwrap();
    assert!(!reloaded.reviewed);
    assert!(reloaded.approved_stats_id.is_none());
}

#[tokio::test]
async fn test_reject_closes_all_pending_candidates() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 3).await;

    // A pending pairing for the same player that never made the slots is
    // still invalidated by a manual no-match decision
    players::save_stats_player(&pool, &stats_player("sf-extra", "Extra"))
        .await
        .unwrap();
    candidates::save_candidate(&pool, &pending_candidate("tm-1", "sf-extra", 0.41))
        .await
        .unwrap();

    let rejected = review_workflow::reject(&pool, entry.guid, Some("Different person".to_string()))
        .await
        .expect("Reject should succeed");

    assert!(rejected.reviewed);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Different person"));

    for stats_id in ["tm-1-sf-1", "tm-1-sf-2", "tm-1-sf-3", "sf-extra"] {
        let candidate = candidates::load_candidate(&pool, "tm-1", stats_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            candidate.status,
            CandidateStatus::Rejected,
            "candidate {} should be rejected",
            stats_id
        );
    }
}

#[tokio::test]
async fn test_reject_spares_approved_rows() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 2).await;

    candidates::save_candidate(
        &pool,
        &candidate_with_status("tm-1", "sf-done", 0.93, CandidateStatus::AutoApproved, 60),
    )
    .await
    .unwrap();

    review_workflow::reject(&pool, entry.guid, None).await.unwrap();

    let kept = candidates::load_candidate(&pool, "tm-1", "sf-done")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.status, CandidateStatus::AutoApproved);
}

#[tokio::test]
async fn test_reject_default_reason() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 1).await;

    let rejected = review_workflow::reject(&pool, entry.guid, None).await.unwrap();
    assert_eq!(rejected.rejection_reason.as_deref(), Some(DEFAULT_REJECT_REASON));

    // Whitespace-only reasons fall back too
    let entry2 = seed_review_case(&pool, "tm-2", 1).await;
    let rejected2 = review_workflow::reject(&pool, entry2.guid, Some("   ".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected2.rejection_reason.as_deref(), Some(DEFAULT_REJECT_REASON));
}

#[tokio::test]
async fn test_reject_inverse_entry_uses_inverse_default_and_sweeps_by_stats_id() {
    let pool = create_test_pool().await;

    players::save_stats_player(&pool, &stats_player("sf-1", "Orphan")).await.unwrap();
    // Inverse case: candidate rows exist under some market player, but the
    // entry itself has no market side
    players::save_market_player(&pool, &market_player("tm-9", "Unrelated")).await.unwrap();
    candidates::save_candidate(&pool, &pending_candidate("tm-9", "sf-1", 0.71))
        .await
        .unwrap();

    let entry = ReviewQueueEntry::new(None, &[("sf-1".to_string(), 0.71)]);
    queue::save_entry(&pool, &entry).await.unwrap();

    let rejected = review_workflow::reject(&pool, entry.guid, None).await.unwrap();
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some(DEFAULT_INVERSE_REJECT_REASON)
    );

    let candidate = candidates::load_candidate(&pool, "tm-9", "sf-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::Rejected);
}

#[tokio::test]
async fn test_reject_already_reviewed_conflicts() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 1).await;

    review_workflow::reject(&pool, entry.guid, None).await.unwrap();
    let err = review_workflow::reject(&pool, entry.guid, None).await;
    assert!(matches!(err, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_approve_then_reject_conflicts_both_ways() {
    let pool = create_test_pool().await;
    let entry = seed_review_case(&pool, "tm-1", 2).await;

    review_workflow::approve(&pool, entry.guid, "tm-1-sf-1").await.unwrap();

    // A late reject on a resolved entry is refused and changes nothing
    let err = review_workflow::reject(&pool, entry.guid, None).await;
    assert!(matches!(err, Err(Error::Conflict(_))));

    let candidate = candidates::load_candidate(&pool, "tm-1", "tm-1-sf-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::ManuallyApproved);
}
