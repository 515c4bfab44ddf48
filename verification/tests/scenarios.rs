//! End-to-end claim and review scenarios against the nullable store, clock
//! and fact source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dareboard_chain::Fact;
use dareboard_nullables::{FactMode, NullClock, NullFactSource, NullStore};
use dareboard_store::{RecordStore, StoreError, Stores, WriteOutcome};
use dareboard_types::{
    Address, AdminId, Claim, ClaimStatus, ClaimedOutcome, DecidedBy, Decision, SubjectId,
    SubjectKind, Timestamp, VerificationRecord,
};
use dareboard_verification::{
    ModerationGate, SubjectLocks, VerificationEngine, VerificationError, VerificationParams,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
const CAROL: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

struct Harness {
    store: Arc<NullStore>,
    facts: Arc<NullFactSource>,
    clock: Arc<NullClock>,
    engine: Arc<VerificationEngine>,
    gate: ModerationGate,
}

fn harness_with(params: VerificationParams) -> Harness {
    let store = Arc::new(NullStore::new());
    let facts = Arc::new(NullFactSource::new());
    let clock = Arc::new(NullClock::new(1_000));
    let locks = Arc::new(SubjectLocks::new());
    let engine = Arc::new(VerificationEngine::new(
        NullStore::stores(&store),
        facts.clone(),
        clock.clone(),
        locks.clone(),
        params.clone(),
    ));
    let gate = ModerationGate::new(NullStore::stores(&store), clock.clone(), locks, params);
    Harness {
        store,
        facts,
        clock,
        engine,
        gate,
    }
}

fn harness() -> Harness {
    harness_with(VerificationParams::default())
}

fn addr(raw: &str) -> Address {
    Address::validate(raw).unwrap()
}

fn sid(id: &str) -> SubjectId {
    SubjectId::parse(id).unwrap()
}

fn admin(id: &str) -> AdminId {
    AdminId::parse(id).unwrap()
}

fn winner_claim(subject: &str, claimant: &str, winner: &str) -> Claim {
    Claim {
        claimant: addr(claimant),
        subject: sid(subject),
        outcome: ClaimedOutcome::Winner(addr(winner)),
        submitted_at: Timestamp::new(1_000),
    }
}

fn final_tally(entries: &[(&str, u64)]) -> Fact {
    Fact::VoteTally {
        finalized: true,
        tallies: entries.iter().map(|(a, v)| (addr(a), *v)).collect(),
    }
}

impl Harness {
    fn dare(&self, id: &str, fact: Fact) {
        self.engine.register_subject(sid(id), SubjectKind::Dare).unwrap();
        self.facts.set_fact(&sid(id), fact);
    }
}

// ---------------------------------------------------------------------------
// Scenario A: matching fact verifies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn matching_fact_verifies() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9), (BOB, 2)]));

    let record = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();

    assert_eq!(record.status, ClaimStatus::Verified);
    assert_eq!(record.winner, Some(addr(ALICE)));
    assert_eq!(record.decided_by, DecidedBy::System);
    assert_eq!(record.decided_at, Timestamp::new(1_000));
    assert_eq!(h.engine.record(&sid("dare-1")).unwrap(), record);
}

// ---------------------------------------------------------------------------
// Scenario B: second claim on a terminal subject is a duplicate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_claim_is_duplicate_and_leaves_record_untouched() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9), (BOB, 2)]));

    let first = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();
    let writes = h.store.write_count();
    let fetches = h.facts.fetch_count();

    h.clock.advance(60);
    let err = h
        .engine
        .submit_claim(winner_claim("dare-1", BOB, BOB))
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::DuplicateClaim(_)));
    assert!(!err.is_retryable());
    assert_eq!(h.store.write_count(), writes);
    assert_eq!(h.facts.fetch_count(), fetches);
    assert_eq!(h.engine.record(&sid("dare-1")).unwrap(), first);
}

#[tokio::test]
async fn rejected_record_is_terminal_too() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9), (BOB, 2)]));

    let rejected = h
        .engine
        .submit_claim(winner_claim("dare-1", BOB, BOB))
        .await
        .unwrap();
    assert_eq!(rejected.status, ClaimStatus::Rejected);
    assert_eq!(rejected.winner, None);

    let err = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::DuplicateClaim(_)));
}

// ---------------------------------------------------------------------------
// Scenario C: chain unavailable leaves nothing behind
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fact_timeout_creates_no_record() {
    let h = harness_with(VerificationParams {
        fact_timeout: Duration::from_millis(50),
        ..VerificationParams::default()
    });
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    h.facts.set_mode(FactMode::Hang);

    let err = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::ChainUnavailable(_)));
    assert!(err.is_retryable());
    assert_eq!(h.store.write_count(), 0);
    assert!(matches!(
        h.engine.record(&sid("dare-1")),
        Err(VerificationError::NoRecord(_))
    ));
}

#[tokio::test]
async fn unavailable_source_then_retry_succeeds() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    h.facts.set_mode(FactMode::Unavailable);

    let err = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::ChainUnavailable(_)));
    assert_eq!(h.store.write_count(), 0);

    h.facts.set_mode(FactMode::Available);
    let record = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();
    assert_eq!(record.status, ClaimStatus::Verified);
}

#[tokio::test]
async fn dropped_submission_leaves_no_record_and_no_lock() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    h.facts.set_mode(FactMode::Hang);

    let engine = h.engine.clone();
    let task = tokio::spawn(async move {
        engine
            .submit_claim(winner_claim("dare-1", ALICE, ALICE))
            .await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert_eq!(h.store.write_count(), 0);
    h.facts.set_mode(FactMode::Available);
    let record = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();
    assert_eq!(record.status, ClaimStatus::Verified);
}

// ---------------------------------------------------------------------------
// Scenario D: tie goes to review, admin approval verifies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tie_goes_to_review_then_admin_approves() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 5), (BOB, 5)]));

    let pending = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();
    assert_eq!(pending.status, ClaimStatus::PendingReview);
    assert_eq!(pending.winner, None);

    h.clock.advance(30);
    let approved = h
        .gate
        .review(&sid("dare-1"), Decision::Approve, admin("admin1"))
        .await
        .unwrap();

    assert_eq!(approved.status, ClaimStatus::Verified);
    assert_eq!(approved.winner, Some(addr(ALICE)));
    assert_eq!(approved.decided_by, DecidedBy::Admin(admin("admin1")));
    assert_eq!(approved.decided_at, Timestamp::new(1_030));

    let history = h.gate.history(&sid("dare-1")).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].prior_status, ClaimStatus::PendingReview);
    assert_eq!(history[0].resulting_status, ClaimStatus::Verified);
}

#[tokio::test]
async fn admin_deny_on_pending_rejects() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 5), (BOB, 5)]));
    h.engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();

    let denied = h
        .gate
        .review(&sid("dare-1"), Decision::Deny, admin("admin1"))
        .await
        .unwrap();
    assert_eq!(denied.status, ClaimStatus::Rejected);
    assert_eq!(denied.winner, None);
    assert_eq!(denied.decided_by, DecidedBy::Admin(admin("admin1")));
}

// ---------------------------------------------------------------------------
// Pending re-evaluation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_subject_is_reevaluated_once_fact_finalizes() {
    let h = harness();
    h.dare(
        "dare-1",
        Fact::VoteTally {
            finalized: false,
            tallies: vec![(addr(ALICE), 3)],
        },
    );

    let pending = h
        .engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();
    assert_eq!(pending.status, ClaimStatus::PendingReview);

    h.facts.set_fact(&sid("dare-1"), final_tally(&[(ALICE, 3)]));
    let verified = h
        .engine
        .submit_claim(winner_claim("dare-1", CAROL, ALICE))
        .await
        .unwrap();
    assert_eq!(verified.status, ClaimStatus::Verified);
    assert_eq!(verified.claimant, addr(CAROL));
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_subject_fails_before_fetching() {
    let h = harness();
    let err = h
        .engine
        .submit_claim(winner_claim("dare-404", ALICE, ALICE))
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::SubjectNotFound(_)));
    assert_eq!(h.facts.fetch_count(), 0);
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn outcome_for_wrong_kind_is_refused() {
    let h = harness();
    h.engine
        .register_subject(sid("slot-1"), SubjectKind::CampaignSlot)
        .unwrap();

    let err = h
        .engine
        .submit_claim(winner_claim("slot-1", ALICE, ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::OutcomeKindMismatch {
            expected: SubjectKind::CampaignSlot,
            claimed: SubjectKind::Dare,
            ..
        }
    ));
    assert_eq!(h.facts.fetch_count(), 0);
}

#[tokio::test]
async fn duplicate_subject_registration() {
    let h = harness();
    h.engine.register_subject(sid("dare-1"), SubjectKind::Dare).unwrap();
    assert!(matches!(
        h.engine.register_subject(sid("dare-1"), SubjectKind::Dare),
        Err(VerificationError::DuplicateSubject(_))
    ));
}

// ---------------------------------------------------------------------------
// Linearizability
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_commit_exactly_once() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9), (BOB, 2)]));
    h.facts.set_delay(Duration::from_millis(5));

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = h.engine.clone();
        let winner = if i % 2 == 0 { ALICE } else { BOB };
        handles.push(tokio::spawn(async move {
            engine
                .submit_claim(winner_claim("dare-1", winner, winner))
                .await
        }));
    }

    let mut committed = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(record) => {
                assert!(record.status.is_terminal());
                committed += 1;
            }
            Err(VerificationError::DuplicateClaim(_)) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(duplicates, 15);
    assert_eq!(h.store.write_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engines_with_separate_lock_tables_still_commit_once() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    h.facts.set_delay(Duration::from_millis(20));

    // A second engine over the same store, e.g. another process.
    let other = Arc::new(VerificationEngine::new(
        NullStore::stores(&h.store),
        h.facts.clone(),
        h.clock.clone(),
        Arc::new(SubjectLocks::new()),
        VerificationParams::default(),
    ));

    let a = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.submit_claim(winner_claim("dare-1", ALICE, ALICE)).await })
    };
    let b = tokio::spawn(async move { other.submit_claim(winner_claim("dare-1", BOB, ALICE)).await });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let dup = results
        .iter()
        .filter(|r| matches!(r, Err(VerificationError::DuplicateClaim(_))))
        .count();
    assert_eq!((ok, dup), (1, 1));
    assert_eq!(h.store.write_count(), 1);
}

/// Another writer racing the engine on the record store.
enum Interference {
    /// Every write loses to a PendingReview record the engine never sees.
    Always,
    /// This record lands just ahead of the engine's first write.
    CompetingOnce(VerificationRecord),
}

/// Record store over the null store that injects conflicting writers.
struct ContendedRecords {
    inner: Arc<NullStore>,
    interference: Interference,
    attempts: AtomicUsize,
}

impl ContendedRecords {
    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl RecordStore for ContendedRecords {
    fn read(&self, subject: &SubjectId) -> Result<Option<VerificationRecord>, StoreError> {
        self.inner.read(subject)
    }

    fn conditional_write(
        &self,
        subject: &SubjectId,
        expected_prior: Option<ClaimStatus>,
        record: &VerificationRecord,
    ) -> Result<WriteOutcome, StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        match &self.interference {
            Interference::Always => Ok(WriteOutcome::Conflict {
                actual: Some(ClaimStatus::PendingReview),
            }),
            Interference::CompetingOnce(competing) => {
                if attempt == 0 {
                    let landed = self.inner.conditional_write(subject, None, competing)?;
                    assert_eq!(landed, WriteOutcome::Committed);
                }
                self.inner.conditional_write(subject, expected_prior, record)
            }
        }
    }

    fn iter_records(&self) -> Result<Vec<VerificationRecord>, StoreError> {
        self.inner.iter_records()
    }
}

fn contended_engine(
    h: &Harness,
    interference: Interference,
) -> (Arc<ContendedRecords>, VerificationEngine) {
    let records = Arc::new(ContendedRecords {
        inner: h.store.clone(),
        interference,
        attempts: AtomicUsize::new(0),
    });
    let stores = Stores {
        subjects: h.store.clone(),
        records: records.clone(),
        moderation: h.store.clone(),
    };
    let engine = VerificationEngine::new(
        stores,
        h.facts.clone(),
        h.clock.clone(),
        Arc::new(SubjectLocks::new()),
        VerificationParams::default(),
    );
    (records, engine)
}

#[tokio::test]
async fn persistent_conflict_retries_once_then_fails() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    let (records, engine) = contended_engine(&h, Interference::Always);

    let err = engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::Conflict(_)), "{err:?}");
    assert_eq!(records.attempts(), 2);
    assert_eq!(h.facts.fetch_count(), 1);
    assert_eq!(h.store.write_count(), 0);
    assert!(matches!(
        h.engine.record(&sid("dare-1")),
        Err(VerificationError::NoRecord(_))
    ));
}

#[tokio::test]
async fn conflict_with_competing_pending_record_is_retried() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9), (BOB, 2)]));
    let competing = VerificationRecord::from_claim(
        &winner_claim("dare-1", BOB, BOB),
        ClaimStatus::PendingReview,
        Timestamp::new(900),
    );
    let (records, engine) = contended_engine(&h, Interference::CompetingOnce(competing));

    let record = engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();

    assert_eq!(record.status, ClaimStatus::Verified);
    assert_eq!(record.claimant, addr(ALICE));
    assert_eq!(records.attempts(), 2);
    // The competing record and the retried claim both committed.
    assert_eq!(h.store.write_count(), 2);
    assert_eq!(h.engine.record(&sid("dare-1")).unwrap(), record);
}

// ---------------------------------------------------------------------------
// Moderation policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_can_override_terminal_by_default_and_latest_stands() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    h.engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();

    let denied = h
        .gate
        .review(&sid("dare-1"), Decision::Deny, admin("admin1"))
        .await
        .unwrap();
    assert_eq!(denied.status, ClaimStatus::Rejected);

    let reinstated = h
        .gate
        .review(&sid("dare-1"), Decision::Approve, admin("admin2"))
        .await
        .unwrap();
    assert_eq!(reinstated.status, ClaimStatus::Verified);
    assert_eq!(reinstated.decided_by, DecidedBy::Admin(admin("admin2")));

    let history = h.gate.history(&sid("dare-1")).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sequence, 0);
    assert_eq!(history[0].prior_decided_by, DecidedBy::System);
    assert_eq!(history[1].sequence, 1);
    assert_eq!(history[1].prior_decided_by, DecidedBy::Admin(admin("admin1")));
    assert_eq!(h.engine.record(&sid("dare-1")).unwrap(), reinstated);

    // Still terminal for automatic claims.
    assert!(matches!(
        h.engine.submit_claim(winner_claim("dare-1", BOB, BOB)).await,
        Err(VerificationError::DuplicateClaim(_))
    ));
}

#[tokio::test]
async fn terminal_override_can_be_disabled() {
    let h = harness_with(VerificationParams {
        allow_terminal_override: false,
        ..VerificationParams::default()
    });
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    h.engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();

    let err = h
        .gate
        .review(&sid("dare-1"), Decision::Deny, admin("admin1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::NotReviewable {
            status: ClaimStatus::Verified,
            ..
        }
    ));
    assert!(h.gate.history(&sid("dare-1")).unwrap().is_empty());
}

#[tokio::test]
async fn unlisted_admin_is_refused() {
    let h = harness_with(VerificationParams {
        admins: vec![admin("admin1")],
        ..VerificationParams::default()
    });
    h.dare("dare-1", final_tally(&[(ALICE, 5), (BOB, 5)]));
    h.engine
        .submit_claim(winner_claim("dare-1", ALICE, ALICE))
        .await
        .unwrap();
    let writes = h.store.write_count();

    let err = h
        .gate
        .review(&sid("dare-1"), Decision::Approve, admin("mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::UnknownAdmin(_)));
    assert_eq!(h.store.write_count(), writes);
}

#[tokio::test]
async fn review_without_record_or_subject() {
    let h = harness();
    h.engine.register_subject(sid("dare-1"), SubjectKind::Dare).unwrap();

    assert!(matches!(
        h.gate.review(&sid("dare-1"), Decision::Approve, admin("admin1")).await,
        Err(VerificationError::NoRecord(_))
    ));
    assert!(matches!(
        h.gate.review(&sid("dare-2"), Decision::Approve, admin("admin1")).await,
        Err(VerificationError::SubjectNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leaderboard_tracks_committed_outcomes() {
    let h = harness();
    h.dare("dare-1", final_tally(&[(ALICE, 9)]));
    h.dare("dare-2", final_tally(&[(BOB, 4)]));
    h.engine
        .register_subject(sid("points-1"), SubjectKind::PointsBatch)
        .unwrap();
    h.facts.set_fact(
        &sid("points-1"),
        Fact::PointsAward {
            finalized: true,
            holder: addr(BOB),
            amount: 40,
        },
    );

    h.engine.submit_claim(winner_claim("dare-1", ALICE, ALICE)).await.unwrap();
    h.engine.submit_claim(winner_claim("dare-2", BOB, BOB)).await.unwrap();
    h.engine
        .submit_claim(Claim {
            claimant: addr(BOB),
            subject: sid("points-1"),
            outcome: ClaimedOutcome::Points {
                holder: addr(BOB),
                amount: 40,
            },
            submitted_at: Timestamp::new(1_000),
        })
        .await
        .unwrap();

    let board = h.engine.leaderboard().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].address, addr(BOB));
    assert_eq!(board[0].points, 40);
    assert_eq!(board[0].dare_wins, 1);
    assert_eq!(board[1].address, addr(ALICE));

    h.gate
        .review(&sid("dare-1"), Decision::Deny, admin("admin1"))
        .await
        .unwrap();
    let board = h.engine.leaderboard().unwrap();
    assert_eq!(board.len(), 1);
}
