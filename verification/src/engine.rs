//! Verification engine: reconciles claims with chain facts and commits
//! exactly one outcome per subject.

use std::sync::Arc;

use dareboard_chain::{Fact, FactSource};
use dareboard_store::{Stores, StoreError, WriteOutcome};
use dareboard_types::{
    Claim, ClaimStatus, Clock, Subject, SubjectId, SubjectKind, VerificationRecord,
};
use tracing::{debug, info, warn};

use crate::error::VerificationError;
use crate::leaderboard::{leaderboard, Standing};
use crate::locks::SubjectLocks;
use crate::params::VerificationParams;
use crate::reconcile::{reconcile, Verdict};

/// The engine holds no durable state. Everything it decides is committed to
/// the record store through a conditional write, under the per-subject lock.
pub struct VerificationEngine {
    stores: Stores,
    facts: Arc<dyn FactSource>,
    clock: Arc<dyn Clock>,
    locks: Arc<SubjectLocks>,
    params: VerificationParams,
}

impl VerificationEngine {
    pub fn new(
        stores: Stores,
        facts: Arc<dyn FactSource>,
        clock: Arc<dyn Clock>,
        locks: Arc<SubjectLocks>,
        params: VerificationParams,
    ) -> Self {
        Self {
            stores,
            facts,
            clock,
            locks,
            params,
        }
    }

    /// Register a subject claims can be made against.
    pub fn register_subject(
        &self,
        id: SubjectId,
        kind: SubjectKind,
    ) -> Result<Subject, VerificationError> {
        let subject = Subject {
            id,
            kind,
            registered_at: self.clock.now(),
        };
        match self.stores.subjects.put_subject(&subject) {
            Ok(()) => {
                info!(subject = %subject.id, kind = %kind, "registered subject");
                Ok(subject)
            }
            Err(StoreError::Duplicate(id)) => Err(VerificationError::DuplicateSubject(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Submit a claim and return the committed record.
    ///
    /// A subject that already holds a Verified or Rejected record fails with
    /// [`VerificationError::DuplicateClaim`] and is left untouched. If the
    /// fact source fails or times out nothing is written.
    pub async fn submit_claim(&self, claim: Claim) -> Result<VerificationRecord, VerificationError> {
        let subject = self.subject(&claim.subject)?;
        let claimed = claim.outcome.kind();
        if claimed != subject.kind {
            return Err(VerificationError::OutcomeKindMismatch {
                subject: claim.subject.to_string(),
                expected: subject.kind,
                claimed,
            });
        }

        let _guard = self.locks.acquire(&claim.subject).await;

        let mut expected = self.current_status(&claim.subject)?;
        let fact = self.fetch_fact(&claim.subject).await?;
        let verdict = reconcile(&claim.outcome, &fact, self.params.min_winning_votes);

        // One retry of read-decide-write after a conflict, then give up.
        for attempt in 0..2 {
            let record =
                VerificationRecord::from_claim(&claim, verdict.status(), self.clock.now());
            match self
                .stores
                .records
                .conditional_write(&claim.subject, expected, &record)?
            {
                WriteOutcome::Committed => {
                    log_commit(&record, verdict);
                    return Ok(record);
                }
                WriteOutcome::Conflict { actual } => {
                    warn!(subject = %claim.subject, ?expected, ?actual, attempt, "record changed underneath claim");
                    expected = self.current_status(&claim.subject)?;
                }
            }
        }

        Err(VerificationError::Conflict(claim.subject.to_string()))
    }

    /// The current record for a subject.
    pub fn record(&self, subject: &SubjectId) -> Result<VerificationRecord, VerificationError> {
        self.subject(subject)?;
        self.stores
            .records
            .read(subject)?
            .ok_or_else(|| VerificationError::NoRecord(subject.to_string()))
    }

    /// Standings recomputed from the stored records.
    pub fn leaderboard(&self) -> Result<Vec<Standing>, VerificationError> {
        let records = self.stores.records.iter_records()?;
        Ok(leaderboard(&records))
    }

    fn subject(&self, id: &SubjectId) -> Result<Subject, VerificationError> {
        self.stores
            .subjects
            .get_subject(id)?
            .ok_or_else(|| VerificationError::SubjectNotFound(id.to_string()))
    }

    /// Status of the stored record, failing if it is already terminal.
    fn current_status(&self, subject: &SubjectId) -> Result<Option<ClaimStatus>, VerificationError> {
        match self.stores.records.read(subject)? {
            Some(existing) if existing.status.is_terminal() => {
                debug!(%subject, status = %existing.status, "duplicate claim");
                Err(VerificationError::DuplicateClaim(subject.to_string()))
            }
            existing => Ok(existing.map(|r| r.status)),
        }
    }

    async fn fetch_fact(&self, subject: &SubjectId) -> Result<Fact, VerificationError> {
        match tokio::time::timeout(self.params.fact_timeout, self.facts.fetch_fact(subject)).await {
            Ok(Ok(fact)) => Ok(fact),
            Ok(Err(e)) => {
                warn!(%subject, error = %e, "fact fetch failed");
                Err(VerificationError::ChainUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!(%subject, timeout_ms = self.params.fact_timeout.as_millis() as u64, "fact fetch timed out");
                Err(VerificationError::ChainUnavailable(format!(
                    "timed out after {}ms",
                    self.params.fact_timeout.as_millis()
                )))
            }
        }
    }
}

fn log_commit(record: &VerificationRecord, verdict: Verdict) {
    info!(
        subject = %record.subject,
        claimant = %record.claimant,
        status = %record.status,
        verdict = verdict.as_str(),
        "claim decided"
    );
}
