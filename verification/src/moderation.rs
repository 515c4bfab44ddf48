//! Moderation gate: administrators approve or deny verification records.
//!
//! This is the only path that can change a record after it went terminal.
//! Every review appends to the subject's moderation log in the same atomic
//! write that updates the record; the latest log entry is the one in effect.

use std::sync::Arc;

use dareboard_store::{Stores, WriteOutcome};
use dareboard_types::{
    AdminId, Clock, Decision, ModerationAction, SubjectId, VerificationRecord,
};
use tracing::{info, warn};

use crate::error::VerificationError;
use crate::locks::SubjectLocks;
use crate::params::VerificationParams;

pub struct ModerationGate {
    stores: Stores,
    clock: Arc<dyn Clock>,
    locks: Arc<SubjectLocks>,
    params: VerificationParams,
}

impl ModerationGate {
    /// `locks` must be the table the verification engine uses.
    pub fn new(
        stores: Stores,
        clock: Arc<dyn Clock>,
        locks: Arc<SubjectLocks>,
        params: VerificationParams,
    ) -> Self {
        Self {
            stores,
            clock,
            locks,
            params,
        }
    }

    /// Apply an administrator's decision to a subject's record.
    pub async fn review(
        &self,
        subject: &SubjectId,
        decision: Decision,
        admin: AdminId,
    ) -> Result<VerificationRecord, VerificationError> {
        if !self.params.admins.is_empty() && !self.params.admins.contains(&admin) {
            warn!(%subject, %admin, "review by unlisted admin refused");
            return Err(VerificationError::UnknownAdmin(admin.to_string()));
        }

        if self.stores.subjects.get_subject(subject)?.is_none() {
            return Err(VerificationError::SubjectNotFound(subject.to_string()));
        }

        let _guard = self.locks.acquire(subject).await;

        let current = self
            .stores
            .records
            .read(subject)?
            .ok_or_else(|| VerificationError::NoRecord(subject.to_string()))?;

        if current.status.is_terminal() && !self.params.allow_terminal_override {
            return Err(VerificationError::NotReviewable {
                subject: subject.to_string(),
                status: current.status,
            });
        }

        let sequence = self.stores.moderation.actions_for(subject)?.len() as u64;
        let now = self.clock.now();
        let resulting_status = decision.resulting_status();
        let record = current.reviewed(resulting_status, admin.clone(), now);
        let action = ModerationAction {
            subject: subject.clone(),
            sequence,
            decision,
            admin: admin.clone(),
            prior_status: current.status,
            prior_decided_by: current.decided_by.clone(),
            resulting_status,
            decided_at: now,
        };

        match self
            .stores
            .moderation
            .commit_review(current.status, &record, &action)?
        {
            WriteOutcome::Committed => {
                info!(
                    %subject,
                    %admin,
                    ?decision,
                    prior = %current.status,
                    status = %resulting_status,
                    sequence,
                    "review committed"
                );
                Ok(record)
            }
            WriteOutcome::Conflict { actual } => {
                warn!(%subject, %admin, ?actual, "review lost a concurrent write");
                Err(VerificationError::Conflict(subject.to_string()))
            }
        }
    }

    /// The subject's moderation log, oldest first.
    pub fn history(&self, subject: &SubjectId) -> Result<Vec<ModerationAction>, VerificationError> {
        if self.stores.subjects.get_subject(subject)?.is_none() {
            return Err(VerificationError::SubjectNotFound(subject.to_string()));
        }
        Ok(self.stores.moderation.actions_for(subject)?)
    }
}
