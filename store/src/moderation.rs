//! Moderation log storage trait.

use crate::record::WriteOutcome;
use crate::StoreError;
use dareboard_types::{ClaimStatus, ModerationAction, SubjectId, VerificationRecord};

/// Trait for the append-only moderation log.
pub trait ModerationStore: Send + Sync {
    /// Atomically append `action` and conditionally replace the subject's
    /// record. On [`WriteOutcome::Conflict`] neither is written.
    fn commit_review(
        &self,
        expected_prior: ClaimStatus,
        record: &VerificationRecord,
        action: &ModerationAction,
    ) -> Result<WriteOutcome, StoreError>;

    /// All actions for a subject, oldest first.
    fn actions_for(&self, subject: &SubjectId) -> Result<Vec<ModerationAction>, StoreError>;

    /// The action currently in effect for a subject.
    fn latest_action(&self, subject: &SubjectId) -> Result<Option<ModerationAction>, StoreError> {
        Ok(self.actions_for(subject)?.pop())
    }
}
