//! Verification record storage trait.

use crate::StoreError;
use dareboard_types::{ClaimStatus, SubjectId, VerificationRecord};

/// Result of a conditional write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The expectation held and the record was written.
    Committed,
    /// The stored status differed from the expectation; nothing was written.
    Conflict { actual: Option<ClaimStatus> },
}

/// Trait for the one-record-per-subject verification table.
pub trait RecordStore: Send + Sync {
    /// Read the current record for a subject, if any.
    fn read(&self, subject: &SubjectId) -> Result<Option<VerificationRecord>, StoreError>;

    /// Write `record` only if the stored status equals `expected_prior`
    /// (`None` meaning no record exists). The check and the write are atomic.
    fn conditional_write(
        &self,
        subject: &SubjectId,
        expected_prior: Option<ClaimStatus>,
        record: &VerificationRecord,
    ) -> Result<WriteOutcome, StoreError>;

    /// Every stored record, in subject order.
    fn iter_records(&self) -> Result<Vec<VerificationRecord>, StoreError>;
}
