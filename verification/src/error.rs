use dareboard_store::StoreError;
use dareboard_types::{ClaimStatus, SubjectKind, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("subject {0} already has a terminal verification record")]
    DuplicateClaim(String),

    #[error("chain fact source unavailable: {0}")]
    ChainUnavailable(String),

    #[error("subject not found: {0}")]
    SubjectNotFound(String),

    #[error("subject {0} is already registered")]
    DuplicateSubject(String),

    #[error("concurrent write conflict on subject {0}")]
    Conflict(String),

    #[error("subject {subject} is a {expected}, but the claimed outcome is for a {claimed}")]
    OutcomeKindMismatch {
        subject: String,
        expected: SubjectKind,
        claimed: SubjectKind,
    },

    #[error("subject {0} has no verification record to review")]
    NoRecord(String),

    #[error("subject {subject} is {status} and terminal overrides are disabled")]
    NotReviewable { subject: String, status: ClaimStatus },

    #[error("admin {0} is not on the moderator list")]
    UnknownAdmin(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl VerificationError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ChainUnavailable(_) | Self::Conflict(_))
    }
}

impl From<TypeError> for VerificationError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::InvalidAddress(msg) => Self::InvalidAddress(msg),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}
