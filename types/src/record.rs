//! Durable outcomes: verification records and moderation actions.

use crate::address::Address;
use crate::claim::{Claim, ClaimStatus, ClaimedOutcome};
use crate::error::TypeError;
use crate::subject::SubjectId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an administrator, as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdminId(String);

impl AdminId {
    pub const MAX_LEN: usize = 64;

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidAdmin(format!(
                "length must be 1..={}",
                Self::MAX_LEN
            )));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidAdmin(format!("{raw:?}: whitespace or control character")));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AdminId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<AdminId> for String {
    fn from(id: AdminId) -> Self {
        id.0
    }
}

/// Who committed the current status of a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecidedBy {
    System,
    Admin(AdminId),
}

/// The durable outcome for one subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub subject: SubjectId,
    /// Address that submitted the claim this record was decided from.
    pub claimant: Address,
    /// The outcome that claim asserted.
    pub outcome: ClaimedOutcome,
    /// Set only while `status` is [`ClaimStatus::Verified`].
    pub winner: Option<Address>,
    pub status: ClaimStatus,
    pub decided_by: DecidedBy,
    pub decided_at: Timestamp,
}

impl VerificationRecord {
    /// Record an automatic decision on `claim`.
    pub fn from_claim(claim: &Claim, status: ClaimStatus, decided_at: Timestamp) -> Self {
        Self {
            subject: claim.subject.clone(),
            claimant: claim.claimant,
            outcome: claim.outcome.clone(),
            winner: winner_for(&claim.outcome, status),
            status,
            decided_by: DecidedBy::System,
            decided_at,
        }
    }

    /// The same claim, re-decided by an administrator.
    pub fn reviewed(&self, status: ClaimStatus, admin: AdminId, decided_at: Timestamp) -> Self {
        Self {
            winner: winner_for(&self.outcome, status),
            status,
            decided_by: DecidedBy::Admin(admin),
            decided_at,
            ..self.clone()
        }
    }
}

fn winner_for(outcome: &ClaimedOutcome, status: ClaimStatus) -> Option<Address> {
    match status {
        ClaimStatus::Verified => Some(*outcome.address()),
        ClaimStatus::Rejected | ClaimStatus::PendingReview => None,
    }
}

/// An administrator's decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approve,
    Deny,
}

impl Decision {
    /// The record status this decision produces.
    pub fn resulting_status(&self) -> ClaimStatus {
        match self {
            Self::Approve => ClaimStatus::Verified,
            Self::Deny => ClaimStatus::Rejected,
        }
    }
}

/// One entry in a subject's append-only moderation log. The entry with the
/// highest `sequence` is the one in effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationAction {
    pub subject: SubjectId,
    pub sequence: u64,
    pub decision: Decision,
    pub admin: AdminId,
    pub prior_status: ClaimStatus,
    pub prior_decided_by: DecidedBy,
    pub resulting_status: ClaimStatus,
    pub decided_at: Timestamp,
}
