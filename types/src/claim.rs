//! Claims: inbound assertions that an address achieved an on-chain outcome.

use crate::address::Address;
use crate::subject::{SubjectId, SubjectKind};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome a claimant asserts for a subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimedOutcome {
    /// The address won a dare's vote.
    Winner(Address),
    /// The address filled a campaign slot.
    SlotHolder(Address),
    /// The address was awarded `amount` points in a batch.
    Points { holder: Address, amount: u64 },
}

impl ClaimedOutcome {
    /// The subject kind this outcome can be claimed against.
    pub fn kind(&self) -> SubjectKind {
        match self {
            Self::Winner(_) => SubjectKind::Dare,
            Self::SlotHolder(_) => SubjectKind::CampaignSlot,
            Self::Points { .. } => SubjectKind::PointsBatch,
        }
    }

    /// The address that would be recorded as the winner.
    pub fn address(&self) -> &Address {
        match self {
            Self::Winner(a) | Self::SlotHolder(a) => a,
            Self::Points { holder, .. } => holder,
        }
    }
}

/// A claim as accepted at the boundary. Every address inside is validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claimant: Address,
    pub subject: SubjectId,
    pub outcome: ClaimedOutcome,
    pub submitted_at: Timestamp,
}

/// Status of a verification record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    Verified,
    Rejected,
    PendingReview,
}

impl ClaimStatus {
    /// Verified and Rejected admit no further automatic transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::PendingReview => "pending_review",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
