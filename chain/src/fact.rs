//! Ground truth fetched from the chain for one subject.

use dareboard_types::Address;
use serde::{Deserialize, Serialize};

/// A fact as reported by the chain node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    /// Votes cast on a dare, per candidate address.
    VoteTally {
        finalized: bool,
        tallies: Vec<(Address, u64)>,
    },
    /// The transaction that filled a campaign slot, if any yet.
    SlotFill {
        finalized: bool,
        holder: Option<Address>,
        tx_hash: Option<String>,
    },
    /// Points awarded on-chain in a batch.
    PointsAward {
        finalized: bool,
        holder: Address,
        amount: u64,
    },
}

impl Fact {
    /// Whether the chain considers this fact final.
    pub fn is_finalized(&self) -> bool {
        match self {
            Self::VoteTally { finalized, .. }
            | Self::SlotFill { finalized, .. }
            | Self::PointsAward { finalized, .. } => *finalized,
        }
    }
}
