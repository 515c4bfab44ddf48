//! Reconciliation: compare a claimed outcome with the chain's fact.

use std::collections::BTreeMap;

use dareboard_chain::Fact;
use dareboard_types::{Address, ClaimStatus, ClaimedOutcome};

/// Why a claim received its status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The fact confirms the claimed outcome exactly.
    Matched,
    /// The fact contradicts the claimed outcome.
    Mismatched,
    /// The fact belongs to a different kind of subject than the claim.
    FactKindMismatch,
    /// The chain has not finalized the fact yet.
    NotFinalized,
    /// Two or more addresses share the top tally.
    Tie,
    /// Nobody has voted.
    NoVotes,
    /// The leader has fewer votes than the configured minimum.
    BelowQuorum,
    /// The slot has no holder on-chain yet.
    NotYetFilled,
}

impl Verdict {
    /// The record status this verdict commits.
    pub fn status(&self) -> ClaimStatus {
        match self {
            Self::Matched => ClaimStatus::Verified,
            Self::Mismatched | Self::FactKindMismatch => ClaimStatus::Rejected,
            Self::NotFinalized | Self::Tie | Self::NoVotes | Self::BelowQuorum | Self::NotYetFilled => {
                ClaimStatus::PendingReview
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Mismatched => "mismatched",
            Self::FactKindMismatch => "fact_kind_mismatch",
            Self::NotFinalized => "not_finalized",
            Self::Tie => "tie",
            Self::NoVotes => "no_votes",
            Self::BelowQuorum => "below_quorum",
            Self::NotYetFilled => "not_yet_filled",
        }
    }
}

/// Decide a claimed outcome against the chain's fact.
///
/// Unfinalized facts are always ambiguous. Otherwise the outcome must match
/// the fact exactly: same address, and for points the same amount.
pub fn reconcile(outcome: &ClaimedOutcome, fact: &Fact, min_winning_votes: u64) -> Verdict {
    if !fact.is_finalized() {
        return Verdict::NotFinalized;
    }

    match (outcome, fact) {
        (ClaimedOutcome::Winner(claimed), Fact::VoteTally { tallies, .. }) => {
            match tally_leader(tallies) {
                Leader::None => Verdict::NoVotes,
                Leader::Tied => Verdict::Tie,
                Leader::Single(_, votes) if votes < min_winning_votes => Verdict::BelowQuorum,
                Leader::Single(leader, _) if leader == *claimed => Verdict::Matched,
                Leader::Single(..) => Verdict::Mismatched,
            }
        }
        (ClaimedOutcome::SlotHolder(claimed), Fact::SlotFill { holder, .. }) => match holder {
            None => Verdict::NotYetFilled,
            Some(h) if h == claimed => Verdict::Matched,
            Some(_) => Verdict::Mismatched,
        },
        (
            ClaimedOutcome::Points { holder, amount },
            Fact::PointsAward {
                holder: on_chain_holder,
                amount: on_chain_amount,
                ..
            },
        ) => {
            if holder == on_chain_holder && amount == on_chain_amount {
                Verdict::Matched
            } else {
                Verdict::Mismatched
            }
        }
        _ => Verdict::FactKindMismatch,
    }
}

enum Leader {
    None,
    Tied,
    Single(Address, u64),
}

/// Find the address with the most votes. Repeated entries for one address
/// are summed first.
fn tally_leader(tallies: &[(Address, u64)]) -> Leader {
    let mut totals: BTreeMap<Address, u64> = BTreeMap::new();
    for (address, votes) in tallies {
        let total = totals.entry(*address).or_default();
        *total = total.saturating_add(*votes);
    }

    let top = totals.values().copied().max().unwrap_or(0);
    if top == 0 {
        return Leader::None;
    }

    let mut leaders = totals.iter().filter(|(_, v)| **v == top);
    match (leaders.next(), leaders.next()) {
        (Some((address, votes)), None) => Leader::Single(*address, *votes),
        _ => Leader::Tied,
    }
}
