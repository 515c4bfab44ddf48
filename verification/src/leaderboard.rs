//! Leaderboard: a read view derived from verification records.
//!
//! Standings are recomputed from the records on every call; nothing here is
//! stored or updated incrementally.

use std::collections::BTreeMap;

use dareboard_types::{Address, ClaimStatus, ClaimedOutcome, VerificationRecord};
use serde::Serialize;

/// One address's standing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub address: Address,
    pub points: u64,
    pub dare_wins: u32,
    pub slots_filled: u32,
}

impl Standing {
    fn new(address: Address) -> Self {
        Self {
            address,
            points: 0,
            dare_wins: 0,
            slots_filled: 0,
        }
    }
}

/// Aggregate Verified records by winning address.
///
/// Ordered by points, then dare wins (both descending), then address.
pub fn leaderboard(records: &[VerificationRecord]) -> Vec<Standing> {
    let mut by_address: BTreeMap<Address, Standing> = BTreeMap::new();

    for record in records.iter().filter(|r| r.status == ClaimStatus::Verified) {
        let Some(winner) = record.winner else {
            continue;
        };
        let standing = by_address
            .entry(winner)
            .or_insert_with(|| Standing::new(winner));
        match &record.outcome {
            ClaimedOutcome::Winner(_) => standing.dare_wins += 1,
            ClaimedOutcome::SlotHolder(_) => standing.slots_filled += 1,
            ClaimedOutcome::Points { amount, .. } => {
                standing.points = standing.points.saturating_add(*amount)
            }
        }
    }

    let mut standings: Vec<Standing> = by_address.into_values().collect();
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.dare_wins.cmp(&a.dare_wins))
            .then(a.address.cmp(&b.address))
    });
    standings
}
