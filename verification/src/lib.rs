//! Claim verification for Dareboard.
//!
//! A claim ("this address won dare-1") flows through:
//! 1. **Reconciliation**: the claimed outcome is compared with the chain's
//!    fact for the subject: matched, mismatched, or ambiguous.
//! 2. **Commit**: the engine writes one record per subject through a
//!    conditional write, holding a per-subject lock for the whole cycle.
//! 3. **Moderation**: ambiguous (and, by policy, terminal) records can be
//!    approved or denied by an administrator, leaving an audit log entry.
//!
//! The leaderboard is derived from the committed records on demand.

pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod locks;
pub mod moderation;
pub mod params;
pub mod reconcile;

pub use engine::VerificationEngine;
pub use error::VerificationError;
pub use leaderboard::{leaderboard, Standing};
pub use locks::SubjectLocks;
pub use moderation::ModerationGate;
pub use params::VerificationParams;
pub use reconcile::{reconcile, Verdict};
