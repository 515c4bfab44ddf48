//! Tunables for reconciliation and moderation.

use std::time::Duration;

use dareboard_types::AdminId;

/// Parameters shared by the engine and the moderation gate.
#[derive(Clone, Debug)]
pub struct VerificationParams {
    /// Deadline for a single fact fetch.
    pub fact_timeout: Duration,
    /// Votes the leading address needs before a tally can verify a winner.
    pub min_winning_votes: u64,
    /// Whether admins may re-decide Verified or Rejected records.
    pub allow_terminal_override: bool,
    /// Moderator allowlist. Empty means any well-formed identity is accepted.
    pub admins: Vec<AdminId>,
}

impl Default for VerificationParams {
    fn default() -> Self {
        Self {
            fact_timeout: Duration::from_secs(10),
            min_winning_votes: 1,
            allow_terminal_override: true,
            admins: Vec::new(),
        }
    }
}
