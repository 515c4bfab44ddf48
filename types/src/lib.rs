//! Fundamental types for Dareboard claim verification.
//!
//! Addresses, subjects, claims, verification records and moderation actions
//! shared by every other crate in the workspace. Untrusted strings become
//! these types only through the validating constructors defined here.

pub mod address;
pub mod claim;
pub mod error;
pub mod record;
pub mod subject;
pub mod time;

pub use address::Address;
pub use claim::{Claim, ClaimStatus, ClaimedOutcome};
pub use error::TypeError;
pub use record::{AdminId, DecidedBy, Decision, ModerationAction, VerificationRecord};
pub use subject::{Subject, SubjectId, SubjectKind};
pub use time::{Clock, SystemClock, Timestamp};
