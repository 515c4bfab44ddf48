//! Abstract storage traits for Dareboard.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod moderation;
pub mod record;
pub mod subject;

use std::sync::Arc;

pub use error::StoreError;
pub use moderation::ModerationStore;
pub use record::{RecordStore, WriteOutcome};
pub use subject::SubjectStore;

/// Shared handles to the three stores, as wired into the engine and API.
#[derive(Clone)]
pub struct Stores {
    pub subjects: Arc<dyn SubjectStore>,
    pub records: Arc<dyn RecordStore>,
    pub moderation: Arc<dyn ModerationStore>,
}
