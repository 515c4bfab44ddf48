//! LMDB storage backend for Dareboard.
//!
//! Implements the storage traits from `dareboard-store` using the `heed` LMDB
//! bindings. Subjects, records and the moderation log are three databases
//! within a single environment, so a review can update a record and append
//! to the log in one write transaction.

pub mod environment;
pub mod error;
pub mod moderation;
pub mod record;
pub mod subject;

pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
pub use moderation::LmdbModerationStore;
pub use record::LmdbRecordStore;
pub use subject::LmdbSubjectStore;
