//! The fact source capability.

use async_trait::async_trait;
use dareboard_types::SubjectId;

use crate::{ChainError, Fact};

/// Anything that can report the on-chain fact behind a subject.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn fetch_fact(&self, subject: &SubjectId) -> Result<Fact, ChainError>;
}
