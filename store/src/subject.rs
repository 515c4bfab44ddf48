//! Subject registry trait.

use crate::StoreError;
use dareboard_types::{Subject, SubjectId};

/// Registry of the subjects claims may be made against.
pub trait SubjectStore: Send + Sync {
    /// Register a subject. Fails with [`StoreError::Duplicate`] if the id is taken.
    fn put_subject(&self, subject: &Subject) -> Result<(), StoreError>;

    /// Look up a subject by id.
    fn get_subject(&self, id: &SubjectId) -> Result<Option<Subject>, StoreError>;
}
