//! LMDB implementation of SubjectStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dareboard_store::{StoreError, SubjectStore};
use dareboard_types::{Subject, SubjectId};

use crate::LmdbError;

pub struct LmdbSubjectStore {
    pub(crate) env: Arc<Env>,
    pub(crate) subjects_db: Database<Bytes, Bytes>,
}

impl SubjectStore for LmdbSubjectStore {
    fn put_subject(&self, subject: &Subject) -> Result<(), StoreError> {
        let key = subject.id.as_str().as_bytes();
        let value = bincode::serialize(subject).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .subjects_db
            .get(&wtxn, key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(subject.id.to_string()));
        }
        self.subjects_db
            .put(&mut wtxn, key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_subject(&self, id: &SubjectId) -> Result<Option<Subject>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let subject = self
            .subjects_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .map(bincode::deserialize::<Subject>)
            .transpose()
            .map_err(LmdbError::from)?;
        Ok(subject)
    }
}
