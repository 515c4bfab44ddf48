//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use dareboard_store::Stores;

use crate::moderation::LmdbModerationStore;
use crate::record::LmdbRecordStore;
use crate::subject::LmdbSubjectStore;
use crate::LmdbError;

const MAX_DBS: u32 = 3;

/// Default map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    subjects_db: Database<Bytes, Bytes>,
    records_db: Database<Bytes, Bytes>,
    moderation_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and the data
        // directory is not shared with other processes mapping it differently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let subjects_db = env.create_database(&mut wtxn, Some("subjects"))?;
        let records_db = env.create_database(&mut wtxn, Some("records"))?;
        let moderation_db = env.create_database(&mut wtxn, Some("moderation"))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            subjects_db,
            records_db,
            moderation_db,
        })
    }

    pub fn subject_store(&self) -> LmdbSubjectStore {
        LmdbSubjectStore {
            env: Arc::clone(&self.env),
            subjects_db: self.subjects_db,
        }
    }

    pub fn record_store(&self) -> LmdbRecordStore {
        LmdbRecordStore {
            env: Arc::clone(&self.env),
            records_db: self.records_db,
        }
    }

    pub fn moderation_store(&self) -> LmdbModerationStore {
        LmdbModerationStore {
            env: Arc::clone(&self.env),
            records_db: self.records_db,
            moderation_db: self.moderation_db,
        }
    }

    /// All three stores, sharing this environment.
    pub fn stores(&self) -> Stores {
        Stores {
            subjects: Arc::new(self.subject_store()),
            records: Arc::new(self.record_store()),
            moderation: Arc::new(self.moderation_store()),
        }
    }
}
