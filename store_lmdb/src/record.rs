//! LMDB implementation of RecordStore.
//!
//! Records are keyed by subject id. The conditional write reads the current
//! status and writes inside one write transaction; LMDB admits a single
//! writer at a time, so no other commit can interleave.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn, RwTxn};
use tracing::debug;

use dareboard_store::{RecordStore, StoreError, WriteOutcome};
use dareboard_types::{ClaimStatus, SubjectId, VerificationRecord};

use crate::LmdbError;

pub struct LmdbRecordStore {
    pub(crate) env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
}

pub(crate) fn read_record(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    subject: &SubjectId,
) -> Result<Option<VerificationRecord>, LmdbError> {
    db.get(txn, subject.as_str().as_bytes())?
        .map(bincode::deserialize::<VerificationRecord>)
        .transpose()
        .map_err(LmdbError::from)
}

/// Check the stored status against `expected_prior` and, if it matches, put
/// `record`. The caller commits the transaction.
pub(crate) fn check_and_put(
    db: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn,
    subject: &SubjectId,
    expected_prior: Option<ClaimStatus>,
    record: &VerificationRecord,
) -> Result<WriteOutcome, LmdbError> {
    let actual = read_record(db, wtxn, subject)?.map(|r| r.status);
    if actual != expected_prior {
        debug!(%subject, ?expected_prior, ?actual, "conditional write conflict");
        return Ok(WriteOutcome::Conflict { actual });
    }
    let value = bincode::serialize(record)?;
    db.put(wtxn, subject.as_str().as_bytes(), &value)?;
    Ok(WriteOutcome::Committed)
}

impl RecordStore for LmdbRecordStore {
    fn read(&self, subject: &SubjectId) -> Result<Option<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(read_record(&self.records_db, &rtxn, subject)?)
    }

    fn conditional_write(
        &self,
        subject: &SubjectId,
        expected_prior: Option<ClaimStatus>,
        record: &VerificationRecord,
    ) -> Result<WriteOutcome, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let outcome = check_and_put(&self.records_db, &mut wtxn, subject, expected_prior, record)?;
        if outcome == WriteOutcome::Committed {
            wtxn.commit().map_err(LmdbError::from)?;
        }
        Ok(outcome)
    }

    fn iter_records(&self) -> Result<Vec<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut records = Vec::new();
        let iter = self.records_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let record: VerificationRecord =
                bincode::deserialize(val).map_err(LmdbError::from)?;
            records.push(record);
        }
        Ok(records)
    }
}
