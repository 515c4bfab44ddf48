//! LMDB implementation of ModerationStore.
//!
//! Actions use composite keys `subject_bytes ++ 0x00 ++ sequence_be` so a
//! subject's log is a contiguous, ordered prefix range. Subject ids never
//! contain a NUL byte.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use dareboard_store::{ModerationStore, StoreError, WriteOutcome};
use dareboard_types::{ClaimStatus, ModerationAction, SubjectId, VerificationRecord};

use crate::record::{check_and_put, read_record};
use crate::LmdbError;

pub struct LmdbModerationStore {
    pub(crate) env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
    pub(crate) moderation_db: Database<Bytes, Bytes>,
}

fn subject_prefix(subject: &SubjectId) -> Vec<u8> {
    let mut prefix = subject.as_str().as_bytes().to_vec();
    prefix.push(0);
    prefix
}

fn action_key(subject: &SubjectId, sequence: u64) -> Vec<u8> {
    let mut key = subject_prefix(subject);
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

/// Prefix range-scan over one subject's log.
fn scan_actions(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    subject: &SubjectId,
) -> Result<Vec<ModerationAction>, LmdbError> {
    let lower = subject_prefix(subject);
    let mut upper = subject.as_str().as_bytes().to_vec();
    upper.push(1);
    let bounds = (
        Bound::Included(lower.as_slice()),
        Bound::Excluded(upper.as_slice()),
    );
    let mut actions = Vec::new();
    for result in db.range(txn, &bounds)? {
        let (_key, val) = result?;
        actions.push(bincode::deserialize(val)?);
    }
    Ok(actions)
}

impl ModerationStore for LmdbModerationStore {
    fn commit_review(
        &self,
        expected_prior: ClaimStatus,
        record: &VerificationRecord,
        action: &ModerationAction,
    ) -> Result<WriteOutcome, StoreError> {
        let subject = &record.subject;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let logged = scan_actions(&self.moderation_db, &wtxn, subject)?.len() as u64;
        if action.sequence != logged {
            let actual = read_record(&self.records_db, &wtxn, subject)?.map(|r| r.status);
            return Ok(WriteOutcome::Conflict { actual });
        }

        let outcome = check_and_put(
            &self.records_db,
            &mut wtxn,
            subject,
            Some(expected_prior),
            record,
        )?;
        if outcome != WriteOutcome::Committed {
            return Ok(outcome);
        }

        let value = bincode::serialize(action).map_err(LmdbError::from)?;
        self.moderation_db
            .put(&mut wtxn, &action_key(subject, action.sequence), &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(WriteOutcome::Committed)
    }

    fn actions_for(&self, subject: &SubjectId) -> Result<Vec<ModerationAction>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_actions(&self.moderation_db, &rtxn, subject)?)
    }
}
