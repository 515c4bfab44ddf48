//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dareboard_store::{
    ModerationStore, RecordStore, StoreError, Stores, SubjectStore, WriteOutcome,
};
use dareboard_types::{ClaimStatus, ModerationAction, Subject, SubjectId, VerificationRecord};

#[derive(Default)]
struct State {
    subjects: HashMap<SubjectId, Subject>,
    records: BTreeMap<SubjectId, VerificationRecord>,
    actions: HashMap<SubjectId, Vec<ModerationAction>>,
}

/// An in-memory subject, record and moderation store for testing.
///
/// All tables live behind one mutex, so every trait method is atomic with
/// respect to the others. Counts reads and writes for assertions.
#[derive(Default)]
pub struct NullStore {
    state: Mutex<State>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a shared store as the three trait objects the engine takes.
    pub fn stores(store: &Arc<Self>) -> Stores {
        Stores {
            subjects: Arc::clone(store) as Arc<dyn SubjectStore>,
            records: Arc::clone(store) as Arc<dyn RecordStore>,
            moderation: Arc::clone(store) as Arc<dyn ModerationStore>,
        }
    }

    /// Number of record or moderation reads served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of committed record or moderation writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SubjectStore for NullStore {
    fn put_subject(&self, subject: &Subject) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.subjects.contains_key(&subject.id) {
            return Err(StoreError::Duplicate(subject.id.to_string()));
        }
        state.subjects.insert(subject.id.clone(), subject.clone());
        Ok(())
    }

    fn get_subject(&self, id: &SubjectId) -> Result<Option<Subject>, StoreError> {
        Ok(self.state.lock().unwrap().subjects.get(id).cloned())
    }
}

impl RecordStore for NullStore {
    fn read(&self, subject: &SubjectId) -> Result<Option<VerificationRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().records.get(subject).cloned())
    }

    fn conditional_write(
        &self,
        subject: &SubjectId,
        expected_prior: Option<ClaimStatus>,
        record: &VerificationRecord,
    ) -> Result<WriteOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        let actual = state.records.get(subject).map(|r| r.status);
        if actual != expected_prior {
            return Ok(WriteOutcome::Conflict { actual });
        }
        state.records.insert(subject.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(WriteOutcome::Committed)
    }

    fn iter_records(&self) -> Result<Vec<VerificationRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().records.values().cloned().collect())
    }
}

impl ModerationStore for NullStore {
    fn commit_review(
        &self,
        expected_prior: ClaimStatus,
        record: &VerificationRecord,
        action: &ModerationAction,
    ) -> Result<WriteOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        let actual = state.records.get(&record.subject).map(|r| r.status);
        let logged = state
            .actions
            .get(&record.subject)
            .map_or(0, |log| log.len() as u64);
        if actual != Some(expected_prior) || action.sequence != logged {
            return Ok(WriteOutcome::Conflict { actual });
        }
        state.records.insert(record.subject.clone(), record.clone());
        state
            .actions
            .entry(record.subject.clone())
            .or_default()
            .push(action.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(WriteOutcome::Committed)
    }

    fn actions_for(&self, subject: &SubjectId) -> Result<Vec<ModerationAction>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state
            .lock()
            .unwrap()
            .actions
            .get(subject)
            .cloned()
            .unwrap_or_default())
    }
}
