//! Per-subject mutual exclusion for the read-decide-write cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use dareboard_types::SubjectId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of async locks, one per subject currently being decided.
///
/// Entries exist only while some caller holds or waits on them. The engine
/// and the moderation gate share one table so a review never interleaves
/// with a claim on the same subject.
#[derive(Default)]
pub struct SubjectLocks {
    table: Mutex<HashMap<SubjectId, Arc<AsyncMutex<()>>>>,
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `subject`.
    pub async fn acquire(&self, subject: &SubjectId) -> SubjectGuard<'_> {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(subject.clone()).or_default())
        };
        // Prunes on drop, including when this future is cancelled while
        // still waiting. The lock future is dropped first.
        let entry = TableEntry {
            locks: self,
            subject: subject.clone(),
        };
        let guard = lock.lock_owned().await;
        SubjectGuard {
            _guard: guard,
            _entry: entry,
        }
    }

    /// Number of subjects with a live lock entry.
    pub fn active(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn prune(&self, subject: &SubjectId) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters and holders each own a clone of the Arc, so a count of one
        // means nobody else is interested in this subject.
        if table
            .get(subject)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(subject);
        }
    }
}

/// A caller's interest in one table entry.
struct TableEntry<'a> {
    locks: &'a SubjectLocks,
    subject: SubjectId,
}

impl Drop for TableEntry<'_> {
    fn drop(&mut self) {
        self.locks.prune(&self.subject);
    }
}

/// Held for the duration of one decision; releases and prunes on drop.
pub struct SubjectGuard<'a> {
    // Field order matters: the mutex is released before the entry prunes.
    _guard: OwnedMutexGuard<()>,
    _entry: TableEntry<'a>,
}
