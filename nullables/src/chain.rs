//! Nullable fact source: programmable chain facts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dareboard_chain::{ChainError, Fact, FactSource};
use dareboard_types::SubjectId;

/// How the source answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactMode {
    /// Serve the configured facts.
    Available,
    /// Fail every fetch with [`ChainError::Unavailable`].
    Unavailable,
    /// Never answer.
    Hang,
}

/// A fact source whose answers are set by the test.
pub struct NullFactSource {
    facts: Mutex<HashMap<SubjectId, Fact>>,
    mode: Mutex<FactMode>,
    delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

impl NullFactSource {
    pub fn new() -> Self {
        Self {
            facts: Mutex::new(HashMap::new()),
            mode: Mutex::new(FactMode::Available),
            delay: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Set the fact reported for a subject.
    pub fn set_fact(&self, subject: &SubjectId, fact: Fact) {
        self.facts.lock().unwrap().insert(subject.clone(), fact);
    }

    pub fn set_mode(&self, mode: FactMode) {
        *self.mode.lock().unwrap() = mode;
    }

    /// Delay every answer, to widen race windows in concurrency tests.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Number of fetches attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for NullFactSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FactSource for NullFactSource {
    async fn fetch_fact(&self, subject: &SubjectId) -> Result<Fact, ChainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mode = *self.mode.lock().unwrap();
        match mode {
            FactMode::Available => self
                .facts
                .lock()
                .unwrap()
                .get(subject)
                .cloned()
                .ok_or_else(|| ChainError::Malformed(format!("no fact for subject {subject}"))),
            FactMode::Unavailable => Err(ChainError::Unavailable("null source offline".into())),
            FactMode::Hang => std::future::pending().await,
        }
    }
}
