use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ingest::users::UserDictionary;

/// State shared by every parse call of one ingestion run.
///
/// The dictionary is frozen before the context exists; the anomaly list and counters are the
/// only mutable parts and accept concurrent appends.
#[derive(Debug)]
pub struct RunContext {
    users: UserDictionary,
    anomalies: Mutex<Vec<String>>,
    dropped: AtomicU64,
}

impl RunContext {
    /// Create a context around a finalized dictionary.
    pub fn new(users: UserDictionary) -> Self {
        Self {
            users,
            anomalies: Mutex::new(Vec::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// The frozen user dictionary.
    pub fn users(&self) -> &UserDictionary {
        &self.users
    }

    /// Record a verbatim anomalous source line.
    pub fn push_anomaly(&self, line: &str) {
        self.anomalies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_owned());
    }

    pub(crate) fn count_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of silently dropped records so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Number of anomalies recorded so far.
    pub fn anomaly_count(&self) -> usize {
        self.anomalies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Consume the context, returning the anomaly lines.
    pub fn into_anomalies(self) -> Vec<String> {
        self.anomalies
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/context.rs"]
mod tests;
