//! Ephemeral job progress for polling clients.
//!
//! When a job starts, the label count and a rough duration estimate are
//! stored under the caller's job id. The first status poll takes the entry
//! out; later polls see `{labels: 0, time: 0}`. Entries never polled stay
//! until the process exits.
//!
//! Job ids are opaque caller-supplied strings. Nothing enforces uniqueness:
//! a second job with the same id overwrites the first one's entry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// What a status poll reports for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Labels found in the upload.
    pub labels: usize,
    /// Estimated seconds until the job finishes.
    pub time: f64,
}

impl ProgressEntry {
    /// `labels × delay_ms / 1000`, the same delay the converter sleeps.
    ///
    /// Ignores request latency and batch sizes above one, so it is only a
    /// hint for the client's countdown.
    pub fn estimate(labels: usize, delay_ms: u64) -> Self {
        Self {
            labels,
            time: labels as f64 * (delay_ms as f64 / 1000.0),
        }
    }
}

/// Key-value store behind the status endpoint.
///
/// `put` and `take` must each be atomic for a given key.
pub trait ProgressStore: Send + Sync {
    /// Store or overwrite the entry for `job_id`.
    fn put(&self, job_id: &str, entry: ProgressEntry);

    /// Remove and return the entry for `job_id`, if any.
    fn take(&self, job_id: &str) -> Option<ProgressEntry>;

    /// Record the estimate for a job that is about to start.
    fn record(&self, job_id: &str, labels: usize, delay_ms: u64) {
        self.put(job_id, ProgressEntry::estimate(labels, delay_ms));
    }

    /// Read-and-delete; absent ids report zeros.
    fn consume(&self, job_id: &str) -> ProgressEntry {
        self.take(job_id).unwrap_or_default()
    }
}

/// Mutex-guarded in-process [`ProgressStore`].
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    entries: Mutex<HashMap<String, ProgressEntry>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries currently waiting to be polled.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressStore for MemoryProgressStore {
    fn put(&self, job_id: &str, entry: ProgressEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id.to_string(), entry);
    }

    fn take(&self, job_id: &str) -> Option<ProgressEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn estimate_uses_delay_per_label() {
        let e = ProgressEntry::estimate(12, 1000);
        assert_eq!(e.labels, 12);
        assert_eq!(e.time, 12.0);
        assert_eq!(ProgressEntry::estimate(3, 500).time, 1.5);
        assert_eq!(ProgressEntry::estimate(0, 1000).time, 0.0);
    }

    #[test]
    fn consume_reads_once_then_defaults() {
        let store = MemoryProgressStore::new();
        store.record("job-1", 4, 250);

        assert_eq!(
            store.consume("job-1"),
            ProgressEntry {
                labels: 4,
                time: 1.0
            }
        );
        assert_eq!(store.consume("job-1"), ProgressEntry::default());
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_id_defaults_to_zero() {
        let store = MemoryProgressStore::new();
        let e = store.consume("never-seen");
        assert_eq!(e.labels, 0);
        assert_eq!(e.time, 0.0);
    }

    #[test]
    fn same_id_overwrites() {
        let store = MemoryProgressStore::new();
        store.record("dup", 1, 1000);
        store.record("dup", 9, 1000);
        assert_eq!(store.len(), 1);
        assert_eq!(store.consume("dup").labels, 9);
    }

    #[test]
    fn concurrent_writers_do_not_lose_entries() {
        let store = Arc::new(MemoryProgressStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store.record(&format!("{t}-{i}"), i, 1000);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }

    #[test]
    fn serialises_as_labels_and_time() {
        let json = serde_json::to_value(ProgressEntry::estimate(2, 1000)).unwrap();
        assert_eq!(json, serde_json::json!({ "labels": 2, "time": 2.0 }));
    }
}
