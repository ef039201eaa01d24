//! Append-only history of store snapshots.
//!
//! Each entry pairs the timestamp of a timestamped write with a copy of the
//! mapping as it stood *before* that write. Entries are kept in call order,
//! never sorted, so callers that supply timestamps out of order see their
//! calls replayed in the order they were made.

use std::collections::HashMap;

use crate::time::Timestamp;

use super::record::FileRecord;

/// Live mapping from file name to record.
pub type Snapshot = HashMap<String, FileRecord>;

/// A single recorded point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    timestamp: Timestamp,
    snapshot: Snapshot,
}

impl HistoryEntry {
    pub fn new(timestamp: Timestamp, snapshot: Snapshot) -> Self {
        Self {
            timestamp,
            snapshot,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Ordered log of [`HistoryEntry`] values.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an independent copy of `files` tagged with `timestamp`.
    pub fn record(&mut self, timestamp: Timestamp, files: &Snapshot) {
        self.entries.push(HistoryEntry::new(timestamp, files.clone()));
    }

    /// The snapshot a rollback to `timestamp` restores.
    ///
    /// Scans in recorded order and keeps the last entry tagged at or before
    /// `timestamp`. With out-of-order tags this is not necessarily the entry
    /// with the greatest qualifying timestamp.
    pub fn latest_at_or_before(&self, timestamp: Timestamp) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.timestamp <= timestamp)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
