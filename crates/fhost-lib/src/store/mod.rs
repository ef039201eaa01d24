//! The versioned file-metadata store.
//!
//! [`FileStore`] holds the live name-to-record mapping and a [`History`] of
//! snapshots. Plain operations (`upload`, `get`, `copy`, `search`) act on the
//! live mapping only. The `*_at` variants take an ISO-8601 timestamp; the
//! mutating ones record a snapshot of the pre-mutation mapping, which
//! [`FileStore::rollback`] can later restore.
//!
//! # Example
//!
//! ```
//! use fhost_lib::store::FileStore;
//!
//! let mut store = FileStore::new();
//! store.upload_at("2023-01-01T00:00:00", "a", 1, None).unwrap();
//! store.upload_at("2023-01-01T00:00:10", "b", 2, None).unwrap();
//!
//! store.rollback("2023-01-01T00:00:10").unwrap();
//! assert_eq!(store.get("a"), Some(1));
//! assert_eq!(store.get("b"), None);
//! ```

mod history;
mod record;
pub mod shared;

pub use history::{History, HistoryEntry, Snapshot};
pub use record::FileRecord;
pub use shared::SharedFileStore;

use log::{debug, info};
use thiserror::Error;

use crate::time::{self, TimeError, Timestamp};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Time(#[from] TimeError),
}

/// In-memory file-metadata store with a snapshot history.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    files: Snapshot,
    history: History,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Plain operations
    // =========================================================================

    /// Add a file with no expiry.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the name is taken; the
    /// existing record is left untouched.
    pub fn upload(&mut self, name: &str, size: u64) -> Result<(), StoreError> {
        self.ensure_absent(name)?;
        debug!("upload: {} ({} bytes)", name, size);
        self.files.insert(name.to_string(), FileRecord::new(name, size));
        Ok(())
    }

    /// Size of the named file, or `None` if there is no such file.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.files.get(name).map(|record| record.size)
    }

    /// Duplicate `source` (size and expiry) under `dest`.
    ///
    /// An existing `dest` is replaced without error.
    pub fn copy(&mut self, source: &str, dest: &str) -> Result<(), StoreError> {
        let copy = self
            .files
            .get(source)
            .map(|record| record.renamed(dest))
            .ok_or_else(|| StoreError::NotFound(source.to_string()))?;

        if self.files.insert(dest.to_string(), copy).is_some() {
            debug!("copy: {} -> {} (overwrote existing)", source, dest);
        } else {
            debug!("copy: {} -> {}", source, dest);
        }
        Ok(())
    }

    /// Names starting with `prefix`, largest first, ties by name.
    pub fn search(&self, prefix: &str) -> Vec<String> {
        Self::ordered_names(self.files.values().filter(|r| r.name.starts_with(prefix)))
    }

    // =========================================================================
    // Timestamped operations
    // =========================================================================

    /// Add a file at `timestamp`, optionally expiring `ttl` seconds later.
    ///
    /// The collision check runs first, so a failed upload leaves no history
    /// entry behind. Otherwise the pre-upload mapping is recorded under
    /// `timestamp`.
    pub fn upload_at(
        &mut self,
        timestamp: &str,
        name: &str,
        size: u64,
        ttl: Option<f64>,
    ) -> Result<(), StoreError> {
        self.ensure_absent(name)?;
        let at = time::parse_timestamp(timestamp)?;
        let expiry = ttl.map(|secs| Self::expiry_for(at, secs)).transpose()?;

        self.history.record(at, &self.files);

        let record = match expiry {
            Some(expiry) => FileRecord::with_expiry(name, size, expiry),
            None => FileRecord::new(name, size),
        };
        debug!(
            "upload_at {}: {} ({} bytes, expiry {:?})",
            at, name, size, record.expiry
        );
        self.files.insert(name.to_string(), record);
        Ok(())
    }

    /// Size of the named file unless it is absent or expired strictly before `timestamp`.
    pub fn get_at(&self, timestamp: &str, name: &str) -> Result<Option<u64>, StoreError> {
        let at = time::parse_timestamp(timestamp)?;
        Ok(self
            .files
            .get(name)
            .filter(|record| !record.expired_before(at))
            .map(|record| record.size))
    }

    /// Record the current mapping under `timestamp`, then [`copy`](Self::copy).
    ///
    /// The history entry is kept even when the copy fails.
    pub fn copy_at(&mut self, timestamp: &str, source: &str, dest: &str) -> Result<(), StoreError> {
        let at = time::parse_timestamp(timestamp)?;
        self.history.record(at, &self.files);
        self.copy(source, dest)
    }

    /// Like [`search`](Self::search), but drops files expiring at or before `timestamp`.
    pub fn search_at(&self, timestamp: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let at = time::parse_timestamp(timestamp)?;
        Ok(Self::ordered_names(self.files.values().filter(|r| {
            r.name.starts_with(prefix) && r.alive_after(at)
        })))
    }

    /// Restore the snapshot of the last history entry tagged at or before `timestamp`.
    ///
    /// History is left intact, so a later rollback may move forward again.
    /// Does nothing if no entry qualifies.
    pub fn rollback(&mut self, timestamp: &str) -> Result<(), StoreError> {
        let at = time::parse_timestamp(timestamp)?;
        match self.history.latest_at_or_before(at) {
            Some(entry) => {
                info!(
                    "rollback to {}: restoring snapshot from {} ({} files)",
                    at,
                    entry.timestamp(),
                    entry.snapshot().len()
                );
                self.files = entry.snapshot().clone();
            }
            None => debug!("rollback to {}: no history entry qualifies", at),
        }
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Number of live files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn record(&self, name: &str) -> Option<&FileRecord> {
        self.files.get(name)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    fn ensure_absent(&self, name: &str) -> Result<(), StoreError> {
        if self.files.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        Ok(())
    }

    fn expiry_for(at: Timestamp, ttl_secs: f64) -> Result<Timestamp, StoreError> {
        let ttl = time::ttl_duration(ttl_secs)?;
        at.checked_add_signed(ttl)
            .ok_or(StoreError::Time(TimeError::InvalidTtl(ttl_secs)))
    }

    // Sort by name first so the stable size sort keeps name order within a size.
    fn ordered_names<'a>(records: impl Iterator<Item = &'a FileRecord>) -> Vec<String> {
        let mut matches: Vec<&FileRecord> = records.collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches.sort_by(|a, b| b.size.cmp(&a.size));
        matches.into_iter().map(|r| r.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: &str = "2023-01-01T00:00:00";

    #[test]
    fn test_upload_and_get() {
        let mut store = FileStore::new();
        store.upload("a.txt", 10).unwrap();

        assert_eq!(store.get("a.txt"), Some(10));
        assert_eq!(store.len(), 1);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_duplicate_upload_fails() {
        let mut store = FileStore::new();
        store.upload("a.txt", 10).unwrap();

        let result = store.upload("a.txt", 20);
        assert_eq!(result, Err(StoreError::AlreadyExists("a.txt".to_string())));
        assert_eq!(store.get("a.txt"), Some(10));
    }

    #[test]
    fn test_get_unknown_is_none() {
        let store = FileStore::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_copy_missing_source() {
        let mut store = FileStore::new();
        let result = store.copy("missing", "dest");
        assert_eq!(result, Err(StoreError::NotFound("missing".to_string())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_copy_overwrites_dest() {
        let mut store = FileStore::new();
        store.upload_at(T0, "src", 5, Some(60.0)).unwrap();
        store.upload("dest", 100).unwrap();

        store.copy("src", "dest").unwrap();

        let copied = store.record("dest").unwrap();
        assert_eq!(copied.name, "dest");
        assert_eq!(copied.size, 5);
        assert_eq!(copied.expiry, store.record("src").unwrap().expiry);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_search_ordering() {
        let mut store = FileStore::new();
        store.upload("a", 10).unwrap();
        store.upload("b", 20).unwrap();
        store.upload("ab", 20).unwrap();

        assert_eq!(store.search(""), vec!["ab", "b", "a"]);
        assert_eq!(store.search("a"), vec!["ab", "a"]);
        assert!(store.search("zzz").is_empty());
    }

    #[test]
    fn test_get_at_expiry_boundary() {
        let mut store = FileStore::new();
        store.upload_at(T0, "f", 5, Some(60.0)).unwrap();

        assert_eq!(store.get_at("2023-01-01T00:00:59", "f").unwrap(), Some(5));
        assert_eq!(store.get_at("2023-01-01T00:01:00", "f").unwrap(), Some(5));
        assert_eq!(store.get_at("2023-01-01T00:01:01", "f").unwrap(), None);
        assert_eq!(store.get_at("2023-01-01T00:01:01", "nope").unwrap(), None);
    }

    #[test]
    fn test_get_at_does_not_evict() {
        let mut store = FileStore::new();
        store.upload_at(T0, "f", 5, Some(1.0)).unwrap();

        assert_eq!(store.get_at("2024-01-01T00:00:00", "f").unwrap(), None);
        assert_eq!(store.get("f"), Some(5));
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_search_at_excludes_exact_boundary() {
        let mut store = FileStore::new();
        store.upload_at(T0, "f1", 5, Some(60.0)).unwrap();
        store.upload_at(T0, "f2", 3, None).unwrap();

        assert_eq!(
            store.search_at("2023-01-01T00:00:59", "f").unwrap(),
            vec!["f1", "f2"]
        );
        assert_eq!(store.search_at("2023-01-01T00:01:00", "f").unwrap(), vec!["f2"]);
        // get_at still sees the file at the same instant
        assert_eq!(store.get_at("2023-01-01T00:01:00", "f1").unwrap(), Some(5));
    }

    #[test]
    fn test_upload_at_failure_records_no_history() {
        let mut store = FileStore::new();
        store.upload_at(T0, "a", 1, None).unwrap();

        let result = store.upload_at("2023-01-01T00:00:05", "a", 2, None);
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_upload_at_snapshot_is_pre_mutation() {
        let mut store = FileStore::new();
        store.upload_at(T0, "a", 1, None).unwrap();

        let entry = &store.history()[0];
        assert!(entry.snapshot().is_empty());
    }

    #[test]
    fn test_copy_at_records_history_even_on_failure() {
        let mut store = FileStore::new();
        let result = store.copy_at(T0, "missing", "dest");

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_invalid_timestamp_records_no_history() {
        let mut store = FileStore::new();
        assert!(matches!(
            store.upload_at("not a time", "a", 1, None),
            Err(StoreError::Time(_))
        ));
        assert!(matches!(
            store.copy_at("not a time", "a", "b"),
            Err(StoreError::Time(_))
        ));
        assert!(store.history().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_negative_ttl_rejected() {
        let mut store = FileStore::new();
        let result = store.upload_at(T0, "a", 1, Some(-5.0));
        assert_eq!(
            result,
            Err(StoreError::Time(TimeError::InvalidTtl(-5.0)))
        );
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_rollback_round_trip() {
        let t1 = "2023-01-01T00:00:00";
        let t2 = "2023-01-01T00:00:10";
        let mut store = FileStore::new();
        store.upload_at(t1, "a", 1, None).unwrap();
        store.upload_at(t2, "b", 2, None).unwrap();

        // t2's snapshot was taken before "b" existed
        store.rollback(t2).unwrap();
        assert_eq!(store.get("a"), Some(1));
        assert_eq!(store.get("b"), None);

        // t1's snapshot predates both uploads
        store.rollback(t1).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_rollback_after_latest_write_restores_pre_write_state() {
        let mut store = FileStore::new();
        store.upload_at("2023-01-01T00:00:00", "a", 1, None).unwrap();
        store.upload_at("2023-01-01T00:00:10", "b", 2, None).unwrap();
        store.upload_at("2023-01-01T00:00:20", "c", 3, None).unwrap();

        store.rollback("2023-01-01T00:00:20").unwrap();
        assert_eq!(store.search(""), vec!["b", "a"]);
    }

    #[test]
    fn test_rollback_can_move_forward() {
        let mut store = FileStore::new();
        store.upload_at("2023-01-01T00:00:00", "a", 1, None).unwrap();
        store.upload_at("2023-01-01T00:00:10", "b", 2, None).unwrap();
        store.upload_at("2023-01-01T00:00:20", "c", 3, None).unwrap();

        store.rollback("2023-01-01T00:00:00").unwrap();
        assert!(store.is_empty());

        store.rollback("2023-01-01T00:00:20").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.history().len(), 3);
    }

    #[test]
    fn test_rollback_without_qualifying_entry_is_noop() {
        let mut store = FileStore::new();
        store.upload("plain", 7).unwrap();
        store.rollback("2023-01-01T00:00:00").unwrap();
        assert_eq!(store.get("plain"), Some(7));

        store.upload_at("2023-06-01T00:00:00", "later", 1, None).unwrap();
        store.rollback("2023-01-01T00:00:00").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rollback_is_idempotent() {
        let mut store = FileStore::new();
        store.upload_at("2023-01-01T00:00:00", "a", 1, None).unwrap();
        store.upload_at("2023-01-01T00:00:10", "b", 2, None).unwrap();
        store.copy_at("2023-01-01T00:00:20", "a", "c").unwrap();

        store.rollback("2023-01-01T00:00:15").unwrap();
        let first = store.search("");
        store.rollback("2023-01-01T00:00:15").unwrap();
        assert_eq!(store.search(""), first);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_writes() {
        let mut store = FileStore::new();
        store.upload_at("2023-01-01T00:00:00", "a", 1, None).unwrap();
        store.copy_at("2023-01-01T00:00:10", "a", "b").unwrap();
        store.upload("c", 3).unwrap();
        store.copy("c", "a").unwrap();

        let snapshot = store.history()[1].snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["a"].size, 1);
    }
}
