//! Lock-wrapped store handle for use across threads.
//!
//! Every method takes the single store lock for its full duration, so
//! compound operations such as `upload_at` (check, snapshot, insert) and
//! `rollback` (scan, replace) are never observed half-done.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{FileRecord, FileStore, StoreError};

/// Cloneable, thread-safe handle to a [`FileStore`].
#[derive(Clone, Default)]
pub struct SharedFileStore {
    inner: Arc<Mutex<FileStore>>,
}

impl SharedFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: FileStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn upload(&self, name: &str, size: u64) -> Result<(), StoreError> {
        self.lock().upload(name, size)
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.lock().get(name)
    }

    pub fn copy(&self, source: &str, dest: &str) -> Result<(), StoreError> {
        self.lock().copy(source, dest)
    }

    pub fn search(&self, prefix: &str) -> Vec<String> {
        self.lock().search(prefix)
    }

    pub fn upload_at(
        &self,
        timestamp: &str,
        name: &str,
        size: u64,
        ttl: Option<f64>,
    ) -> Result<(), StoreError> {
        self.lock().upload_at(timestamp, name, size, ttl)
    }

    pub fn get_at(&self, timestamp: &str, name: &str) -> Result<Option<u64>, StoreError> {
        self.lock().get_at(timestamp, name)
    }

    pub fn copy_at(&self, timestamp: &str, source: &str, dest: &str) -> Result<(), StoreError> {
        self.lock().copy_at(timestamp, source, dest)
    }

    pub fn search_at(&self, timestamp: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.lock().search_at(timestamp, prefix)
    }

    pub fn rollback(&self, timestamp: &str) -> Result<(), StoreError> {
        self.lock().rollback(timestamp)
    }

    pub fn record(&self, name: &str) -> Option<FileRecord> {
        self.lock().record(name).cloned()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history().len()
    }

    /// Run `f` against the store while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut FileStore) -> R) -> R {
        f(&mut self.lock())
    }

    /// Helper to lock the inner mutex. Operations validate before they
    /// write, so a poisoned lock still guards a consistent store.
    fn lock(&self) -> MutexGuard<'_, FileStore> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SharedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.lock();
        f.debug_struct("SharedFileStore")
            .field("files", &store.len())
            .field("history", &store.history().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_uploads_are_unique() {
        let store = SharedFileStore::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    (0..50)
                        .filter(|j| {
                            store
                                .upload_at("2023-01-01T00:00:00", &format!("f{}", j), i, None)
                                .is_ok()
                        })
                        .count()
                })
            })
            .collect();

        let successes: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(successes, 50);
        assert_eq!(store.history_len(), 50);
        assert_eq!(store.search("f").len(), 50);
    }

    #[test]
    fn test_with_exposes_store() {
        let store = SharedFileStore::new();
        store.upload("a", 1).unwrap();
        store.copy("a", "b").unwrap();

        let names = store.with(|s| s.search(""));
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(store.record("b").unwrap().size, 1);
    }
}
