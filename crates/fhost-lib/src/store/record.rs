//! File metadata records.

use crate::time::Timestamp;

/// Metadata for a single stored file.
///
/// Only the name, size and optional expiry are tracked; no content is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Unique key within the store
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Absolute instant after which time-aware queries treat the file as gone
    pub expiry: Option<Timestamp>,
}

impl FileRecord {
    /// Create a record with no expiry.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            expiry: None,
        }
    }

    /// Create a record that expires at the given instant.
    pub fn with_expiry(name: impl Into<String>, size: u64, expiry: Timestamp) -> Self {
        Self {
            name: name.into(),
            size,
            expiry: Some(expiry),
        }
    }

    /// Duplicate this record under a different name, keeping size and expiry.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Whether `get_at` should hide this record: expiry strictly before `at`.
    pub fn expired_before(&self, at: Timestamp) -> bool {
        self.expiry.is_some_and(|expiry| expiry < at)
    }

    /// Whether `search_at` should keep this record: no expiry, or expiry strictly after `at`.
    pub fn alive_after(&self, at: Timestamp) -> bool {
        self.expiry.map_or(true, |expiry| expiry > at)
    }
}
