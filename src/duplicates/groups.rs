//! Duplicate grouping by canonical name and size.
//!
//! # Overview
//!
//! Two files are *candidate duplicates* when they share a [`GroupKey`]:
//! the same canonical name and the same byte size. Content is never
//! compared, so a group is a necessary but not sufficient sign of
//! duplication.
//!
//! # Example
//!
//! ```
//! use halcyon::duplicates::{GroupKey, ScanResult};
//!
//! let result = ScanResult::default();
//! assert_eq!(result.duplicates().count(), 0);
//!
//! let key = GroupKey::new("document.txt", 1024);
//! assert_eq!(key.to_string(), "document.txt (1024 bytes)");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::scanner::FileRecord;

/// Identity of a duplicate group.
///
/// Derived only from the canonical name and size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    /// Canonical (normalized) file name
    pub canonical_name: String,
    /// File size in bytes
    pub size: u64,
}

impl GroupKey {
    /// Create a key from a canonical name and size.
    #[must_use]
    pub fn new(canonical_name: impl Into<String>, size: u64) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            size,
        }
    }

    /// The key a record belongs to.
    #[must_use]
    pub fn of(record: &FileRecord) -> Self {
        Self::new(record.canonical_name.clone(), record.size)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.canonical_name, self.size)
    }
}

/// Files sharing a [`GroupKey`], in the order they were added.
///
/// In parallel mode the order reflects task completion, not discovery.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// Shared key of every member
    pub key: GroupKey,
    /// Members of the group
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create an empty group for a key.
    #[must_use]
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            files: Vec::new(),
        }
    }

    /// Append a record.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if the record belongs to another key.
    pub fn push(&mut self, record: FileRecord) {
        debug_assert_eq!(
            (record.canonical_name.as_str(), record.size),
            (self.key.canonical_name.as_str(), self.key.size),
            "record does not belong to group {}",
            self.key
        );
        self.files.push(record);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether the group is actionable (2+ files).
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.files.len() > 1
    }

    /// Space freed by keeping one copy.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.key.size * (self.files.len() as u64).saturating_sub(1)
    }
}

/// Counters accumulated over a scan.
///
/// On a completed scan `total_visited == processed + skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Every non-directory entry seen
    pub total_visited: u64,
    /// Files that passed the filters and were grouped
    pub processed: u64,
    /// Files rejected by the extension or size filter
    pub skipped: u64,
}

impl ScanStats {
    /// Whether the counters add up.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total_visited == self.processed + self.skipped
    }
}

/// Everything a traversal produces.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// All groups, including single-member ones
    pub groups: HashMap<GroupKey, DuplicateGroup>,
    /// Scan counters
    pub stats: ScanStats,
}

impl ScanResult {
    /// Add a classified record to its group and count it as processed.
    pub fn insert(&mut self, record: FileRecord) {
        let key = GroupKey::of(&record);
        self.groups
            .entry(key)
            .or_insert_with_key(|key| DuplicateGroup::new(key.clone()))
            .push(record);
        self.stats.processed += 1;
    }

    /// Groups with two or more members, ordered by key.
    pub fn duplicates(&self) -> impl Iterator<Item = &DuplicateGroup> {
        let mut groups: Vec<_> = self.groups.values().filter(|g| g.is_duplicate()).collect();
        groups.sort_by(|a, b| a.key.cmp(&b.key));
        groups.into_iter()
    }

    /// Consume the result, returning duplicate groups ordered by key.
    #[must_use]
    pub fn into_duplicates(self) -> Vec<DuplicateGroup> {
        let mut groups: Vec<_> = self
            .groups
            .into_values()
            .filter(DuplicateGroup::is_duplicate)
            .collect();
        groups.sort_by(|a, b| a.key.cmp(&b.key));
        groups
    }

    /// Number of groups with two or more members.
    #[must_use]
    pub fn duplicate_group_count(&self) -> usize {
        self.groups.values().filter(|g| g.is_duplicate()).count()
    }

    /// Space freed by keeping one copy of every duplicate group.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.groups.values().map(DuplicateGroup::reclaimable).sum()
    }
}
