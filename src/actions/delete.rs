//! Deleting members of a duplicate group.
//!
//! # Overview
//!
//! Files go to the system trash by default (recoverable) or are removed
//! permanently when configured. Before each deletion the file is checked
//! against the size and mtime recorded during the scan, so a file changed
//! since then is left alone.
//!
//! At least one member of a group is always preserved.
//!
//! # Example
//!
//! ```no_run
//! use halcyon::actions::delete::{delete_all_but_first, DeleteConfig};
//! # fn group() -> Vec<halcyon::scanner::FileRecord> { Vec::new() }
//!
//! let files = group();
//! let result = delete_all_but_first(&files, &DeleteConfig::trash());
//! println!("{}", result.summary());
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use thiserror::Error;

use crate::scanner::FileRecord;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// A selected index does not exist in the group.
    #[error("invalid index {index}: group has {len} file(s)")]
    InvalidIndex { index: usize, len: usize },

    /// The selection would delete every copy.
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::InvalidIndex { .. } | Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Results of a batch deletion.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Paths that are gone after this batch.
    pub fn deleted_paths(&self) -> impl Iterator<Item = &Path> {
        self.successes.iter().map(|s| s.path.as_path())
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {}",
                self.success_count(),
                ByteSize::b(self.bytes_freed)
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                ByteSize::b(self.bytes_freed)
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
    /// Refuse to delete files whose size or mtime changed since the scan.
    pub verify_unchanged: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            permanent: false,
            verify_unchanged: true,
        }
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            permanent: true,
            ..Self::default()
        }
    }

    /// Enable/disable the unchanged-since-scan check.
    #[must_use]
    pub fn with_verify_unchanged(mut self, verify: bool) -> Self {
        self.verify_unchanged = verify;
        self
    }
}

/// Check that a file still matches what the scan recorded.
///
/// # Errors
///
/// `Modified` if size or mtime differ, or the error from stat'ing the file.
pub fn verify_unchanged(record: &FileRecord) -> Result<(), DeleteError> {
    let metadata = fs::metadata(&record.path).map_err(|e| DeleteError::from_io(&record.path, e))?;

    if metadata.len() != record.size {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            record.path.display(),
            record.size,
            metadata.len()
        );
        return Err(DeleteError::Modified(record.path.clone()));
    }

    if let Ok(modified) = metadata.modified() {
        if modified != record.modified {
            log::warn!(
                "File modified since scan: {} (mtime changed)",
                record.path.display()
            );
            return Err(DeleteError::Modified(record.path.clone()));
        }
    }

    Ok(())
}

/// Delete one scanned file according to `config`.
///
/// # Errors
///
/// - `Modified` if the file changed since the scan
/// - `NotFound` / `PermissionDenied` / `Io` from the filesystem
/// - `TrashFailed` if the trash operation fails
pub fn delete_file(record: &FileRecord, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    if config.verify_unchanged {
        verify_unchanged(record)?;
    }

    let path = &record.path;
    if config.permanent {
        fs::remove_file(path).map_err(|e| {
            log::error!("Permanent delete failed for {}: {}", path.display(), e);
            DeleteError::from_io(path, e)
        })?;
        log::info!("Permanently deleted: {} ({} bytes)", path.display(), record.size);
    } else {
        if !path.exists() {
            return Err(DeleteError::NotFound(path.clone()));
        }
        trash::delete(path).map_err(|e| {
            log::error!("Trash operation failed for {}: {}", path.display(), e);
            DeleteError::TrashFailed {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        log::info!("Moved to trash: {} ({} bytes)", path.display(), record.size);
    }

    Ok(DeleteResult {
        path: path.clone(),
        size: record.size,
        permanent: config.permanent,
    })
}

/// Delete the group members at `indices`.
///
/// Indices are deduplicated. The whole request is rejected up front if an
/// index is out of range or every member would go; otherwise each file is
/// attempted and failures are collected.
///
/// # Errors
///
/// `InvalidIndex` or `AllCopiesWouldBeDeleted`.
pub fn delete_selected(
    files: &[FileRecord],
    indices: &[usize],
    config: &DeleteConfig,
) -> Result<BatchDeleteResult, DeleteError> {
    let selected: BTreeSet<usize> = indices.iter().copied().collect();

    if let Some(&index) = selected.iter().find(|&&i| i >= files.len()) {
        return Err(DeleteError::InvalidIndex {
            index,
            len: files.len(),
        });
    }
    if selected.len() >= files.len() {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            files.len()
        );
        return Err(DeleteError::AllCopiesWouldBeDeleted);
    }

    let targets: Vec<&FileRecord> = selected.iter().map(|&i| &files[i]).collect();
    Ok(delete_batch(&targets, config))
}

/// Keep the first member of a group and delete the rest.
pub fn delete_all_but_first(files: &[FileRecord], config: &DeleteConfig) -> BatchDeleteResult {
    let targets: Vec<&FileRecord> = files.iter().skip(1).collect();
    delete_batch(&targets, config)
}

fn delete_batch(targets: &[&FileRecord], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for record in targets {
        match delete_file(record, config) {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", record.path.display(), e);
                result.failures.push((record.path.clone(), e.to_string()));
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
