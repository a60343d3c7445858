//! Scanner module for directory traversal and duplicate classification.
//!
//! This module provides functionality for:
//! - Single-threaded, sorted directory enumeration using walkdir
//! - Bounded parallel classification on a rayon pool
//! - Canonical name normalization (duplicate-marker stripping)
//! - Extension and size filtering
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`normalize`]: Canonical file name derivation
//! - [`filter`]: Extension allow-list and size bounds
//! - [`walker`]: Directory traversal and grouping
//!
//! # Example
//!
//! ```no_run
//! use halcyon::scanner::{traverse, ScanOptions};
//! use halcyon::signal::CancellationToken;
//! use std::path::Path;
//!
//! let options = ScanOptions {
//!     extensions: vec![".txt".to_string()],
//!     ..Default::default()
//! };
//!
//! let result = traverse(Path::new("."), &options, &CancellationToken::new()).unwrap();
//! for group in result.duplicates() {
//!     println!("{}: {} files", group.key, group.len());
//! }
//! ```

pub mod filter;
pub mod normalize;
pub mod walker;

use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

// Re-export main types
pub use filter::Filter;
pub use normalize::canonical_name;
pub use walker::{traverse, Walker, DEFAULT_CONCURRENCY};

/// One visited, in-scope file.
///
/// Created once when the walker accepts a file and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path to the file as discovered under the scan root
    pub path: PathBuf,
    /// Normalized base name, shared by every member of a duplicate group
    pub canonical_name: String,
    /// File size in bytes at time of visit
    pub size: u64,
    /// Last modification time at time of visit
    pub modified: SystemTime,
    /// Raw filesystem metadata for the presentation layer
    pub metadata: Metadata,
}

impl FileRecord {
    /// Build a record from a visited path and its metadata.
    ///
    /// The canonical name is derived from the path's base name.
    #[must_use]
    pub fn new(path: PathBuf, metadata: Metadata) -> Self {
        let base_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Self {
            canonical_name: canonical_name(&base_name),
            size: metadata.len(),
            modified,
            metadata,
            path,
        }
    }
}

/// Options for a single traversal.
///
/// This is the explicit configuration value threaded into [`traverse`];
/// nothing is read from process-wide state.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extension allow-list including the leading dot (e.g. `.txt`).
    /// Matched case-sensitively. Empty accepts every extension.
    pub extensions: Vec<String>,

    /// Minimum file size in bytes. `None` or `Some(0)` is unbounded.
    pub min_size: Option<u64>,

    /// Maximum file size in bytes. `None` or `Some(0)` is unbounded.
    pub max_size: Option<u64>,

    /// Classify files on a bounded worker pool instead of inline.
    pub parallel: bool,

    /// Maximum number of classification tasks in flight.
    pub concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            min_size: None,
            max_size: None,
            parallel: true,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScanOptions {
    /// Set the extension allow-list.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the size bounds.
    #[must_use]
    pub fn with_size_bounds(mut self, min_size: Option<u64>, max_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Enable or disable parallel classification.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the concurrency cap (clamped to at least 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Errors that can occur during a traversal.
#[derive(thiserror::Error, Debug)]
pub enum TraversalError {
    /// The root path was empty. Reported before touching the filesystem.
    #[error("directory path cannot be empty")]
    EmptyRoot,

    /// An entry could not be listed or stat'd. Aborts the whole traversal.
    #[error("failed to access path {path}: {source}")]
    Access {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cancellation token fired before the traversal completed.
    #[error("scan cancelled before completion")]
    Cancelled,
}

impl TraversalError {
    /// Whether this error reports a cancelled scan.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
