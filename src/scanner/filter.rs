//! Extension and size filtering.
//!
//! Rejection is a normal outcome, not an error: the walker counts rejected
//! files as skipped and moves on.

use std::collections::HashSet;
use std::path::Path;

use super::ScanOptions;

/// Predicate deciding whether a visited file is in scope.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    extensions: HashSet<String>,
    min_size: Option<u64>,
    max_size: Option<u64>,
}

impl Filter {
    /// Build a filter from scan options.
    ///
    /// Zero size bounds are treated as unbounded.
    #[must_use]
    pub fn new(options: &ScanOptions) -> Self {
        Self {
            extensions: options.extensions.iter().cloned().collect(),
            min_size: options.min_size.filter(|&min| min > 0),
            max_size: options.max_size.filter(|&max| max > 0),
        }
    }

    /// Check the extension allow-list.
    ///
    /// The extension is everything from the last `.` of the base name,
    /// dot included, compared case-sensitively. An empty allow-list
    /// accepts every file.
    #[must_use]
    pub fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let extension = dotted_extension(path);
        self.extensions.contains(extension)
    }

    /// Check the min/max size bounds.
    #[must_use]
    pub fn accepts_size(&self, size: u64) -> bool {
        if let Some(min) = self.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.max_size {
            if size > max {
                return false;
            }
        }
        true
    }
}

/// The base name's extension including its leading dot, or `""`.
fn dotted_extension(path: &Path) -> &str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.rfind('.').map_or("", |idx| &name[idx..])
}
