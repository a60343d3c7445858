//! JSON output formatter for scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "stats": {
//!     "total_visited": 4,
//!     "processed": 4,
//!     "skipped": 0,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 2048,
//!     "exit_code": 0,
//!     "exit_code_name": "HC000"
//!   },
//!   "groups": [
//!     {
//!       "canonical_name": "document.txt",
//!       "size": 1024,
//!       "files": [
//!         { "path": "/data/document.txt", "size": 1024, "modified": "2024-03-01T10:15:42Z" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Only groups with two or more members are listed, ordered by canonical
//! name then size.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanResult};
use crate::error::ExitCode;
use crate::scanner::FileRecord;

/// A single file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path where possible
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time (RFC 3339, UTC)
    pub modified: DateTime<Utc>,
}

impl JsonFile {
    #[must_use]
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            path: normalize_path(&record.path),
            size: record.size,
            modified: record.modified.into(),
        }
    }
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    pub canonical_name: String,
    pub size: u64,
    pub files: Vec<JsonFile>,
}

impl JsonGroup {
    #[must_use]
    pub fn from_group(group: &DuplicateGroup) -> Self {
        Self {
            canonical_name: group.key.canonical_name.clone(),
            size: group.key.size,
            files: group.files.iter().map(JsonFile::from_record).collect(),
        }
    }
}

/// Scan counters in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonStats {
    /// Every file entry seen
    pub total_visited: u64,
    /// Files that passed the filters
    pub processed: u64,
    /// Files rejected by extension or size
    pub skipped: u64,
    /// Number of groups with two or more members
    pub duplicate_groups: usize,
    /// Bytes freed by keeping one copy per group
    pub reclaimable_space: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "HC000")
    pub exit_code_name: String,
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub stats: JsonStats,
    pub groups: Vec<JsonGroup>,
}

impl JsonReport {
    /// Build a report from a scan result and the exit code of this run.
    ///
    /// # Example
    ///
    /// ```
    /// use halcyon::duplicates::ScanResult;
    /// use halcyon::error::ExitCode;
    /// use halcyon::output::json::JsonReport;
    ///
    /// let report = JsonReport::new(&ScanResult::default(), ExitCode::NoDuplicates);
    /// assert!(report.groups.is_empty());
    /// assert_eq!(report.stats.exit_code_name, "HC002");
    /// ```
    #[must_use]
    pub fn new(result: &ScanResult, exit_code: ExitCode) -> Self {
        let groups: Vec<JsonGroup> = result.duplicates().map(JsonGroup::from_group).collect();

        Self {
            stats: JsonStats {
                total_visited: result.stats.total_visited,
                processed: result.stats.processed,
                skipped: result.stats.skipped,
                duplicate_groups: groups.len(),
                reclaimable_space: result.reclaimable(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            groups,
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Absolute path if it can be resolved, otherwise the path as given.
fn normalize_path(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical) => canonical.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
