//! Plain-text rendering of scan statistics and duplicate groups.
//!
//! ```text
//! Index  Path                   Size      Modified
//! 0      ./docs/report.txt      1.2 KiB   2024-03-01 10:15:42
//! 1      ./docs/report (1).txt  1.2 KiB   2024-03-04 08:01:09
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use chrono::{DateTime, Local};
use tabled::settings::{Padding, Style};
use tabled::{Table, Tabled};
use yansi::Paint;

use crate::duplicates::{GroupKey, ScanStats};
use crate::scanner::FileRecord;

/// Spaces between columns.
const COLUMN_GAP: usize = 2;

/// Format a modification time in local time.
#[must_use]
pub fn format_modified(record: &FileRecord) -> String {
    let local: DateTime<Local> = record.modified.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Write the three scan counters.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn render_summary<W: Write>(out: &mut W, stats: &ScanStats) -> io::Result<()> {
    writeln!(out, "Total files: {}", stats.total_visited)?;
    writeln!(out, "Processed:   {}", stats.processed)?;
    writeln!(out, "Skipped:     {}", stats.skipped)
}

/// Write the heading line for a group.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn render_heading<W: Write>(
    out: &mut W,
    key: &GroupKey,
    count: usize,
    color: bool,
) -> io::Result<()> {
    let title = format!(
        "{} ({}, {} files)",
        key.canonical_name,
        ByteSize::b(key.size),
        count
    );
    if color {
        writeln!(out, "\n{}", title.yellow().bold())
    } else {
        writeln!(out, "\n{title}")
    }
}

/// One table row per group member.
#[derive(Debug, Clone, Tabled)]
struct GroupRow {
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

impl GroupRow {
    fn new(index: usize, record: &FileRecord) -> Self {
        Self {
            index,
            path: record.path.display().to_string(),
            size: ByteSize::b(record.size).to_string(),
            modified: format_modified(record),
        }
    }
}

/// Write a table of group members, one row per file, indexed from 0.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn render_group<W: Write>(out: &mut W, files: &[FileRecord], color: bool) -> io::Result<()> {
    let rows = files
        .iter()
        .enumerate()
        .map(|(index, record)| GroupRow::new(index, record));

    let table = Table::new(rows)
        .with(Style::empty())
        .with(Padding::new(0, COLUMN_GAP, 0, 0))
        .to_string();

    let mut lines = table.lines().map(str::trim_end);
    if let Some(header) = lines.next() {
        if color {
            writeln!(out, "{}", header.bold().underline())?;
        } else {
            writeln!(out, "{header}")?;
        }
    }
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
