//! Interactive per-group review.
//!
//! Each duplicate group is shown as a table followed by an action menu.
//! The reviewer reads from any [`BufRead`] and writes to any [`Write`],
//! so the whole loop can be driven by scripted input in tests.
//!
//! End of input is treated as [`GroupAction::Exit`].

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;

use super::backup::move_to_backup;
use super::delete::{delete_all_but_first, delete_selected, BatchDeleteResult, DeleteConfig};
use crate::duplicates::DuplicateGroup;
use crate::output::table::{render_group, render_heading};
use crate::scanner::FileRecord;

/// What the operator chose to do with a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    KeepAll,
    DeleteSelected,
    DeleteAllButFirst,
    MoveToBackup,
    Skip,
    Exit,
}

impl GroupAction {
    /// Menu order.
    pub const ALL: [GroupAction; 6] = [
        GroupAction::KeepAll,
        GroupAction::DeleteSelected,
        GroupAction::DeleteAllButFirst,
        GroupAction::MoveToBackup,
        GroupAction::Skip,
        GroupAction::Exit,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::KeepAll => "Keep all files",
            Self::DeleteSelected => "Delete specific files",
            Self::DeleteAllButFirst => "Delete all duplicates (keep the first)",
            Self::MoveToBackup => "Move files to backup",
            Self::Skip => "Skip these duplicates",
            Self::Exit => "Exit",
        }
    }

    /// Parse a menu answer: its 1-based number or a shortcut letter.
    #[must_use]
    pub fn from_choice(input: &str) -> Option<Self> {
        let input = input.trim().to_ascii_lowercase();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        match input.as_str() {
            "k" | "keep" => Some(Self::KeepAll),
            "d" | "delete" => Some(Self::DeleteSelected),
            "a" | "all" => Some(Self::DeleteAllButFirst),
            "m" | "move" => Some(Self::MoveToBackup),
            "s" | "skip" => Some(Self::Skip),
            "q" | "x" | "exit" | "quit" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl fmt::Display for GroupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A malformed index list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("no indices given")]
    Empty,

    #[error("invalid index: {0}")]
    Invalid(String),

    #[error("index {index} out of range (0-{max})")]
    OutOfRange { index: usize, max: usize },
}

/// Parse a comma-separated list of indices, each in `0..len`.
///
/// Duplicates are collapsed and the result is sorted.
///
/// # Errors
///
/// The first entry that is not a number or is out of range.
pub fn parse_indices(input: &str, len: usize) -> Result<Vec<usize>, IndexError> {
    let mut indices = BTreeSet::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index: usize = part
            .parse()
            .map_err(|_| IndexError::Invalid(part.to_string()))?;
        if index >= len {
            return Err(IndexError::OutOfRange {
                index,
                max: len.saturating_sub(1),
            });
        }
        indices.insert(index);
    }

    if indices.is_empty() {
        return Err(IndexError::Empty);
    }
    Ok(indices.into_iter().collect())
}

/// Whether review should go on to the next group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Continue,
    Exit,
}

/// Totals across a review session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub groups_reviewed: usize,
    pub files_deleted: usize,
    pub files_moved: usize,
    pub bytes_freed: u64,
}

/// Drives the review of duplicate groups over a line-based terminal.
pub struct Reviewer<R, W> {
    input: R,
    output: W,
    delete: DeleteConfig,
    default_backup_dir: Option<PathBuf>,
    color: bool,
    summary: ReviewSummary,
}

impl<R: BufRead, W: Write> Reviewer<R, W> {
    pub fn new(input: R, output: W, delete: DeleteConfig) -> Self {
        Self {
            input,
            output,
            delete,
            default_backup_dir: None,
            color: false,
            summary: ReviewSummary::default(),
        }
    }

    /// Directory offered when the backup prompt is left empty.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.default_backup_dir = dir;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Review groups in order until they run out or the operator exits.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures. Failed file operations are reported to the
    /// operator and do not end the session.
    pub fn review_all<I>(&mut self, groups: I) -> anyhow::Result<ReviewSummary>
    where
        I: IntoIterator<Item = DuplicateGroup>,
    {
        for group in groups {
            if self.review_group(group)? == ReviewOutcome::Exit {
                log::debug!("Review stopped by operator");
                break;
            }
        }
        Ok(self.summary.clone())
    }

    /// Review a single group until it is settled.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures.
    pub fn review_group(&mut self, group: DuplicateGroup) -> anyhow::Result<ReviewOutcome> {
        let key = group.key;
        let mut files = group.files;
        self.summary.groups_reviewed += 1;

        while files.len() >= 2 {
            render_heading(&mut self.output, &key, files.len(), self.color)?;
            render_group(&mut self.output, &files, self.color)?;

            let Some(action) = self.choose_action()? else {
                return Ok(ReviewOutcome::Exit);
            };
            log::debug!("Action for {}: {}", key, action);

            match action {
                GroupAction::KeepAll | GroupAction::Skip => return Ok(ReviewOutcome::Continue),
                GroupAction::Exit => return Ok(ReviewOutcome::Exit),
                GroupAction::DeleteSelected => self.delete_selected(&mut files)?,
                GroupAction::DeleteAllButFirst => self.delete_all_but_first(&mut files)?,
                GroupAction::MoveToBackup => self.move_to_backup(&mut files)?,
            }
        }
        Ok(ReviewOutcome::Continue)
    }

    fn delete_selected(&mut self, files: &mut Vec<FileRecord>) -> anyhow::Result<()> {
        let Some(line) = self.prompt("Enter indices to delete (comma-separated): ")? else {
            return Ok(());
        };
        let indices = match parse_indices(&line, files.len()) {
            Ok(indices) => indices,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(());
            }
        };

        match delete_selected(files, &indices, &self.delete) {
            Ok(result) => self.apply_deletions(files, &result),
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                Ok(())
            }
        }
    }

    fn delete_all_but_first(&mut self, files: &mut Vec<FileRecord>) -> anyhow::Result<()> {
        if !self.confirm("Delete all duplicates?")? {
            writeln!(self.output, "Action cancelled")?;
            return Ok(());
        }
        let result = delete_all_but_first(files, &self.delete);
        self.apply_deletions(files, &result)
    }

    fn apply_deletions(
        &mut self,
        files: &mut Vec<FileRecord>,
        result: &BatchDeleteResult,
    ) -> anyhow::Result<()> {
        for deleted in &result.successes {
            writeln!(self.output, "Deleted: {}", deleted.path.display())?;
        }
        for (path, message) in &result.failures {
            writeln!(self.output, "Error: failed to delete {}: {}", path.display(), message)?;
        }
        writeln!(self.output, "{}", result.summary())?;

        self.summary.files_deleted += result.success_count();
        self.summary.bytes_freed += result.bytes_freed;
        retain_except(files, result.deleted_paths());
        Ok(())
    }

    fn move_to_backup(&mut self, files: &mut Vec<FileRecord>) -> anyhow::Result<()> {
        let Some(dir) = self.prompt_backup_dir()? else {
            return Ok(());
        };

        match move_to_backup(files, &dir) {
            Ok(result) => {
                for moved in &result.moved {
                    writeln!(
                        self.output,
                        "Moved: {} -> {}",
                        moved.from.display(),
                        moved.to.display()
                    )?;
                }
                for (path, message) in &result.failures {
                    writeln!(self.output, "Error: {} ({})", message, path.display())?;
                }
                self.summary.files_moved += result.moved.len();
                retain_except(files, result.moved.iter().map(|m| m.from.as_path()));
            }
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(())
    }

    fn prompt_backup_dir(&mut self) -> anyhow::Result<Option<PathBuf>> {
        let label = match &self.default_backup_dir {
            Some(dir) => format!("Enter backup directory path [{}]: ", dir.display()),
            None => "Enter backup directory path: ".to_string(),
        };
        let Some(line) = self.prompt(&label)? else {
            return Ok(None);
        };

        if !line.is_empty() {
            return Ok(Some(PathBuf::from(line)));
        }
        match &self.default_backup_dir {
            Some(dir) => Ok(Some(dir.clone())),
            None => {
                writeln!(self.output, "Error: backup directory cannot be empty")?;
                Ok(None)
            }
        }
    }

    /// Show the menu until a valid choice is made. `None` on end of input.
    fn choose_action(&mut self) -> anyhow::Result<Option<GroupAction>> {
        loop {
            writeln!(self.output, "Choose action:")?;
            for (i, action) in GroupAction::ALL.iter().enumerate() {
                writeln!(self.output, "  {}) {}", i + 1, action)?;
            }
            let Some(line) = self.prompt(&format!("Choice [1-{}]: ", GroupAction::ALL.len()))?
            else {
                return Ok(None);
            };
            match GroupAction::from_choice(&line) {
                Some(action) => return Ok(Some(action)),
                None => writeln!(self.output, "Invalid choice: {line}")?,
            }
        }
    }

    /// Ask until the answer is yes or no. End of input counts as no.
    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        loop {
            let Some(line) = self.prompt(&format!("{question} (yes/no): "))? else {
                return Ok(false);
            };
            match line.to_ascii_lowercase().as_str() {
                "yes" | "y" => return Ok(true),
                "no" | "n" => return Ok(false),
                _ => writeln!(self.output, "Please type 'yes' or 'no'")?,
            }
        }
    }

    /// Print a prompt and read one trimmed line. `None` on end of input.
    fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn retain_except<'a>(files: &mut Vec<FileRecord>, gone: impl Iterator<Item = &'a Path>) {
    let gone: HashSet<&Path> = gone.collect();
    files.retain(|f| !gone.contains(f.path.as_path()));
}
