//! Directory walker with bounded parallel classification.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which enumerates a directory
//! tree, filters every file, and groups the survivors by canonical name and
//! size into a [`ScanResult`].
//!
//! # Concurrency
//!
//! Enumeration is single-threaded ([`walkdir`], entries sorted by file
//! name, so sequential scans are deterministic). In parallel mode each
//! accepted file's path and metadata are handed to a rayon pool, where the
//! task derives the canonical name and inserts the record:
//!
//! - At most `concurrency` tasks are in flight. The enumerator blocks on a
//!   bounded slot channel before spawning, so work never queues without bound.
//! - Group insertion and the `processed` counter sit behind one mutex.
//!   Normalization runs inside the task, before the lock is taken.
//! - The scope joins every spawned task before returning, so the result is
//!   never observed mid-mutation, including on error or cancellation.
//!
//! # Failure policy
//!
//! Any entry that cannot be listed or stat'd aborts the whole traversal
//! with [`TraversalError::Access`]. Cancellation is checked before every
//! entry and yields [`TraversalError::Cancelled`]; partial results are
//! dropped.
//!
//! # Example
//!
//! ```no_run
//! use halcyon::scanner::{ScanOptions, Walker};
//! use halcyon::signal::CancellationToken;
//! use std::path::Path;
//!
//! let token = CancellationToken::new();
//! let walker = Walker::new(Path::new("/home/user/Downloads"), ScanOptions::default())
//!     .with_cancellation(token.clone());
//!
//! let result = walker.traverse().unwrap();
//! println!(
//!     "{} visited, {} duplicate groups",
//!     result.stats.total_visited,
//!     result.duplicate_group_count()
//! );
//! ```

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, Sender};
use walkdir::WalkDir;

use super::{FileRecord, Filter, ScanOptions, TraversalError};
use crate::duplicates::{ScanResult, ScanStats};
use crate::progress::ScanProgress;
use crate::signal::CancellationToken;

/// Default number of classification tasks allowed in flight.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Directory walker producing a [`ScanResult`].
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Filters and concurrency settings
    options: ScanOptions,
    /// Checked before every entry
    cancel: CancellationToken,
    /// Optional progress reporter
    progress: Option<Arc<dyn ScanProgress>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, options: ScanOptions) -> Self {
        Self {
            root: path.to_path_buf(),
            options,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ScanProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Walk the tree and group every accepted file.
    ///
    /// # Errors
    ///
    /// - [`TraversalError::EmptyRoot`] if the root path is empty (nothing is
    ///   touched on disk)
    /// - [`TraversalError::Access`] for the first entry that cannot be read
    /// - [`TraversalError::Cancelled`] if the token fires mid-walk
    pub fn traverse(&self) -> Result<ScanResult, TraversalError> {
        if self.root.as_os_str().is_empty() {
            return Err(TraversalError::EmptyRoot);
        }

        log::debug!(
            "Scanning {} (parallel: {}, concurrency: {})",
            self.root.display(),
            self.options.parallel,
            self.options.concurrency
        );

        if let Some(progress) = &self.progress {
            progress.on_scan_start(&self.root.to_string_lossy());
        }

        let filter = Filter::new(&self.options);
        let shared = Mutex::new(ScanResult::default());
        let mut stats = ScanStats::default();

        let classify_into = |path: PathBuf, metadata: Metadata| classify(&shared, path, metadata);
        let outcome = if self.options.parallel {
            self.walk_parallel(&filter, &mut stats, &classify_into)
        } else {
            self.drive(&filter, &mut stats, classify_into)
        };

        if let Some(progress) = &self.progress {
            progress.on_scan_end(stats.total_visited);
        }

        outcome?;

        let mut result = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        result.stats.total_visited = stats.total_visited;
        result.stats.skipped = stats.skipped;

        log::debug!(
            "Scan finished: {} visited, {} processed, {} skipped, {} duplicate groups",
            result.stats.total_visited,
            result.stats.processed,
            result.stats.skipped,
            result.duplicate_group_count()
        );

        Ok(result)
    }

    /// Run the enumerator with `task` offloaded to a bounded pool.
    ///
    /// Falls back to running `task` inline if the pool cannot be built.
    fn walk_parallel<T>(
        &self,
        filter: &Filter,
        stats: &mut ScanStats,
        task: &T,
    ) -> Result<(), TraversalError>
    where
        T: Fn(PathBuf, Metadata) + Sync,
    {
        let concurrency = self.options.concurrency.max(1);
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|i| format!("halcyon-classify-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("Failed to build classification pool, scanning inline: {}", e);
                return self.drive(filter, stats, task);
            }
        };

        let (slots, freed) = crossbeam_channel::bounded(concurrency);

        // The enumerator runs on this thread; only classification enters the pool.
        pool.in_place_scope(|scope| {
            self.drive(filter, stats, |path, metadata| {
                let slot = Slot::take(&slots, &freed);
                scope.spawn(move |_| {
                    let _slot = slot;
                    task(path, metadata);
                });
            })
        })
    }

    /// Enumerate entries, filter them, and hand accepted files to `classify`.
    ///
    /// Counts visited and skipped files into `stats`; `processed` is counted
    /// by whoever inserts the record.
    fn drive<F>(
        &self,
        filter: &Filter,
        stats: &mut ScanStats,
        mut classify: F,
    ) -> Result<(), TraversalError>
    where
        F: FnMut(PathBuf, Metadata),
    {
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            if self.cancel.is_cancelled() {
                log::debug!("Walker: cancellation requested, stopping");
                return Err(TraversalError::Cancelled);
            }

            let entry = entry.map_err(|e| self.access_error(e))?;
            if entry.file_type().is_dir() {
                continue;
            }

            stats.total_visited += 1;
            if let Some(progress) = &self.progress {
                progress.on_entry(stats.total_visited, &entry.path().to_string_lossy());
            }

            if !filter.accepts_extension(entry.path()) {
                log::trace!("Skipping file due to extension filter: {}", entry.path().display());
                stats.skipped += 1;
                continue;
            }

            let metadata: Metadata = entry.metadata().map_err(|e| self.access_error(e))?;
            if !filter.accepts_size(metadata.len()) {
                log::trace!(
                    "Skipping file due to size filter ({}): {}",
                    metadata.len(),
                    entry.path().display()
                );
                stats.skipped += 1;
                continue;
            }

            classify(entry.into_path(), metadata);
        }

        Ok(())
    }

    /// Convert a walkdir error into an access error naming the offending path.
    fn access_error(&self, error: walkdir::Error) -> TraversalError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        log::warn!("Cannot access {}: {}", path.display(), error);
        TraversalError::Access {
            path,
            source: io::Error::from(error),
        }
    }
}

/// Walk `root` with `options`, honouring `cancel`.
///
/// Convenience wrapper around [`Walker`].
///
/// # Errors
///
/// See [`Walker::traverse`].
pub fn traverse(
    root: &Path,
    options: &ScanOptions,
    cancel: &CancellationToken,
) -> Result<ScanResult, TraversalError> {
    Walker::new(root, options.clone())
        .with_cancellation(cancel.clone())
        .traverse()
}

fn lock(shared: &Mutex<ScanResult>) -> MutexGuard<'_, ScanResult> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Normalize one accepted file and add it to its group.
fn classify(shared: &Mutex<ScanResult>, path: PathBuf, metadata: Metadata) {
    let record = FileRecord::new(path, metadata);
    log::trace!("Classified {} as {}", record.path.display(), record.canonical_name);
    lock(shared).insert(record);
}

/// One in-flight task's place in the bounded slot channel.
///
/// Taking a slot blocks while the channel is full; dropping it frees one.
struct Slot<'a> {
    freed: &'a Receiver<()>,
}

impl<'a> Slot<'a> {
    fn take(slots: &Sender<()>, freed: &'a Receiver<()>) -> Self {
        // Cannot disconnect: `freed` outlives every slot.
        let _ = slots.send(());
        Self { freed }
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        let _ = self.freed.try_recv();
    }
}
