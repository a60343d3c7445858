//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements
//! [`ScanProgress`] to display a spinner while the walker runs.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress callback for a traversal.
///
/// Callbacks run on the enumeration thread only.
pub trait ScanProgress: Send + Sync {
    /// Called once before the first entry.
    fn on_scan_start(&self, root: &str);

    /// Called for each non-directory entry.
    ///
    /// # Arguments
    ///
    /// * `visited` - Number of files visited so far (1-based)
    /// * `path` - Path being visited
    fn on_entry(&self, visited: u64, path: &str);

    /// Called once when the traversal ends, successfully or not.
    fn on_scan_end(&self, visited: u64);
}

/// Spinner reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use halcyon::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
}

impl ScanProgress for Progress {
    fn on_scan_start(&self, root: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(format!("Scanning {}", truncate_path(root, 40)));
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_entry(&self, visited: u64, path: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.bar.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.set_position(visited);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_scan_end(&self, visited: u64) {
        if let Some(pb) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.set_position(visited);
            pb.finish_and_clear();
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
