//! Cancellation and Ctrl+C handling.
//!
//! A [`CancellationToken`] wraps an `AtomicBool` flag shared across threads
//! plus an optional deadline. The walker checks it before every entry; a
//! timeout is simply a deadline on the same token.
//!
//! # Usage
//!
//! ```rust,no_run
//! use halcyon::signal::install_handler;
//! use std::time::Duration;
//!
//! // Ctrl+C cancels the token; the scan also gives up after 30 seconds.
//! let token = install_handler()
//!     .expect("Failed to install signal handler")
//!     .with_timeout(Duration::from_secs(30));
//!
//! if token.is_cancelled() {
//!     println!("Cancelled, cleaning up...");
//! }
//! ```
//!
//! # Exit Codes
//!
//! When a signal is received the flag is set, "Interrupted. Cleaning up..."
//! is printed to stderr, and the application exits with code 130
//! (128 + SIGINT) once the scan has drained.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Cloneable cancellation signal with an optional deadline.
///
/// Clones share the same flag; the deadline is per handle.
///
/// # Thread Safety
///
/// `CancellationToken` is `Send` and `Sync`; the flag uses atomic
/// operations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Create a token that is not cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a deadline after which the token reports cancellation.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        // An overflowing timeout is effectively "never".
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Whether cancellation was requested or the deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Request cancellation. Observed by every clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the shared flag.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag. The deadline is left untouched.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// The process-wide handler is registered once; later calls (e.g. repeated
/// `run_app` calls in tests) reset and reuse it. If another handler already
/// owns the signal, an unhooked token is returned so callers can still
/// cancel manually.
///
/// # Errors
///
/// Currently always succeeds; the `Result` keeps room for platforms where
/// registration failure should be fatal.
pub fn install_handler() -> Result<CancellationToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancellationToken::new();
    let flag = token.get_flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);

        let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
        let _ = std::io::stderr().flush();

        log::info!("Shutdown signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(e) => {
            if let Some(existing) = GLOBAL_TOKEN.get() {
                existing.reset();
                Ok(existing.clone())
            } else {
                log::debug!("Ctrl+C handler unavailable ({}), using unhooked token", e);
                let fallback = CancellationToken::new();
                let _ = GLOBAL_TOKEN.set(fallback.clone());
                Ok(fallback)
            }
        }
    }
}
