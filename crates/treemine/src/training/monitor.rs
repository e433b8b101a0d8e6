//! Cancellation and progress reporting for long-running operations.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Marker returned when the caller asked to stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("execution cancelled")]
pub struct Cancelled;

/// Execution context supplied by the caller.
///
/// Training loops call [`check_cancelled`](Self::check_cancelled) at every
/// row and propagate the error with `?`.
pub trait ExecutionMonitor: Sync {
    fn check_cancelled(&self) -> Result<(), Cancelled>;

    /// Report progress in `[0, 1]`. The default ignores it.
    fn set_progress(&self, _fraction: f64, _message: &str) {}
}

/// Monitor that never cancels and drops progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMonitor;

impl ExecutionMonitor for NoopMonitor {
    #[inline]
    fn check_cancelled(&self) -> Result<(), Cancelled> {
        Ok(())
    }
}

type ProgressFn = dyn Fn(f64, &str) + Send + Sync;

/// Shared cancellation flag with an optional progress callback.
///
/// Clones share the same flag, so one clone can be handed to the training
/// thread while another cancels.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    progress: Option<Arc<ProgressFn>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a progress callback.
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(f64, &str) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(f));
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl ExecutionMonitor for CancellationToken {
    fn check_cancelled(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    fn set_progress(&self, fraction: f64, message: &str) {
        if let Some(f) = &self.progress {
            f(fraction, message);
        }
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn token_clones_share_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(clone.check_cancelled().is_ok());
        token.cancel();
        assert_eq!(clone.check_cancelled(), Err(Cancelled));
    }

    #[test]
    fn progress_callback_is_called() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let token = CancellationToken::new().with_progress(move |f, m| {
            sink.lock().unwrap().push((f, m.to_string()));
        });
        token.set_progress(0.5, "half");
        assert_eq!(*seen.lock().unwrap(), vec![(0.5, "half".to_string())]);
    }

    #[test]
    fn noop_never_cancels() {
        assert!(NoopMonitor.check_cancelled().is_ok());
        NoopMonitor.set_progress(1.0, "done");
    }
}
