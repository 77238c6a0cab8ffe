//! The progress-sink capability the pipeline reports to.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives fractional progress from the pipeline.
///
/// Returning `false` from [`report`](ProgressSink::report) is a cancellation
/// request: the pipeline stops at the next item boundary and returns an
/// empty result.
pub trait ProgressSink {
    /// Report overall progress (0-100) with a human readable message
    fn report(&self, percent: u8, message: &str) -> bool;
}

/// A sink that ignores every report and never cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _percent: u8, _message: &str) -> bool {
        true
    }
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str) -> bool,
{
    fn report(&self, percent: u8, message: &str) -> bool {
        self(percent, message)
    }
}

/// Shared flag used to request cancellation from another thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
