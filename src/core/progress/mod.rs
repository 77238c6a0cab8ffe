//! # Progress Module
//!
//! Subdividable progress reporting on top of a [`ProgressSink`].
//!
//! A [`Job`] owns a slice of the overall 0-100 range. Stages are handed
//! sub-jobs whose slices are proportional to fixed integer weights; each
//! stage reports its own 0-100 progress and the job rescales it into its
//! slice. Reports never go backwards, even across sibling sub-jobs.

use crate::error::ScanError;
use crate::events::ProgressSink;
use std::cell::Cell;
use std::rc::Rc;

/// A slice of the overall progress range
#[derive(Clone)]
pub struct Job<'a> {
    sink: &'a dyn ProgressSink,
    start: f64,
    span: f64,
    last_reported: Rc<Cell<Option<u8>>>,
}

impl<'a> Job<'a> {
    /// Create a job covering the whole 0-100 range
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            start: 0.0,
            span: 100.0,
            last_reported: Rc::new(Cell::new(None)),
        }
    }

    /// Split this job into consecutive sub-jobs weighted by `weights`
    pub fn subjobs(&self, weights: &[u32]) -> Vec<Job<'a>> {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return weights.iter().map(|_| self.clone()).collect();
        }

        let mut offset = self.start;
        weights
            .iter()
            .map(|&weight| {
                let span = self.span * f64::from(weight) / f64::from(total);
                let job = Job {
                    sink: self.sink,
                    start: offset,
                    span,
                    last_reported: Rc::clone(&self.last_reported),
                };
                offset += span;
                job
            })
            .collect()
    }

    /// Report this job's own progress (0-100)
    ///
    /// Returns [`ScanError::Cancelled`] when the sink asks to stop.
    pub fn set_progress(&self, percent: u8, message: &str) -> Result<(), ScanError> {
        let local = f64::from(percent.min(100));
        let absolute = (self.start + self.span * local / 100.0).floor().clamp(0.0, 100.0) as u8;
        let absolute = match self.last_reported.get() {
            Some(last) => absolute.max(last),
            None => absolute,
        };
        self.last_reported.set(Some(absolute));

        if self.sink.report(absolute, message) {
            Ok(())
        } else {
            Err(ScanError::Cancelled)
        }
    }

    /// Report `done` out of `total` units of work with a `label`
    ///
    /// Used between items of iteration-heavy stages; every call is a
    /// cancellation point.
    pub fn advance(&self, done: usize, total: usize, label: &str) -> Result<(), ScanError> {
        let percent = if total == 0 {
            100
        } else {
            (done.min(total) * 100 / total) as u8
        };
        self.set_progress(percent, &format!("{label} {done}/{total}"))
    }
}
