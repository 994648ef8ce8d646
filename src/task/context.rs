//! Execution context handed to every task body.
//!
//! The context is the only channel between a running computation and the
//! rest of the program: it exposes the cancellation checkpoint and the
//! progress counter, and forwards percentage changes to an optional sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::progress::ProgressTracker;
use super::{Interrupt, TaskResult};

/// Receives percentage updates from the worker. Must not block.
pub type ProgressSink = Box<dyn FnMut(i32) + Send>;

pub struct TaskContext {
    cancel: CancellationToken,
    counter: Arc<AtomicU64>,
    tracker: ProgressTracker,
    sink: Option<ProgressSink>,
}

impl TaskContext {
    pub fn new(
        cancel: CancellationToken,
        counter: Arc<AtomicU64>,
        sink: Option<ProgressSink>,
    ) -> Self {
        Self {
            cancel,
            counter,
            tracker: ProgressTracker::new(0.0),
            sink,
        }
    }

    /// A context nobody watches and nobody cancels. Used for synchronous
    /// calls into the algorithms (tests, headless helpers).
    pub fn detached() -> Self {
        Self::new(CancellationToken::new(), Arc::new(AtomicU64::new(0)), None)
    }

    /// Declare the number of work units the task expects to perform.
    pub fn set_predicted(&mut self, predicted: f64) {
        self.tracker.set_predicted(predicted);
        self.publish(self.counter.load(Ordering::Acquire));
    }

    pub fn predicted(&self) -> f64 {
        self.tracker.predicted()
    }

    /// Record `units` more work units.
    pub fn advance(&mut self, units: u64) {
        let current = self.counter.fetch_add(units, Ordering::AcqRel) + units;
        self.publish(current);
    }

    /// Move the counter forward to `current`. Lower values are ignored so the
    /// counter stays monotonic.
    pub fn set_progress(&mut self, current: u64) {
        let previous = self.counter.fetch_max(current, Ordering::AcqRel);
        self.publish(previous.max(current));
    }

    pub fn progress(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancellation checkpoint. Call once per unit of work.
    pub fn checkpoint(&self) -> TaskResult<()> {
        if self.cancel.is_cancelled() {
            Err(Interrupt::Cancelled)
        } else {
            Ok(())
        }
    }

    fn publish(&mut self, current: u64) {
        let current = i64::try_from(current).unwrap_or(i64::MAX);
        if let Some(percent) = self.tracker.observe(current) {
            if let Some(sink) = self.sink.as_mut() {
                sink(percent);
            }
        }
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("progress", &self.progress())
            .field("predicted", &self.tracker.predicted())
            .finish()
    }
}
