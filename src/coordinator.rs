//! Task coordinator: owns the single worker slot.
//!
//! The coordinator moves between `Idle` and `Running`. `start` validates the
//! request, refuses if a task is already active, and otherwise spawns one
//! worker thread. The worker reports percentages and its final outcome as
//! [`TaskEvent`]s on an unbounded channel so it never waits on the UI.
//!
//! Completion is serialized with `start` under the same lock: the worker
//! clears the active slot and sends `Finished` before releasing it, so once a
//! consumer sees `Finished` the coordinator is already `Idle`, and because
//! the channel is FIFO per sender `Finished` is the last event of its task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tokio_util::sync::CancellationToken;

use crate::task::{run, ProgressSink, TaskContext, TaskId, TaskKind, TaskOutcome, TaskRequest};
use crate::{elog, elog_debug, elog_warn, Error, Result};

const WORKER_THREAD_NAME: &str = "epinet-worker";

/// Notifications from the worker, consumed by the logic thread.
#[derive(Debug)]
pub enum TaskEvent {
    Progress {
        id: TaskId,
        kind: TaskKind,
        /// 0..=100, or -1 while the total is unknown.
        percent: i32,
    },
    Finished {
        id: TaskId,
        kind: TaskKind,
        outcome: TaskOutcome,
    },
}

impl TaskEvent {
    pub fn id(&self) -> TaskId {
        match self {
            TaskEvent::Progress { id, .. } | TaskEvent::Finished { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Running { id: TaskId, kind: TaskKind },
}

struct ActiveTask {
    id: TaskId,
    kind: TaskKind,
    cancel: CancellationToken,
    counter: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Inner {
    active: Option<ActiveTask>,
}

pub struct TaskCoordinator {
    inner: Arc<Mutex<Inner>>,
    events_tx: Sender<TaskEvent>,
    events_rx: Receiver<TaskEvent>,
}

impl Default for TaskCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // A panicking worker is caught before it reaches the lock, so poisoning
    // only means a test assertion failed while holding it.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TaskCoordinator {
    pub fn new() -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            events_tx,
            events_rx,
        }
    }

    /// Validate and launch `request` on the worker thread.
    pub fn start(&self, request: TaskRequest) -> Result<TaskId> {
        let kind = request.kind();
        if let Err(err) = request.validate() {
            elog_warn!("Rejected {}: {}", kind, err);
            return Err(err);
        }

        let mut inner = lock(&self.inner);
        if let Some(active) = &inner.active {
            elog_warn!(
                "Rejected {}: {} ({}) is still running",
                kind,
                active.kind,
                active.id.short()
            );
            return Err(Error::AlreadyRunning);
        }

        let id = TaskId::new();
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU64::new(0));

        let progress_tx = self.events_tx.clone();
        let sink: ProgressSink = Box::new(move |percent| {
            let _ = progress_tx.send(TaskEvent::Progress { id, kind, percent });
        });
        let mut ctx = TaskContext::new(cancel.clone(), counter.clone(), Some(sink));

        let shared = Arc::clone(&self.inner);
        let done_tx = self.events_tx.clone();
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let outcome = run::execute(request, &mut ctx);
                match &outcome {
                    TaskOutcome::Success(_) => elog!("Finished {} ({})", kind, id.short()),
                    TaskOutcome::Cancelled => elog!("Cancelled {} ({})", kind, id.short()),
                    TaskOutcome::Failure(err) => {
                        elog_warn!("Failed {} ({}): {}", kind, id.short(), err)
                    }
                }

                let mut inner = lock(&shared);
                if inner.active.as_ref().is_some_and(|a| a.id == id) {
                    inner.active = None;
                }
                let _ = done_tx.send(TaskEvent::Finished { id, kind, outcome });
            })?;

        elog!("Started {} ({})", kind, id.short());
        inner.active = Some(ActiveTask {
            id,
            kind,
            cancel,
            counter,
            handle: Some(handle),
        });
        Ok(id)
    }

    /// Request cancellation of the active task. Returns immediately; the
    /// outcome arrives later as `Finished` with `Cancelled`. No-op when idle.
    pub fn cancel(&self) {
        let inner = lock(&self.inner);
        match &inner.active {
            Some(active) => {
                elog_debug!("Cancelling {} ({})", active.kind, active.id.short());
                active.cancel.cancel();
            }
            None => elog_debug!("Cancel requested while idle"),
        }
    }

    /// Cancel and block until the worker thread has exited.
    pub fn cancel_and_wait(&self) {
        let handle = {
            let mut inner = lock(&self.inner);
            inner.active.as_mut().and_then(|active| {
                active.cancel.cancel();
                active.handle.take()
            })
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Stop any running task before the program exits.
    pub fn shutdown(&self) {
        self.cancel_and_wait();
    }

    pub fn state(&self) -> CoordinatorState {
        match &lock(&self.inner).active {
            Some(active) => CoordinatorState::Running {
                id: active.id,
                kind: active.kind,
            },
            None => CoordinatorState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner).active.is_some()
    }

    /// Raw work-unit counter of the active task.
    pub fn progress_count(&self) -> Option<u64> {
        lock(&self.inner)
            .active
            .as_ref()
            .map(|active| active.counter.load(Ordering::Acquire))
    }

    pub fn events(&self) -> &Receiver<TaskEvent> {
        &self.events_rx
    }

    /// Block until task `id` finishes, forwarding its progress to
    /// `on_progress`. Events of other tasks are discarded. Meant for headless
    /// callers that have no event loop of their own.
    pub fn wait(&self, id: TaskId, mut on_progress: impl FnMut(i32)) -> TaskOutcome {
        while let Ok(event) = self.events_rx.recv() {
            match event {
                TaskEvent::Progress {
                    id: event_id,
                    percent,
                    ..
                } if event_id == id => on_progress(percent),
                TaskEvent::Finished {
                    id: event_id,
                    outcome,
                    ..
                } if event_id == id => return outcome,
                _ => {}
            }
        }
        TaskOutcome::Failure(Error::Computation(
            "task event channel closed".to_string(),
        ))
    }
}

impl Drop for TaskCoordinator {
    fn drop(&mut self) {
        if let Some(active) = &lock(&self.inner).active {
            active.cancel.cancel();
        }
    }
}
