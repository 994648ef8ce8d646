//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from keyboard
//! events, the task coordinator, or command completion callbacks.

use crossterm::event::KeyEvent;

use crate::task::{TaskId, TaskKind, TaskOutcome};
use crate::Error;

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    // Coordinator responses to StartTask
    TaskStarted {
        id: TaskId,
        kind: TaskKind,
    },
    TaskRejected {
        kind: TaskKind,
        error: Error,
    },

    // From the worker, relayed by the logic thread
    TaskProgress {
        id: TaskId,
        percent: i32,
    },
    TaskFinished {
        id: TaskId,
        kind: TaskKind,
        outcome: TaskOutcome,
    },

    // Settings persistence
    ConfigSaved,
    ConfigSaveFailed(String),
}
