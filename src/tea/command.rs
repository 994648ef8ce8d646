//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

use crate::config::Config;
use crate::task::TaskRequest;

/// Output commands from the update function.
#[derive(Debug)]
pub enum Command {
    /// Hand a request to the task coordinator.
    StartTask(TaskRequest),
    /// Ask the running task to stop at its next checkpoint.
    CancelTask,

    // Settings persistence
    SaveConfig(Config),

    // App lifecycle
    Quit,
}
