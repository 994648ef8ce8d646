pub mod config;
pub mod error;
pub mod log;

// Background work
pub mod coordinator;
pub mod task;

// Domain
pub mod network;
pub mod predict;
pub mod results;
pub mod simulation;

// Decoupled game loop architecture
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use coordinator::{CoordinatorState, TaskCoordinator, TaskEvent};
pub use error::{Error, Result};
pub use network::Network;
pub use task::{TaskId, TaskKind, TaskOutcome, TaskOutput, TaskRequest};
