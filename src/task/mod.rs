//! Background task model.
//!
//! A task is one long-running operation executed on the worker thread:
//! building or rewiring a network, moving edge lists on and off disk,
//! analyzing the network, or running a batch of epidemic simulations.
//! Requests carry everything the worker needs; input networks are shared
//! read-only through `Arc`, and anything the task produces stays owned by
//! the worker until it is handed back inside a [`TaskOutcome`].

pub mod context;
pub mod progress;
pub mod run;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::network::{ComponentStats, DegreeDistribution, DistanceStats, Network};
use crate::simulation::{SimResults, SimulationParams};
use crate::{Error, Result};

pub use context::{ProgressSink, TaskContext};
pub use progress::{percent_complete, ProgressTracker, INDETERMINATE};

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of operations that run in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    GenerateNetwork,
    ConnectNetwork,
    ImportEdgeList,
    ExportEdgeList,
    AnalyzeComponents,
    RemoveMinorComponents,
    CalculateTransitivity,
    CalculateDistances,
    RunSimulation,
}

impl TaskKind {
    /// Status line shown while the task runs.
    pub fn busy_message(&self) -> &'static str {
        match self {
            TaskKind::GenerateNetwork | TaskKind::ConnectNetwork => {
                "Generating network topology . . ."
            }
            TaskKind::ImportEdgeList => "Importing edge list . . .",
            TaskKind::ExportEdgeList => "Saving edge list . . .",
            TaskKind::AnalyzeComponents => "Finding components . . .",
            TaskKind::RemoveMinorComponents => "Removing minor components . . .",
            TaskKind::CalculateTransitivity => "Calculating transitivity . . .",
            TaskKind::CalculateDistances => "Calculating distances . . .",
            TaskKind::RunSimulation => "Running simulation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::GenerateNetwork => "network generation",
            TaskKind::ConnectNetwork => "network rewiring",
            TaskKind::ImportEdgeList => "edge list import",
            TaskKind::ExportEdgeList => "edge list export",
            TaskKind::AnalyzeComponents => "component analysis",
            TaskKind::RemoveMinorComponents => "minor component removal",
            TaskKind::CalculateTransitivity => "transitivity calculation",
            TaskKind::CalculateDistances => "distance calculation",
            TaskKind::RunSimulation => "simulation",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A request for background work, with all of its inputs.
#[derive(Debug, Clone)]
pub enum TaskRequest {
    GenerateNetwork {
        size: usize,
        distribution: DegreeDistribution,
        seed: Option<u64>,
    },
    /// Draw a fresh edge set over the nodes of an existing network.
    ConnectNetwork {
        network: Arc<Network>,
        distribution: DegreeDistribution,
        seed: Option<u64>,
    },
    ImportEdgeList {
        path: PathBuf,
    },
    ExportEdgeList {
        network: Arc<Network>,
        path: PathBuf,
    },
    AnalyzeComponents {
        network: Arc<Network>,
    },
    RemoveMinorComponents {
        network: Arc<Network>,
    },
    CalculateTransitivity {
        network: Arc<Network>,
    },
    CalculateDistances {
        network: Arc<Network>,
    },
    RunSimulation {
        network: Arc<Network>,
        params: SimulationParams,
        seed: Option<u64>,
    },
}

impl TaskRequest {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskRequest::GenerateNetwork { .. } => TaskKind::GenerateNetwork,
            TaskRequest::ConnectNetwork { .. } => TaskKind::ConnectNetwork,
            TaskRequest::ImportEdgeList { .. } => TaskKind::ImportEdgeList,
            TaskRequest::ExportEdgeList { .. } => TaskKind::ExportEdgeList,
            TaskRequest::AnalyzeComponents { .. } => TaskKind::AnalyzeComponents,
            TaskRequest::RemoveMinorComponents { .. } => TaskKind::RemoveMinorComponents,
            TaskRequest::CalculateTransitivity { .. } => TaskKind::CalculateTransitivity,
            TaskRequest::CalculateDistances { .. } => TaskKind::CalculateDistances,
            TaskRequest::RunSimulation { .. } => TaskKind::RunSimulation,
        }
    }

    /// Reject malformed input before any thread is spawned.
    pub fn validate(&self) -> Result<()> {
        match self {
            TaskRequest::GenerateNetwork {
                size, distribution, ..
            } => {
                if *size == 0 {
                    return Err(Error::invalid(
                        crate::network::FIELD_SIZE,
                        "must be a positive number of nodes",
                    ));
                }
                distribution.validate(*size)
            }
            TaskRequest::ConnectNetwork {
                network,
                distribution,
                ..
            } => {
                if network.node_count() == 0 {
                    return Err(Error::NoNetwork);
                }
                distribution.validate(network.node_count())
            }
            TaskRequest::ImportEdgeList { path } | TaskRequest::ExportEdgeList { path, .. } => {
                if path.as_os_str().is_empty() {
                    return Err(Error::invalid(
                        crate::network::FIELD_PATH,
                        "no file name given",
                    ));
                }
                Ok(())
            }
            TaskRequest::AnalyzeComponents { network }
            | TaskRequest::RemoveMinorComponents { network }
            | TaskRequest::CalculateTransitivity { network }
            | TaskRequest::CalculateDistances { network } => {
                if network.node_count() == 0 {
                    return Err(Error::NoNetwork);
                }
                Ok(())
            }
            TaskRequest::RunSimulation {
                network, params, ..
            } => {
                if network.node_count() == 0 {
                    return Err(Error::NoNetwork);
                }
                params.validate(network.node_count())
            }
        }
    }
}

/// What a successful task hands back.
#[derive(Debug)]
pub enum TaskOutput {
    Network(Network),
    Components(ComponentStats),
    Transitivity(f64),
    Distances(DistanceStats),
    Simulation(SimResults),
    Exported { path: PathBuf, edges: usize },
}

/// Final result of a task, delivered exactly once.
#[derive(Debug)]
pub enum TaskOutcome {
    Success(TaskOutput),
    Failure(Error),
    Cancelled,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled)
    }
}

/// Why a task body stopped early.
#[derive(Debug)]
pub enum Interrupt {
    Cancelled,
    Failed(Error),
}

impl From<Error> for Interrupt {
    fn from(err: Error) -> Self {
        Interrupt::Failed(err)
    }
}

impl From<std::io::Error> for Interrupt {
    fn from(err: std::io::Error) -> Self {
        Interrupt::Failed(Error::Io(err))
    }
}

pub type TaskResult<T> = std::result::Result<T, Interrupt>;
