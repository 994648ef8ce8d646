//! Executes a [`TaskRequest`] on the current thread.

use std::panic::{self, AssertUnwindSafe};

use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::{Interrupt, TaskContext, TaskOutcome, TaskOutput, TaskRequest, TaskResult};
use crate::network::{analysis, edgelist, Network};
use crate::simulation;
use crate::{elog_debug, elog_error, Error};

fn rng_for(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    }
}

/// Importing this path panics inside the worker, for tests of panic handling.
#[cfg(test)]
pub(crate) const PANIC_PATH: &str = ":panic:";

fn body(request: TaskRequest, ctx: &mut TaskContext) -> TaskResult<TaskOutput> {
    #[cfg(test)]
    if let TaskRequest::ImportEdgeList { path } = &request {
        if path.to_str() == Some(PANIC_PATH) {
            panic!("import of {} panicked", PANIC_PATH);
        }
    }
    match request {
        TaskRequest::GenerateNetwork {
            size,
            distribution,
            seed,
        } => {
            let mut rng = rng_for(seed);
            Network::generate(size, &distribution, &mut rng, ctx).map(TaskOutput::Network)
        }
        TaskRequest::ConnectNetwork {
            network,
            distribution,
            seed,
        } => {
            let mut rng = rng_for(seed);
            network
                .connect(&distribution, &mut rng, ctx)
                .map(TaskOutput::Network)
        }
        TaskRequest::ImportEdgeList { path } => {
            edgelist::read_edge_list(&path, ctx).map(TaskOutput::Network)
        }
        TaskRequest::ExportEdgeList { network, path } => {
            let edges = edgelist::write_edge_list(&network, &path, ctx)?;
            Ok(TaskOutput::Exported { path, edges })
        }
        TaskRequest::AnalyzeComponents { network } => {
            analysis::components(&network, ctx).map(TaskOutput::Components)
        }
        TaskRequest::RemoveMinorComponents { network } => {
            analysis::remove_minor_components(&network, ctx).map(TaskOutput::Network)
        }
        TaskRequest::CalculateTransitivity { network } => {
            analysis::transitivity(&network, ctx).map(TaskOutput::Transitivity)
        }
        TaskRequest::CalculateDistances { network } => {
            analysis::distances(&network, ctx).map(TaskOutput::Distances)
        }
        TaskRequest::RunSimulation {
            network,
            params,
            seed,
        } => {
            let mut rng = rng_for(seed);
            simulation::run(&network, &params, &mut rng, ctx).map(TaskOutput::Simulation)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run the request to completion, cancellation or failure. Never panics:
/// a panic inside the computation becomes [`Error::WorkerPanic`].
pub fn execute(request: TaskRequest, ctx: &mut TaskContext) -> TaskOutcome {
    let kind = request.kind();
    elog_debug!("Executing {}", kind);

    let result = panic::catch_unwind(AssertUnwindSafe(|| body(request, ctx)));
    match result {
        Ok(Ok(output)) => TaskOutcome::Success(output),
        Ok(Err(Interrupt::Cancelled)) => TaskOutcome::Cancelled,
        Ok(Err(Interrupt::Failed(err))) => TaskOutcome::Failure(err),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            elog_error!("{} panicked: {}", kind, message);
            TaskOutcome::Failure(Error::WorkerPanic(message))
        }
    }
}
