use rand::Rng;

use super::{patients_zero, NodeState, RunResult, SimulationParams};
use crate::task::{TaskContext, TaskResult};

/// One percolation epidemic. Every newly infected node transmits along each
/// edge to a susceptible neighbor with probability `T` exactly once, during
/// the generation after its infection, and then recovers.
pub fn run_once<R: Rng>(
    adjacency: &[Vec<usize>],
    params: &SimulationParams,
    rng: &mut R,
    ctx: &TaskContext,
) -> TaskResult<RunResult> {
    let n = adjacency.len();
    let t = params.transmissibility;
    let mut state = vec![NodeState::Susceptible; n];

    let mut current = patients_zero(rng, n, params.p_zero);
    for &node in &current {
        state[node] = NodeState::Infectious;
    }
    let mut epi_curve = vec![current.len()];
    let mut final_size = current.len();

    let mut next = Vec::new();
    while !current.is_empty() {
        ctx.checkpoint()?;
        for &node in &current {
            for &neighbor in &adjacency[node] {
                if state[neighbor] == NodeState::Susceptible && rng.gen_bool(t) {
                    state[neighbor] = NodeState::Infectious;
                    next.push(neighbor);
                }
            }
            state[node] = NodeState::Recovered;
        }
        if next.is_empty() {
            break;
        }
        epi_curve.push(next.len());
        final_size += next.len();
        std::mem::swap(&mut current, &mut next);
        next.clear();
    }

    Ok(RunResult {
        epi_curve,
        final_size,
    })
}
