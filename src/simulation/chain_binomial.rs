use rand::Rng;

use super::{patients_zero, NodeState, RunResult, SimulationParams};
use crate::predict::t_to_tcb;
use crate::task::{TaskContext, TaskResult};

/// One chain-binomial epidemic in daily steps. An infectious node exposes
/// each susceptible neighbor every day with the daily probability derived
/// from `T` and the infectious period, and recovers after that many days.
/// Nodes infected today start transmitting tomorrow.
pub fn run_once<R: Rng>(
    adjacency: &[Vec<usize>],
    params: &SimulationParams,
    rng: &mut R,
    ctx: &TaskContext,
) -> TaskResult<RunResult> {
    let n = adjacency.len();
    let period = params.infectious_period.max(1);
    let daily = t_to_tcb(params.transmissibility, period);

    let mut state = vec![NodeState::Susceptible; n];
    let mut days_left = vec![0u32; n];

    let mut infectious = patients_zero(rng, n, params.p_zero);
    for &node in &infectious {
        state[node] = NodeState::Infectious;
        days_left[node] = period;
    }
    let mut epi_curve = vec![infectious.len()];
    let mut final_size = infectious.len();

    let mut newly = Vec::new();
    while !infectious.is_empty() {
        ctx.checkpoint()?;
        for &node in &infectious {
            for &neighbor in &adjacency[node] {
                if state[neighbor] == NodeState::Susceptible && rng.gen_bool(daily) {
                    state[neighbor] = NodeState::Infectious;
                    days_left[neighbor] = period;
                    newly.push(neighbor);
                }
            }
        }

        infectious.retain(|&node| {
            days_left[node] -= 1;
            if days_left[node] == 0 {
                state[node] = NodeState::Recovered;
                false
            } else {
                true
            }
        });

        epi_curve.push(newly.len());
        final_size += newly.len();
        infectious.append(&mut newly);
    }

    // Drop the trailing days on which the last cases were recovering.
    while epi_curve.len() > 1 && epi_curve.last() == Some(&0) {
        epi_curve.pop();
    }

    Ok(RunResult {
        epi_curve,
        final_size,
    })
}
