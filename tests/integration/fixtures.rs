//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Small deterministic networks
//! - Requests that run long enough to be cancelled
//! - Pumping coordinator events through the TEA model

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use epinet::app::{dispatch, event_message};
use epinet::config::Config;
use epinet::network::{DegreeDistribution, Network};
use epinet::simulation::SimulationParams;
use epinet::task::TaskContext;
use epinet::tea::{Message, Model};
use epinet::{TaskCoordinator, TaskRequest};

/// Upper bound for any task in these tests to finish.
pub const TASK_TIMEOUT: Duration = Duration::from_secs(60);

/// Cycle 0-1-2-...-(n-1)-0.
pub fn ring(n: usize) -> Network {
    let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    Network::from_edges(n, &edges)
}

/// Every pair of nodes connected.
pub fn complete(n: usize) -> Network {
    let edges: Vec<(usize, usize)> = (0..n)
        .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
        .collect();
    Network::from_edges(n, &edges)
}

/// Seeded Poisson network generated on the calling thread.
pub fn poisson_network(size: usize, lambda: f64, seed: u64) -> Network {
    use rand::SeedableRng;
    let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
    Network::generate(
        size,
        &DegreeDistribution::Poisson { lambda },
        &mut rng,
        &mut TaskContext::detached(),
    )
    .expect("generation with a detached context cannot be interrupted")
}

/// A simulation that only ends when cancelled.
pub fn endless_simulation() -> TaskRequest {
    TaskRequest::RunSimulation {
        network: Arc::new(ring(2000)),
        params: SimulationParams {
            transmissibility: 1.0,
            num_runs: 10_000_000,
            ..SimulationParams::default()
        },
        seed: Some(1),
    }
}

/// Model with a fixed seed and the given network size.
pub fn test_model(size: usize) -> Model {
    let mut config = Config::default();
    config.network.size = size;
    config.seed = Some(7);
    Model::new(config)
}

pub fn key(c: char) -> Message {
    Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()))
}

/// Feed coordinator events into the model until no task is running.
/// Returns the progress values the model saw, in order.
pub fn run_until_idle(model: &mut Model, coordinator: &TaskCoordinator) -> Vec<i32> {
    let deadline = Instant::now() + TASK_TIMEOUT;
    let mut seen = Vec::new();
    while model.running.is_some() {
        assert!(Instant::now() < deadline, "task did not finish in time");
        if let Ok(event) = coordinator
            .events()
            .recv_timeout(Duration::from_millis(50))
        {
            dispatch(model, coordinator, event_message(event));
            if model.running.is_some() {
                seen.push(model.progress);
            }
        }
    }
    seen
}
