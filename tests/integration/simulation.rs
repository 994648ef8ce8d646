//! Epidemic simulations compared against the generating-function
//! predictions, plus result retention through the UI.

use std::sync::Arc;

use epinet::network::Network;
use epinet::predict::Predictions;
use epinet::results::ResultsAnalysis;
use epinet::simulation::{SimResults, SimulationParams, SimulationType};
use epinet::{TaskCoordinator, TaskOutcome, TaskOutput, TaskRequest};

use crate::fixtures::{key, poisson_network, run_until_idle, test_model};

const SIZE: usize = 5000;

fn simulate(network: &Arc<Network>, params: SimulationParams, seed: u64) -> SimResults {
    let coordinator = TaskCoordinator::new();
    let id = coordinator
        .start(TaskRequest::RunSimulation {
            network: network.clone(),
            params,
            seed: Some(seed),
        })
        .expect("request accepted");
    match coordinator.wait(id, |_| {}) {
        TaskOutcome::Success(TaskOutput::Simulation(results)) => results,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

fn params(sim_type: SimulationType, t: f64, runs: usize) -> SimulationParams {
    SimulationParams {
        sim_type,
        transmissibility: t,
        num_runs: runs,
        ..SimulationParams::default()
    }
}

/// Mean epidemic size as a fraction of the network, next to the predicted one.
fn epidemic_fraction(network: &Network, results: &SimResults, p: &SimulationParams) -> (f64, f64) {
    let analysis = ResultsAnalysis::from_final_sizes(&results.final_sizes());
    assert!(analysis.threshold.is_some(), "no outbreak/epidemic split");
    let epidemics = analysis.epidemics.expect("some runs became epidemics");
    let predicted = Predictions::compute(&network.degree_stats(), p).network_size;
    (epidemics.mean / network.node_count() as f64, predicted)
}

#[test]
fn test_percolation_matches_predicted_size() {
    let network = Arc::new(poisson_network(SIZE, 5.0, 21));
    let p = params(SimulationType::Percolation, 0.5, 200);
    let results = simulate(&network, p.clone(), 4);

    assert_eq!(results.runs.len(), 200);
    assert_eq!(results.network_size, SIZE);
    for run in &results.runs {
        assert_eq!(run.epi_curve.iter().sum::<usize>(), run.final_size);
        assert!(run.final_size >= 1 && run.final_size <= SIZE);
    }

    let (observed, predicted) = epidemic_fraction(&network, &results, &p);
    assert!(
        (observed - predicted).abs() < 0.03,
        "observed {observed:.3}, predicted {predicted:.3}"
    );
}

#[test]
fn test_chain_binomial_matches_predicted_size() {
    let network = Arc::new(poisson_network(SIZE, 5.0, 22));
    let p = SimulationParams {
        infectious_period: 4,
        ..params(SimulationType::ChainBinomial, 0.5, 100)
    };
    let results = simulate(&network, p.clone(), 8);

    assert_eq!(results.sim_type, SimulationType::ChainBinomial);
    let (observed, predicted) = epidemic_fraction(&network, &results, &p);
    assert!(
        (observed - predicted).abs() < 0.03,
        "observed {observed:.3}, predicted {predicted:.3}"
    );
}

#[test]
fn test_below_threshold_only_small_outbreaks() {
    let network = Arc::new(poisson_network(SIZE, 5.0, 23));
    let stats = network.degree_stats();
    let p = params(SimulationType::Percolation, 0.1, 300);
    let prediction = Predictions::compute(&stats, &p);
    assert!(prediction.r0 < 1.0);
    assert!(prediction.t_crit.map_or(false, |t| t > 0.1));

    let results = simulate(&network, p, 5);
    let all = ResultsAnalysis::from_final_sizes(&results.final_sizes())
        .all
        .expect("runs present");
    assert!(all.max < SIZE / 20, "largest outbreak {}", all.max);
    assert!(all.mean < 10.0, "mean outbreak {}", all.mean);
}

#[test]
fn test_seeded_simulations_repeat() {
    let network = Arc::new(poisson_network(1000, 4.0, 24));
    let p = params(SimulationType::Percolation, 0.4, 20);
    let a = simulate(&network, p.clone(), 99);
    let b = simulate(&network, p, 99);
    assert_eq!(a, b);
}

/// Given retain-data on
/// When two compatible batches finish
/// Then their runs are appended; an incompatible batch replaces them
#[test]
fn test_retained_results_accumulate() {
    let coordinator = TaskCoordinator::new();
    let mut model = test_model(500);
    model.config.retain_data = true;
    model.config.simulation.num_runs = 5;
    model.set_network(poisson_network(500, 4.0, 25));

    for _ in 0..2 {
        epinet::app::dispatch(&mut model, &coordinator, key('s'));
        run_until_idle(&mut model, &coordinator);
    }
    assert_eq!(model.results.as_ref().map(|r| r.runs.len()), Some(10));
    let analysis = model.analysis.as_ref().expect("analysis recomputed");
    assert_eq!(analysis.all.as_ref().map(|s| s.n), Some(10));

    model.config.simulation.sim_type = SimulationType::ChainBinomial;
    epinet::app::dispatch(&mut model, &coordinator, key('s'));
    run_until_idle(&mut model, &coordinator);
    let results = model.results.as_ref().expect("results stored");
    assert_eq!(results.runs.len(), 5);
    assert_eq!(results.sim_type, SimulationType::ChainBinomial);

    // 'z' deletes the data but keeps the network.
    epinet::tea::update(&mut model, key('z'));
    assert!(model.results.is_none());
    assert!(model.network.is_some());
}

#[test]
fn test_results_replaced_without_retain() {
    let coordinator = TaskCoordinator::new();
    let mut model = test_model(300);
    model.config.simulation.num_runs = 3;
    model.set_network(poisson_network(300, 4.0, 26));

    for _ in 0..2 {
        epinet::app::dispatch(&mut model, &coordinator, key('s'));
        run_until_idle(&mut model, &coordinator);
    }
    assert_eq!(model.results.as_ref().map(|r| r.runs.len()), Some(3));
    assert_eq!(model.status, "Simulation complete");
}
