//! Task lifecycle tests.
//!
//! These run real workers: every request goes through `TaskCoordinator` and
//! every result comes back as a `TaskEvent`.

use std::sync::Arc;
use std::time::Duration;

use epinet::network::DegreeDistribution;
use epinet::task::percent_complete;
use epinet::tea::Message;
use epinet::{
    CoordinatorState, Error, TaskCoordinator, TaskEvent, TaskKind, TaskOutcome, TaskOutput,
    TaskRequest,
};

use crate::fixtures::{
    complete, endless_simulation, key, ring, run_until_idle, test_model, TASK_TIMEOUT,
};

#[test]
fn test_percent_complete_bounds() {
    for predicted in [1.0, 3.0, 100.0, 1e6] {
        for current in [-5, 0, 1, 2, 50, 99, 100, 1_000_000, 10_000_000] {
            let p = percent_complete(current, predicted);
            assert!((0..=100).contains(&p), "{current}/{predicted} gave {p}");
        }
    }
    assert_eq!(percent_complete(10, 0.0), -1);
    assert_eq!(percent_complete(10, -3.0), -1);
}

/// Given a 10000-node Poisson(5) request from the UI
/// When the worker runs it to completion
/// Then the surface is disabled while running and re-enabled with the network
#[test]
fn test_generate_network_through_ui() {
    let coordinator = TaskCoordinator::new();
    let mut model = test_model(10_000);

    epinet::app::dispatch(&mut model, &coordinator, key('g'));
    assert!(matches!(
        model.running,
        Some((_, TaskKind::GenerateNetwork))
    ));
    assert!(!model.surface_enabled());
    assert!(matches!(
        coordinator.state(),
        CoordinatorState::Running {
            kind: TaskKind::GenerateNetwork,
            ..
        }
    ));

    let progress = run_until_idle(&mut model, &coordinator);

    assert!(model.surface_enabled());
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    let stats = model.degree_stats.as_ref().expect("network stats");
    assert_eq!(stats.nodes, 10_000);
    assert!(
        (stats.mean_degree - 5.0).abs() < 0.3,
        "mean degree {}",
        stats.mean_degree
    );
    assert!(model.predictions.is_some());
    assert_eq!(model.status, "Network generated");

    let determinate: Vec<i32> = progress.into_iter().filter(|&p| p >= 0).collect();
    assert!(
        determinate.windows(2).all(|w| w[0] <= w[1]),
        "progress went backwards: {determinate:?}"
    );
}

#[test]
fn test_progress_is_monotonic_and_finished_is_last() {
    let coordinator = TaskCoordinator::new();
    let id = coordinator
        .start(TaskRequest::GenerateNetwork {
            size: 20_000,
            distribution: DegreeDistribution::Poisson { lambda: 4.0 },
            seed: Some(3),
        })
        .unwrap();

    let mut last = -1;
    let mut finished = 0;
    loop {
        let event = coordinator
            .events()
            .recv_timeout(TASK_TIMEOUT)
            .expect("event before timeout");
        assert_eq!(event.id(), id);
        match event {
            TaskEvent::Progress { percent, .. } => {
                assert_eq!(finished, 0, "progress after completion");
                assert!(percent >= last, "{percent} after {last}");
                last = percent;
            }
            TaskEvent::Finished { outcome, .. } => {
                assert!(outcome.is_success());
                assert_eq!(coordinator.state(), CoordinatorState::Idle);
                finished += 1;
                break;
            }
        }
    }

    assert_eq!(finished, 1);
    assert!(coordinator
        .events()
        .recv_timeout(Duration::from_millis(200))
        .is_err());
}

#[test]
fn test_start_while_running_is_rejected() {
    let coordinator = TaskCoordinator::new();
    let id = coordinator.start(endless_simulation()).unwrap();

    let err = coordinator
        .start(TaskRequest::AnalyzeComponents {
            network: Arc::new(ring(10)),
        })
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning));
    assert_eq!(
        coordinator.state(),
        CoordinatorState::Running {
            id,
            kind: TaskKind::RunSimulation
        }
    );

    coordinator.cancel_and_wait();
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
}

#[test]
fn test_cancel_while_idle_does_nothing() {
    let coordinator = TaskCoordinator::new();
    coordinator.cancel();
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert!(coordinator.events().try_recv().is_err());

    // Still usable afterwards
    let id = coordinator
        .start(TaskRequest::CalculateTransitivity {
            network: Arc::new(complete(5)),
        })
        .unwrap();
    match coordinator.wait(id, |_| {}) {
        TaskOutcome::Success(TaskOutput::Transitivity(t)) => assert!((t - 1.0).abs() < 1e-12),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_zero_size_network_is_invalid() {
    let coordinator = TaskCoordinator::new();
    let err = coordinator
        .start(TaskRequest::GenerateNetwork {
            size: 0,
            distribution: DegreeDistribution::Poisson { lambda: 5.0 },
            seed: None,
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameters { .. }));
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert!(coordinator.events().try_recv().is_err());
}

/// Given power-law parameters that cannot be sampled
/// When they are submitted
/// Then `start` rejects them and no task event is ever sent
#[test]
fn test_unsampleable_power_law_is_rejected_at_start() {
    let coordinator = TaskCoordinator::new();
    for (size, alpha, kappa) in [(1, 1.5, 10.0), (1000, -500.0, 10.0), (1000, 1.5, 1e-300)] {
        let err = coordinator
            .start(TaskRequest::GenerateNetwork {
                size,
                distribution: DegreeDistribution::PowerLaw { alpha, kappa },
                seed: Some(1),
            })
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidParameters { .. }),
            "size {size}, alpha {alpha}, kappa {kappa}: {err:?}"
        );
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }
    assert!(coordinator.events().try_recv().is_err());
}

#[test]
fn test_dense_network_is_rejected_at_start() {
    let coordinator = TaskCoordinator::new();
    let err = coordinator
        .start(TaskRequest::GenerateNetwork {
            size: 10_000,
            distribution: DegreeDistribution::Poisson { lambda: 9000.0 },
            seed: None,
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameters { .. }));
    assert!(coordinator.events().try_recv().is_err());
}

#[test]
fn test_zero_size_network_from_ui_marks_field() {
    let coordinator = TaskCoordinator::new();
    let mut model = test_model(0);

    epinet::app::dispatch(&mut model, &coordinator, key('g'));

    assert!(model.running.is_none());
    assert!(model.surface_enabled());
    assert!(model.field_error.is_some());
    assert!(model.network.is_none());
}

/// Given a long simulation started from the UI
/// When the user cancels it
/// Then the task ends Cancelled, the coordinator is idle and no runs are stored
#[test]
fn test_cancel_simulation_leaves_no_results() {
    let coordinator = TaskCoordinator::new();
    let mut model = test_model(2000);
    model.config.simulation.transmissibility = 1.0;
    model.config.simulation.num_runs = 10_000_000;
    model.set_network(ring(2000));

    epinet::app::dispatch(&mut model, &coordinator, key('s'));
    assert!(matches!(model.running, Some((_, TaskKind::RunSimulation))));

    std::thread::sleep(Duration::from_millis(50));
    epinet::app::dispatch(&mut model, &coordinator, key('c'));
    run_until_idle(&mut model, &coordinator);

    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert!(model.surface_enabled());
    assert!(model.results.is_none());
    assert!(model.analysis.is_none());
    assert_eq!(model.status, "Simulation cancelled");
    // The network the simulation read from is still there.
    assert_eq!(model.network.as_ref().map(|n| n.node_count()), Some(2000));
}

#[test]
fn test_stale_finish_is_ignored_by_model() {
    let mut model = test_model(100);
    model.set_network(ring(100));
    let before = model.degree_stats.clone();

    epinet::tea::update(
        &mut model,
        Message::TaskFinished {
            id: epinet::TaskId::new(),
            kind: TaskKind::GenerateNetwork,
            outcome: TaskOutcome::Success(TaskOutput::Network(complete(4))),
        },
    );

    assert_eq!(model.degree_stats, before);
}

#[test]
fn test_tasks_run_back_to_back() {
    let coordinator = TaskCoordinator::new();
    let network = Arc::new(ring(50));
    for request in [
        TaskRequest::AnalyzeComponents {
            network: network.clone(),
        },
        TaskRequest::CalculateDistances {
            network: network.clone(),
        },
        TaskRequest::RemoveMinorComponents {
            network: network.clone(),
        },
    ] {
        let id = coordinator.start(request).unwrap();
        assert!(coordinator.wait(id, |_| {}).is_success());
        assert!(!coordinator.is_running());
    }
}
