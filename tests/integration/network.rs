//! Network generation, edge-list files and structural analysis, run through
//! the coordinator.

use std::sync::Arc;

use tempfile::TempDir;

use epinet::network::{DegreeDistribution, Network};
use epinet::{Error, TaskCoordinator, TaskOutcome, TaskOutput, TaskRequest};

use crate::fixtures::{complete, key, poisson_network, ring, run_until_idle, test_model};

fn run(coordinator: &TaskCoordinator, request: TaskRequest) -> TaskOutcome {
    let id = coordinator.start(request).expect("request accepted");
    coordinator.wait(id, |_| {})
}

fn expect_network(outcome: TaskOutcome) -> Network {
    match outcome {
        TaskOutcome::Success(TaskOutput::Network(network)) => network,
        other => panic!("expected a network, got {other:?}"),
    }
}

#[test]
fn test_same_seed_same_network() {
    let coordinator = TaskCoordinator::new();
    let request = || TaskRequest::GenerateNetwork {
        size: 2000,
        distribution: DegreeDistribution::Exponential { beta: 0.3 },
        seed: Some(11),
    };
    let a = expect_network(run(&coordinator, request()));
    let b = expect_network(run(&coordinator, request()));
    assert_eq!(a.edges().collect::<Vec<_>>(), b.edges().collect::<Vec<_>>());
}

#[test]
fn test_constant_degree_network() {
    let coordinator = TaskCoordinator::new();
    let network = expect_network(run(
        &coordinator,
        TaskRequest::GenerateNetwork {
            size: 1000,
            distribution: DegreeDistribution::Constant { k: 4 },
            seed: Some(5),
        },
    ));
    let stats = network.degree_stats();
    assert_eq!(stats.nodes, 1000);
    // Erased self loops and multi-edges only ever lower degrees.
    assert!(network.degrees().iter().all(|&k| k <= 4));
    assert!(stats.mean_degree > 3.9, "mean degree {}", stats.mean_degree);
}

#[test]
fn test_connect_keeps_labels_and_input() {
    let coordinator = TaskCoordinator::new();
    let original = Arc::new(ring(500));
    let rewired = expect_network(run(
        &coordinator,
        TaskRequest::ConnectNetwork {
            network: original.clone(),
            distribution: DegreeDistribution::Poisson { lambda: 6.0 },
            seed: Some(2),
        },
    ));
    assert_eq!(rewired.node_count(), 500);
    assert!(rewired.labels().eq(original.labels()));
    assert_eq!(original.edge_count(), 500);
}

/// Given a generated network
/// When it is exported and imported again
/// Then the imported network has the same structure
#[test]
fn test_edge_list_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("net.csv");
    let coordinator = TaskCoordinator::new();
    let network = Arc::new(poisson_network(1500, 5.0, 9));
    let isolated = network.degrees().iter().filter(|&&k| k == 0).count();

    match run(
        &coordinator,
        TaskRequest::ExportEdgeList {
            network: network.clone(),
            path: path.clone(),
        },
    ) {
        TaskOutcome::Success(TaskOutput::Exported { edges, .. }) => {
            assert_eq!(edges, network.edge_count())
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let imported = expect_network(run(&coordinator, TaskRequest::ImportEdgeList { path }));
    assert_eq!(imported.edge_count(), network.edge_count());
    // Isolated nodes have no line in an edge list.
    assert_eq!(imported.node_count(), network.node_count() - isolated);
    let mut before: Vec<usize> = network.degrees().into_iter().filter(|&k| k > 0).collect();
    let mut after = imported.degrees();
    before.sort_unstable();
    after.sort_unstable();
    assert_eq!(before, after);
}

#[test]
fn test_import_reports_bad_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.txt");
    std::fs::write(&path, "a b\n# comment\n\nc\n").unwrap();

    let coordinator = TaskCoordinator::new();
    match run(&coordinator, TaskRequest::ImportEdgeList { path }) {
        TaskOutcome::Failure(Error::EdgeListParse { line, .. }) => assert_eq!(line, 4),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_import_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let coordinator = TaskCoordinator::new();
    let outcome = run(
        &coordinator,
        TaskRequest::ImportEdgeList {
            path: dir.path().join("missing.txt"),
        },
    );
    assert!(matches!(outcome, TaskOutcome::Failure(Error::Io(_))));
}

#[test]
fn test_import_and_export_through_ui() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("contacts.txt");
    std::fs::write(&source, "alice bob\nbob carol\ncarol alice\ndave erin\n").unwrap();

    let coordinator = TaskCoordinator::new();
    let mut model = test_model(10);
    model.edge_list_path = source.display().to_string();

    epinet::app::dispatch(&mut model, &coordinator, key('i'));
    run_until_idle(&mut model, &coordinator);
    assert_eq!(model.status, "Imported 5 nodes and 4 edges");

    epinet::app::dispatch(&mut model, &coordinator, key('m'));
    run_until_idle(&mut model, &coordinator);
    assert_eq!(model.status, "Kept largest component (3 nodes)");

    let target = dir.path().join("giant.txt");
    model.edge_list_path = target.display().to_string();
    epinet::app::dispatch(&mut model, &coordinator, key('e'));
    run_until_idle(&mut model, &coordinator);

    let written = std::fs::read_to_string(&target).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(!written.contains("dave"));
}

#[test]
fn test_structural_analysis() {
    let coordinator = TaskCoordinator::new();
    let two_parts = Arc::new(Network::from_edges(
        8,
        &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (5, 6)],
    ));

    match run(
        &coordinator,
        TaskRequest::AnalyzeComponents {
            network: two_parts.clone(),
        },
    ) {
        TaskOutcome::Success(TaskOutput::Components(stats)) => {
            assert_eq!(stats.count, 3);
            assert_eq!(stats.giant, 5);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    match run(
        &coordinator,
        TaskRequest::CalculateDistances {
            network: Arc::new(ring(10)),
        },
    ) {
        TaskOutcome::Success(TaskOutput::Distances(stats)) => {
            assert_eq!(stats.diameter, 5);
            assert!((stats.mean - 25.0 / 9.0).abs() < 1e-9);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    match run(
        &coordinator,
        TaskRequest::CalculateTransitivity {
            network: Arc::new(complete(6)),
        },
    ) {
        TaskOutcome::Success(TaskOutput::Transitivity(t)) => assert!((t - 1.0).abs() < 1e-12),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
