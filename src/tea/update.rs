//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{Config, NetworkSettings};
use crate::simulation::SimulationParams;
use crate::task::{TaskKind, TaskOutcome, TaskOutput, TaskRequest, INDETERMINATE};
use crate::error::ErrorCategory;
use crate::{elog, elog_debug, elog_error, elog_trace, elog_warn, Error};

use super::command::Command;
use super::field::Field;
use super::message::Message;
use super::model::{Mode, Model, Notification, NotificationLevel};

const STATUS_NETWORK_DELETED: &str = "Network deleted";
const STATUS_DATA_DELETED: &str = "All data deleted";
const STATUS_DEFAULTS: &str = "Default settings restored";
const BUSY_HINT: &str = "A task is running. Press c to cancel it.";

/// Helper to set an error notification and mark model as dirty.
fn set_error(model: &mut Model, message: String) {
    elog_warn!("UI Error: {}", message);
    show_error(model, message);
}

fn show_error(model: &mut Model, message: String) {
    model.notification = Some(Notification {
        level: NotificationLevel::Error,
        message,
    });
    model.dirty = true;
}

fn set_info(model: &mut Model, message: impl Into<String>) {
    model.notification = Some(Notification {
        level: NotificationLevel::Info,
        message: message.into(),
    });
    model.dirty = true;
}

/// Put the reason of an `InvalidParameters` error next to its settings field.
fn mark_field(model: &mut Model, error: &Error) {
    if let Error::InvalidParameters { field, reason } = error {
        if let Some(field) = Field::for_param(field) {
            model.field_error = Some((field, reason.clone()));
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pure update function: Model + Message → Commands
///
/// All I/O happens via the returned Commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None; // Clear notification on any key press
            model.dirty = true;
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                if model.running.is_some() {
                    cmds.push(Command::CancelTask);
                }
                cmds.push(Command::Quit);
                return cmds;
            }
            match model.mode {
                Mode::Normal if model.surface_enabled() => {
                    update_normal_mode(model, key, &mut cmds)
                }
                Mode::Normal => update_busy(model, key, &mut cmds),
                Mode::Editing(field) => update_editing_mode(model, key, field),
            }
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::TaskStarted { id, kind } => {
            elog_debug!("Message::TaskStarted kind={} id={}", kind, id.short());
            model.running = Some((id, kind));
            model.task_serial = model.task_serial.wrapping_add(1);
            model.progress = INDETERMINATE;
            model.status = kind.busy_message().to_string();
            model.dirty = true;
        }

        Message::TaskRejected { kind, error } => {
            elog_warn!("Message::TaskRejected kind={} err={}", kind, error);
            mark_field(model, &error);
            set_error(model, format!("Cannot start {}: {}", kind, error));
        }

        Message::TaskProgress { id, percent } => {
            if model.running.is_some_and(|(running, _)| running == id) {
                elog_trace!("Message::TaskProgress id={} percent={}", id.short(), percent);
                model.progress = percent;
                model.dirty = true;
            }
        }

        Message::TaskFinished { id, kind, outcome } => {
            if !model.running.is_some_and(|(running, _)| running == id) {
                elog_warn!("Ignoring outcome of unknown task {}", id.short());
                return cmds;
            }
            model.running = None;
            model.progress = INDETERMINATE;
            model.dirty = true;
            handle_outcome(model, kind, outcome);
        }

        Message::ConfigSaved => {
            elog_debug!("Message::ConfigSaved");
            set_info(model, "Settings saved");
        }

        Message::ConfigSaveFailed(err) => {
            set_error(model, format!("Failed to save settings: {}", err));
        }
    }

    cmds
}

fn handle_outcome(model: &mut Model, kind: TaskKind, outcome: TaskOutcome) {
    match outcome {
        TaskOutcome::Success(output) => {
            model.status = match output {
                TaskOutput::Network(network) => {
                    let status = match kind {
                        TaskKind::ImportEdgeList => format!(
                            "Imported {} nodes and {} edges",
                            network.node_count(),
                            network.edge_count()
                        ),
                        TaskKind::RemoveMinorComponents => format!(
                            "Kept largest component ({} nodes)",
                            network.node_count()
                        ),
                        _ => "Network generated".to_string(),
                    };
                    model.set_network(network);
                    status
                }
                TaskOutput::Components(stats) => {
                    let status = format!("Found {} components", stats.count);
                    model.components = Some(stats);
                    status
                }
                TaskOutput::Transitivity(t) => {
                    model.transitivity = Some(t);
                    "Transitivity calculated".to_string()
                }
                TaskOutput::Distances(stats) => {
                    model.distances = Some(stats);
                    "Distances calculated".to_string()
                }
                TaskOutput::Simulation(results) => {
                    model.store_results(results);
                    "Simulation complete".to_string()
                }
                TaskOutput::Exported { path, edges } => {
                    format!("Saved {} edges to {}", edges, path.display())
                }
            };
            elog!("{}", model.status);
        }
        TaskOutcome::Cancelled => {
            model.status = format!("{} cancelled", capitalize(kind.label()));
        }
        TaskOutcome::Failure(err) => {
            let label = capitalize(kind.label());
            model.status = format!("{} failed", label);
            let message = format!("{} failed: {}", label, err);
            match err.category() {
                ErrorCategory::InvalidParameters => {
                    mark_field(model, &err);
                    set_error(model, message);
                }
                ErrorCategory::Io => set_error(model, message),
                ErrorCategory::Computation => {
                    elog_error!("{}", message);
                    show_error(model, message);
                }
            }
        }
    }
}

/// Build the request for `kind` from the current settings.
fn build_request(model: &Model, kind: TaskKind) -> Result<TaskRequest, Error> {
    let network = || model.network.clone().ok_or(Error::NoNetwork);
    let request = match kind {
        TaskKind::GenerateNetwork => TaskRequest::GenerateNetwork {
            size: model.config.network.size,
            distribution: model.config.network.degree_distribution(),
            seed: model.next_seed(),
        },
        TaskKind::ConnectNetwork => TaskRequest::ConnectNetwork {
            network: network()?,
            distribution: model.config.network.degree_distribution(),
            seed: model.next_seed(),
        },
        TaskKind::ImportEdgeList => TaskRequest::ImportEdgeList {
            path: PathBuf::from(model.edge_list_path.trim()),
        },
        TaskKind::ExportEdgeList => TaskRequest::ExportEdgeList {
            network: network()?,
            path: PathBuf::from(model.edge_list_path.trim()),
        },
        TaskKind::AnalyzeComponents => TaskRequest::AnalyzeComponents {
            network: network()?,
        },
        TaskKind::RemoveMinorComponents => TaskRequest::RemoveMinorComponents {
            network: network()?,
        },
        TaskKind::CalculateTransitivity => TaskRequest::CalculateTransitivity {
            network: network()?,
        },
        TaskKind::CalculateDistances => TaskRequest::CalculateDistances {
            network: network()?,
        },
        TaskKind::RunSimulation => TaskRequest::RunSimulation {
            network: network()?,
            params: model.config.simulation.clone(),
            seed: model.next_seed(),
        },
    };
    Ok(request)
}

fn start_task(model: &mut Model, kind: TaskKind, cmds: &mut Vec<Command>) {
    match build_request(model, kind) {
        Ok(request) => {
            model.field_error = None;
            cmds.push(Command::StartTask(request));
        }
        Err(err) => set_error(model, format!("Cannot start {}: {}", kind, err)),
    }
}

fn task_for_key(code: KeyCode) -> Option<TaskKind> {
    let kind = match code {
        KeyCode::Char('g') => TaskKind::GenerateNetwork,
        KeyCode::Char('n') => TaskKind::ConnectNetwork,
        KeyCode::Char('i') => TaskKind::ImportEdgeList,
        KeyCode::Char('e') => TaskKind::ExportEdgeList,
        KeyCode::Char('a') => TaskKind::AnalyzeComponents,
        KeyCode::Char('m') => TaskKind::RemoveMinorComponents,
        KeyCode::Char('t') => TaskKind::CalculateTransitivity,
        KeyCode::Char('d') => TaskKind::CalculateDistances,
        KeyCode::Char('s') => TaskKind::RunSimulation,
        _ => return None,
    };
    Some(kind)
}

fn update_normal_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if let Some(kind) = task_for_key(key.code) {
        start_task(model, kind, cmds);
        return;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let len = model.visible_fields().len();
            if len > 0 {
                model.selected = (model.selected + 1) % len;
            }
        }

        KeyCode::Char('k') | KeyCode::Up => {
            let len = model.visible_fields().len();
            if len > 0 {
                model.selected = model.selected.checked_sub(1).unwrap_or(len - 1);
            }
        }

        KeyCode::Enter => {
            if let Some(field) = model.selected_field() {
                if field.is_choice() {
                    field.cycle(&mut model.config);
                    model.clamp_selection();
                    model.refresh_predictions();
                } else {
                    model.input_buffer = field.value(
                        &model.config,
                        &model.edge_list_path,
                        model.degree_stats.as_ref(),
                    );
                    model.mode = Mode::Editing(field);
                }
            }
        }

        KeyCode::Char('x') => {
            model.clear_network();
            model.status = STATUS_NETWORK_DELETED.to_string();
        }

        KeyCode::Char('z') => {
            model.clear_data();
            model.status = STATUS_DATA_DELETED.to_string();
        }

        KeyCode::Char('r') => {
            model.config.retain_data = !model.config.retain_data;
        }

        KeyCode::Char('R') => {
            let defaults = Config::default();
            model.config.network = NetworkSettings::default();
            model.config.simulation = SimulationParams::default();
            model.config.retain_data = defaults.retain_data;
            model.field_error = None;
            model.clamp_selection();
            model.refresh_predictions();
            model.status = STATUS_DEFAULTS.to_string();
        }

        KeyCode::Char('w') => {
            cmds.push(Command::SaveConfig(model.config.clone()));
        }

        KeyCode::Char('?') => {
            model.show_keymap = !model.show_keymap;
        }

        KeyCode::Char('q') => {
            cmds.push(Command::Quit);
        }

        _ => {}
    }
}

/// Keys accepted while a task runs.
fn update_busy(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Char('c') | KeyCode::Esc => {
            cmds.push(Command::CancelTask);
        }
        KeyCode::Char('?') => {
            model.show_keymap = !model.show_keymap;
        }
        KeyCode::Char('q') => {
            cmds.push(Command::CancelTask);
            cmds.push(Command::Quit);
        }
        _ => set_info(model, BUSY_HINT),
    }
}

fn update_editing_mode(model: &mut Model, key: KeyEvent, field: Field) {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut model.input_buffer);
            let applied = field.apply(
                &mut model.config,
                &mut model.edge_list_path,
                model.degree_stats.as_ref(),
                &input,
            );
            match applied {
                Ok(()) => {
                    if model.field_error.as_ref().is_some_and(|(f, _)| *f == field) {
                        model.field_error = None;
                    }
                    model.mode = Mode::Normal;
                    model.clamp_selection();
                    model.refresh_predictions();
                }
                Err(reason) => {
                    model.input_buffer = input;
                    model.field_error = Some((field, reason));
                }
            }
        }

        KeyCode::Esc => {
            model.input_buffer.clear();
            model.mode = Mode::Normal;
        }

        KeyCode::Backspace => {
            model.input_buffer.pop();
        }

        KeyCode::Char(c) => {
            model.input_buffer.push(c);
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{DistKind, Network};
    use crate::simulation::{RunResult, SimResults, SimulationType};
    use crate::task::TaskId;

    fn test_model() -> Model {
        Model::new(Config::default())
    }

    fn model_with_network() -> Model {
        let mut model = test_model();
        model.set_network(Network::from_edges(4, &[(0, 1), (1, 2), (2, 3)]));
        model
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn press(model: &mut Model, code: KeyCode) -> Vec<Command> {
        update(model, Message::Key(key(code)))
    }

    fn started(model: &mut Model, kind: TaskKind) -> TaskId {
        let id = TaskId::new();
        update(model, Message::TaskStarted { id, kind });
        id
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Task lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_g_key_requests_generation() {
        let mut model = test_model();
        let cmds = press(&mut model, KeyCode::Char('g'));
        assert_eq!(cmds.len(), 1);
        match &cmds[0] {
            Command::StartTask(TaskRequest::GenerateNetwork { size, .. }) => {
                assert_eq!(*size, 10_000)
            }
            other => panic!("Expected GenerateNetwork, got {other:?}"),
        }
        // Nothing is disabled until the coordinator accepts the request.
        assert!(model.surface_enabled());
    }

    #[test]
    fn test_task_started_disables_surface() {
        let mut model = test_model();
        started(&mut model, TaskKind::GenerateNetwork);
        assert!(!model.surface_enabled());
        assert_eq!(model.status, "Generating network topology . . .");
        assert_eq!(model.progress, INDETERMINATE);
    }

    #[test]
    fn test_surface_disabled_ignores_task_keys() {
        let mut model = model_with_network();
        started(&mut model, TaskKind::RunSimulation);
        let cmds = press(&mut model, KeyCode::Char('g'));
        assert!(cmds.is_empty());
        assert_eq!(
            model.notification.as_ref().unwrap().level,
            NotificationLevel::Info
        );
    }

    #[test]
    fn test_cancel_keys_while_running() {
        let mut model = model_with_network();
        started(&mut model, TaskKind::RunSimulation);
        let cmds = press(&mut model, KeyCode::Char('c'));
        assert!(matches!(cmds.as_slice(), [Command::CancelTask]));
        let cmds = press(&mut model, KeyCode::Esc);
        assert!(matches!(cmds.as_slice(), [Command::CancelTask]));
    }

    #[test]
    fn test_progress_only_for_running_task() {
        let mut model = test_model();
        let id = started(&mut model, TaskKind::GenerateNetwork);
        update(&mut model, Message::TaskProgress { id, percent: 30 });
        assert_eq!(model.progress, 30);
        update(
            &mut model,
            Message::TaskProgress {
                id: TaskId::new(),
                percent: 90,
            },
        );
        assert_eq!(model.progress, 30);
    }

    #[test]
    fn test_generated_network_is_stored() {
        let mut model = test_model();
        let id = started(&mut model, TaskKind::GenerateNetwork);
        update(
            &mut model,
            Message::TaskFinished {
                id,
                kind: TaskKind::GenerateNetwork,
                outcome: TaskOutcome::Success(TaskOutput::Network(Network::from_edges(
                    3,
                    &[(0, 1)],
                ))),
            },
        );
        assert!(model.surface_enabled());
        assert_eq!(model.network.as_ref().unwrap().node_count(), 3);
        assert_eq!(model.status, "Network generated");
        assert!(model.predictions.is_some());
    }

    #[test]
    fn test_cancelled_simulation_keeps_previous_results() {
        let mut model = model_with_network();
        model.store_results(SimResults {
            sim_type: SimulationType::Percolation,
            network_size: 4,
            runs: vec![RunResult {
                epi_curve: vec![1],
                final_size: 1,
            }],
        });
        let id = started(&mut model, TaskKind::RunSimulation);
        update(
            &mut model,
            Message::TaskFinished {
                id,
                kind: TaskKind::RunSimulation,
                outcome: TaskOutcome::Cancelled,
            },
        );
        assert!(model.surface_enabled());
        assert_eq!(model.status, "Simulation cancelled");
        assert_eq!(model.results.as_ref().unwrap().runs.len(), 1);
    }

    #[test]
    fn test_failure_notifies_and_reenables() {
        let mut model = test_model();
        let id = started(&mut model, TaskKind::ImportEdgeList);
        update(
            &mut model,
            Message::TaskFinished {
                id,
                kind: TaskKind::ImportEdgeList,
                outcome: TaskOutcome::Failure(Error::Computation("bad".into())),
            },
        );
        assert!(model.surface_enabled());
        assert_eq!(model.status, "Edge list import failed");
        assert_eq!(
            model.notification.as_ref().unwrap().level,
            NotificationLevel::Error
        );
    }

    fn finish(model: &mut Model, kind: TaskKind, err: Error) {
        let id = started(model, kind);
        update(
            model,
            Message::TaskFinished {
                id,
                kind,
                outcome: TaskOutcome::Failure(err),
            },
        );
    }

    #[test]
    fn test_failed_task_with_invalid_parameter_marks_field() {
        let mut model = test_model();
        finish(
            &mut model,
            TaskKind::GenerateNetwork,
            Error::invalid(crate::network::degree::FIELD_KAPPA, "every degree has zero weight"),
        );
        assert_eq!(model.status, "Network generation failed");
        assert_eq!(
            model.field_error,
            Some((Field::DistParam2, "every degree has zero weight".to_string()))
        );
        assert_eq!(
            model.notification.as_ref().unwrap().level,
            NotificationLevel::Error
        );
    }

    #[test]
    fn test_io_and_computation_failures_leave_fields_alone() {
        let mut model = test_model();
        finish(
            &mut model,
            TaskKind::ImportEdgeList,
            Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
        );
        assert!(model.field_error.is_none());
        assert!(model
            .notification
            .as_ref()
            .unwrap()
            .message
            .contains("gone"));

        finish(
            &mut model,
            TaskKind::RunSimulation,
            Error::WorkerPanic("index out of bounds".into()),
        );
        assert!(model.field_error.is_none());
        assert_eq!(model.status, "Simulation failed");
        assert!(model
            .notification
            .as_ref()
            .unwrap()
            .message
            .contains("index out of bounds"));
    }

    #[test]
    fn test_rejection_marks_field() {
        let mut model = test_model();
        update(
            &mut model,
            Message::TaskRejected {
                kind: TaskKind::GenerateNetwork,
                error: Error::invalid(crate::network::FIELD_SIZE, "must be positive"),
            },
        );
        assert_eq!(
            model.field_error,
            Some((Field::NetworkSize, "must be positive".to_string()))
        );
        assert!(model.surface_enabled());
    }

    #[test]
    fn test_network_tasks_need_a_network() {
        let mut model = test_model();
        for code in ['n', 'e', 'a', 'm', 't', 'd', 's'] {
            let cmds = press(&mut model, KeyCode::Char(code));
            assert!(cmds.is_empty(), "key {code} should not start a task");
            assert_eq!(
                model.notification.as_ref().unwrap().level,
                NotificationLevel::Error
            );
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Settings
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_edit_field_and_commit() {
        let mut model = test_model();
        model.selected = 0; // Network size
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.mode, Mode::Editing(Field::NetworkSize));
        assert_eq!(model.input_buffer, "10000");

        for _ in 0..5 {
            press(&mut model, KeyCode::Backspace);
        }
        for c in "500".chars() {
            press(&mut model, KeyCode::Char(c));
        }
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.mode, Mode::Normal);
        assert_eq!(model.config.network.size, 500);
    }

    #[test]
    fn test_invalid_edit_stays_in_editor() {
        let mut model = test_model();
        model.mode = Mode::Editing(Field::Runs);
        model.input_buffer = "many".to_string();
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.mode, Mode::Editing(Field::Runs));
        assert_eq!(model.input_buffer, "many");
        assert!(matches!(model.field_error, Some((Field::Runs, _))));

        press(&mut model, KeyCode::Esc);
        assert_eq!(model.mode, Mode::Normal);
        assert_eq!(model.config.simulation.num_runs, 1);
    }

    /// Given a complete five-node network (4-regular, excess degree 3)
    /// When the user types an R0 into the R0 field
    /// Then the transmissibility and predictions follow it
    #[test]
    fn test_edit_r0_sets_transmissibility() {
        let mut model = test_model();
        assert!(!model.visible_fields().contains(&Field::RZero));

        let edges: Vec<(usize, usize)> = (0..5)
            .flat_map(|i| ((i + 1)..5).map(move |j| (i, j)))
            .collect();
        model.set_network(Network::from_edges(5, &edges));
        model.selected = model
            .visible_fields()
            .iter()
            .position(|f| *f == Field::RZero)
            .expect("R0 field shown with a network");

        press(&mut model, KeyCode::Enter);
        assert_eq!(model.mode, Mode::Editing(Field::RZero));
        model.input_buffer = "1.5".to_string();
        press(&mut model, KeyCode::Enter);

        assert_eq!(model.mode, Mode::Normal);
        assert!((model.config.simulation.transmissibility - 0.5).abs() < 1e-12);
        let r0 = model.predictions.as_ref().unwrap().r0;
        assert!((r0 - 1.5).abs() < 1e-12);

        model.mode = Mode::Editing(Field::RZero);
        model.input_buffer = "9".to_string();
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.mode, Mode::Editing(Field::RZero));
        assert!(matches!(model.field_error, Some((Field::RZero, _))));
        assert!((model.config.simulation.transmissibility - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_clearing_network_hides_r0_field() {
        let mut model = model_with_network();
        model.selected = model.visible_fields().len() - 1;
        press(&mut model, KeyCode::Char('x'));
        assert!(!model.visible_fields().contains(&Field::RZero));
        assert!(model.selected < model.visible_fields().len());
    }

    #[test]
    fn test_enter_cycles_choice_fields() {
        let mut model = test_model();
        model.selected = 1; // Degree distribution
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.config.network.distribution, DistKind::Exponential);
        assert_eq!(model.mode, Mode::Normal);
    }

    #[test]
    fn test_selection_wraps() {
        let mut model = test_model();
        press(&mut model, KeyCode::Up);
        assert_eq!(model.selected, model.visible_fields().len() - 1);
        press(&mut model, KeyCode::Down);
        assert_eq!(model.selected, 0);
    }

    #[test]
    fn test_clear_and_restore() {
        let mut model = model_with_network();
        press(&mut model, KeyCode::Char('x'));
        assert!(model.network.is_none());
        assert_eq!(model.status, "Network deleted");

        press(&mut model, KeyCode::Char('z'));
        assert_eq!(model.status, "All data deleted");

        model.config.network.size = 7;
        model.config.simulation.transmissibility = 0.9;
        press(&mut model, KeyCode::Char('R'));
        assert_eq!(model.config.network.size, 10_000);
        assert_eq!(model.config.simulation.transmissibility, 0.1);
    }

    #[test]
    fn test_retain_toggle_and_save() {
        let mut model = test_model();
        press(&mut model, KeyCode::Char('r'));
        assert!(model.config.retain_data);
        let cmds = press(&mut model, KeyCode::Char('w'));
        match cmds.as_slice() {
            [Command::SaveConfig(config)] => assert!(config.retain_data),
            other => panic!("Expected SaveConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_fixed_seed_advances_per_task() {
        let mut model = test_model();
        model.config.seed = Some(10);
        assert_eq!(model.next_seed(), Some(10));
        let id = started(&mut model, TaskKind::GenerateNetwork);
        assert_eq!(model.next_seed(), Some(11));
        update(
            &mut model,
            Message::TaskFinished {
                id,
                kind: TaskKind::GenerateNetwork,
                outcome: TaskOutcome::Cancelled,
            },
        );
    }

    #[test]
    fn test_quit() {
        let mut model = test_model();
        let cmds = press(&mut model, KeyCode::Char('q'));
        assert!(matches!(cmds.as_slice(), [Command::Quit]));

        started(&mut model, TaskKind::RunSimulation);
        let cmds = press(&mut model, KeyCode::Char('q'));
        assert!(matches!(
            cmds.as_slice(),
            [Command::CancelTask, Command::Quit]
        ));
    }
}
