//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no threads.
//! Networks produced by the worker are held behind `Arc` so that a running
//! task can read the same value the model shows.

use std::sync::Arc;

use crate::config::Config;
use crate::network::{ComponentStats, DegreeStats, DistanceStats, Network};
use crate::predict::Predictions;
use crate::render::{next_version, FieldView, NetworkView, RenderState, ResultsView};
use crate::results::ResultsAnalysis;
use crate::simulation::SimResults;
use crate::task::{TaskId, TaskKind, INDETERMINATE};

use super::field::Field;

pub const STATUS_READY: &str = "Ready";

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red with "Error:" prefix
    Error,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Application UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing a new value for a field.
    Editing(Field),
}

/// Pure application state - the single source of truth.
pub struct Model {
    // Settings
    pub config: Config,
    pub edge_list_path: String,

    // Network and everything derived from it
    pub network: Option<Arc<Network>>,
    pub degree_stats: Option<DegreeStats>,
    pub components: Option<ComponentStats>,
    pub transitivity: Option<f64>,
    pub distances: Option<DistanceStats>,
    pub predictions: Option<Predictions>,

    // Simulation output
    pub results: Option<SimResults>,
    pub analysis: Option<ResultsAnalysis>,

    // Background task
    pub running: Option<(TaskId, TaskKind)>,
    /// Tasks started so far; offsets a fixed seed so repeated runs differ.
    pub task_serial: u64,
    /// Last reported percentage of the running task.
    pub progress: i32,
    pub status: String,

    // Input state
    pub mode: Mode,
    pub selected: usize,
    pub input_buffer: String,
    pub field_error: Option<(Field, String)>,
    pub notification: Option<Notification>,
    pub show_keymap: bool,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,
}

impl Model {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            edge_list_path: String::new(),
            network: None,
            degree_stats: None,
            components: None,
            transitivity: None,
            distances: None,
            predictions: None,
            results: None,
            analysis: None,
            running: None,
            task_serial: 0,
            progress: INDETERMINATE,
            status: STATUS_READY.to_string(),
            mode: Mode::default(),
            selected: 0,
            input_buffer: String::new(),
            field_error: None,
            notification: None,
            show_keymap: false,
            dirty: true,
        }
    }

    /// Interactive controls accept new work only while no task runs.
    pub fn surface_enabled(&self) -> bool {
        self.running.is_none()
    }

    /// Seed for the next task, if the configuration fixes one.
    pub fn next_seed(&self) -> Option<u64> {
        self.config.seed.map(|seed| seed.wrapping_add(self.task_serial))
    }

    pub fn visible_fields(&self) -> Vec<Field> {
        Field::visible(&self.config, self.degree_stats.as_ref())
    }

    pub fn selected_field(&self) -> Option<Field> {
        self.visible_fields().get(self.selected).copied()
    }

    /// Keep the selection inside the visible fields after settings change
    /// which fields exist.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_fields().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Replace the current network. Structural results of the old network
    /// are discarded; simulation results are kept.
    pub fn set_network(&mut self, network: Network) {
        self.degree_stats = Some(network.degree_stats());
        self.network = Some(Arc::new(network));
        self.components = None;
        self.transitivity = None;
        self.distances = None;
        self.refresh_predictions();
    }

    pub fn clear_network(&mut self) {
        self.network = None;
        self.degree_stats = None;
        self.components = None;
        self.transitivity = None;
        self.distances = None;
        self.predictions = None;
        self.clamp_selection();
    }

    pub fn clear_data(&mut self) {
        self.results = None;
        self.analysis = None;
    }

    /// Store a finished batch, appending to the previous batch when data is
    /// retained and the batches are compatible.
    pub fn store_results(&mut self, batch: SimResults) {
        let rejected = match self.results.as_mut() {
            Some(existing) if self.config.retain_data => existing.absorb(batch).err(),
            _ => Some(batch),
        };
        if let Some(batch) = rejected {
            self.results = Some(batch);
        }
        self.analysis = self
            .results
            .as_ref()
            .map(|r| ResultsAnalysis::from_final_sizes(&r.final_sizes()));
    }

    pub fn refresh_predictions(&mut self) {
        self.predictions = self
            .degree_stats
            .as_ref()
            .map(|stats| Predictions::compute(stats, &self.config.simulation));
    }

    /// Create an immutable snapshot for the render thread.
    ///
    /// Each snapshot gets a monotonically increasing version number so the
    /// render thread can skip redundant renders.
    pub fn snapshot(&self) -> RenderState {
        let fields = self
            .visible_fields()
            .into_iter()
            .map(|field| FieldView {
                label: field
                    .label(&self.config, self.degree_stats.as_ref())
                    .unwrap_or_default()
                    .to_string(),
                value: field.value(
                    &self.config,
                    &self.edge_list_path,
                    self.degree_stats.as_ref(),
                ),
                error: self
                    .field_error
                    .as_ref()
                    .filter(|(f, _)| *f == field)
                    .map(|(_, e)| e.clone()),
                editing: self.mode == Mode::Editing(field),
            })
            .collect();

        let network = self.degree_stats.as_ref().map(|stats| NetworkView {
            nodes: stats.nodes,
            edges: stats.edges,
            mean_degree: stats.mean_degree,
            components: self.components.clone(),
            transitivity: self.transitivity,
            distances: self.distances.clone(),
        });

        let results = self.results.as_ref().map(|r| ResultsView {
            runs: r.runs.len(),
            sim_type: r.sim_type,
            mean_curve: r.mean_epi_curve(),
            analysis: self.analysis.clone(),
        });

        RenderState {
            version: next_version(),
            fields,
            selected: self.selected,
            mode: self.mode,
            input_buffer: self.input_buffer.clone(),
            network,
            predictions: self.predictions.clone(),
            results,
            running: self.running.map(|(_, kind)| kind),
            progress: self.progress,
            status: self.status.clone(),
            retain_data: self.config.retain_data,
            notification: self.notification.clone(),
            show_keymap: self.show_keymap,
        }
    }
}
