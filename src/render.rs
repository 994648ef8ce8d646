use crate::network::{ComponentStats, DistanceStats};
use crate::predict::Predictions;
use crate::results::ResultsAnalysis;
use crate::simulation::SimulationType;
use crate::task::{TaskKind, INDETERMINATE};
use crate::tea::{Mode, Notification};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub label: String,
    pub value: String,
    pub error: Option<String>,
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkView {
    pub nodes: usize,
    pub edges: usize,
    pub mean_degree: f64,
    pub components: Option<ComponentStats>,
    pub transitivity: Option<f64>,
    pub distances: Option<DistanceStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub runs: usize,
    pub sim_type: SimulationType,
    /// Mean new infections per time step.
    pub mean_curve: Vec<f64>,
    pub analysis: Option<ResultsAnalysis>,
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub fields: Vec<FieldView>,
    pub selected: usize,
    pub mode: Mode,
    pub input_buffer: String,
    pub network: Option<NetworkView>,
    pub predictions: Option<Predictions>,
    pub results: Option<ResultsView>,
    /// Kind of the running task; `None` while the surface is enabled.
    pub running: Option<TaskKind>,
    pub progress: i32,
    pub status: String,
    pub retain_data: bool,
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
}

impl RenderState {
    /// Gauge ratio in `[0, 1]`, or `None` while progress is indeterminate.
    pub fn progress_ratio(&self) -> Option<f64> {
        (self.progress != INDETERMINATE).then(|| f64::from(self.progress.clamp(0, 100)) / 100.0)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            fields: Vec::new(),
            selected: 0,
            mode: Mode::Normal,
            input_buffer: String::new(),
            network: None,
            predictions: None,
            results: None,
            running: None,
            progress: INDETERMINATE,
            status: String::new(),
            retain_data: false,
            notification: None,
            show_keymap: false,
        }
    }
}
