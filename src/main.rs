use std::io::{self, stdout, Stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use indicatif::{ProgressBar, ProgressStyle};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde_json::json;

use epinet::app::LogicThread;
use epinet::config::{Config, NetworkSettings};
use epinet::coordinator::TaskCoordinator;
use epinet::network::{DistKind, Network};
use epinet::predict::Predictions;
use epinet::render::RenderState;
use epinet::results::ResultsAnalysis;
use epinet::simulation::{SimResults, SimulationParams, SimulationType};
use epinet::task::{TaskKind, TaskOutcome, TaskOutput, TaskRequest};
use epinet::{elog, elog_debug, ui, Error, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Epinet - epidemics on random contact networks
#[derive(Parser, Debug)]
#[command(name = "epinet")]
#[command(version, about, long_about = None)]
#[command(after_help = "PROGRESS:\n    Subcommands draw a progress bar when stderr is a terminal. Otherwise they\n    write one JSON line per change to stderr, e.g. {\"task\":\"run_simulation\",\"progress\":40}.\n    A progress of -1 means the total is not known yet.\n\nENVIRONMENT:\n    EPINET_DEBUG=1  Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.epinet/epinet.log, stderr for subcommands)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Fixed random seed for reproducible runs
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Headless commands; each prints its results as JSON.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Generate a random network from a degree distribution
    Generate {
        #[command(flatten)]
        network: NetworkArgs,

        /// Save the generated network as an edge list
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Load an edge list and report its structure
    Analyze {
        /// Edge list file (one "a b" pair per line)
        edges: PathBuf,

        /// Also compute the all-pairs distance summary
        #[arg(long)]
        distances: bool,
    },

    /// Simulate epidemics on a generated or imported network
    Simulate {
        /// Use this edge list instead of generating a network
        #[arg(long)]
        edges: Option<PathBuf>,

        #[command(flatten)]
        network: NetworkArgs,

        #[command(flatten)]
        simulation: SimulationArgs,
    },
}

/// Overrides for the saved network settings.
#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct NetworkArgs {
    /// Number of nodes
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Degree distribution
    #[arg(long, value_enum)]
    pub distribution: Option<DistKind>,

    /// Poisson mean degree
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Exponential decay rate
    #[arg(long)]
    pub beta: Option<f64>,

    /// Power-law exponent
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Power-law cutoff
    #[arg(long)]
    pub kappa: Option<f64>,

    /// Degree of every node for the constant distribution
    #[arg(long)]
    pub degree: Option<usize>,
}

impl NetworkArgs {
    fn apply(&self, settings: &mut NetworkSettings) {
        if let Some(size) = self.size {
            settings.size = size;
        }
        if let Some(distribution) = self.distribution {
            settings.distribution = distribution;
        }
        if let Some(lambda) = self.lambda {
            settings.poisson_lambda = lambda;
        }
        if let Some(beta) = self.beta {
            settings.exponential_beta = beta;
        }
        if let Some(alpha) = self.alpha {
            settings.powerlaw_alpha = alpha;
        }
        if let Some(kappa) = self.kappa {
            settings.powerlaw_kappa = kappa;
        }
        if let Some(k) = self.degree {
            settings.constant_k = k;
        }
    }
}

/// Overrides for the saved simulation settings.
#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct SimulationArgs {
    /// Simulation model
    #[arg(long = "model", value_enum)]
    pub sim_type: Option<SimulationType>,

    /// Initially infected nodes per run
    #[arg(long)]
    pub p_zero: Option<usize>,

    /// Probability of transmission along an edge over the infectious period
    #[arg(short = 'T', long)]
    pub transmissibility: Option<f64>,

    /// Days a node stays infectious (chain binomial only)
    #[arg(long)]
    pub infectious_period: Option<u32>,

    /// Number of runs
    #[arg(short = 'r', long)]
    pub runs: Option<usize>,
}

impl SimulationArgs {
    fn apply(&self, params: &mut SimulationParams) {
        if let Some(sim_type) = self.sim_type {
            params.sim_type = sim_type;
        }
        if let Some(p_zero) = self.p_zero {
            params.p_zero = p_zero;
        }
        if let Some(t) = self.transmissibility {
            params.transmissibility = t;
        }
        if let Some(period) = self.infectious_period {
            params.infectious_period = period;
        }
        if let Some(runs) = self.runs {
            params.num_runs = runs;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        epinet::log::init_stderr(cli.debug);
        let mut config = Config::load()?;
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        return match command {
            Command::Generate { network, export } => run_generate(config, &network, export),
            Command::Analyze { edges, distances } => run_analyze(edges, distances),
            Command::Simulate {
                edges,
                network,
                simulation,
            } => run_simulate(config, edges, &network, &simulation),
        };
    }

    epinet::log::init_with_debug(cli.debug);
    if cli.debug {
        elog!("Epinet starting (debug mode enabled)");
    } else {
        elog!("Epinet starting");
    }

    let mut config = Config::load()?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle = thread::spawn(move || LogicThread::run(config, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle
        .join()
        .unwrap_or_else(|_| Err(Error::WorkerPanic("logic thread".to_string())));
    restore_terminal(&mut terminal)?;
    result.and(logic_result)
}

// -----------------------------------------------------------------------------
// Headless commands
// -----------------------------------------------------------------------------

/// Bar for one headless task. Hidden when stderr is not a terminal.
fn progress_bar(kind: TaskKind) -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{elapsed_precise}] {wide_bar} {pos:>3}%")
    {
        bar.set_style(style);
    }
    bar.set_message(kind.busy_message());
    bar
}

/// Machine-readable progress line written when no bar can be drawn.
fn progress_line(kind: TaskKind, percent: i32) -> String {
    json!({ "task": kind, "progress": percent }).to_string()
}

/// Run one task to completion, reporting progress changes on stderr.
fn run_task(coordinator: &TaskCoordinator, request: TaskRequest) -> Result<TaskOutput> {
    let kind = request.kind();
    let id = coordinator.start(request)?;
    let bar = progress_bar(kind);
    let mut last = None;
    let outcome = coordinator.wait(id, |percent| {
        if last == Some(percent) {
            return;
        }
        last = Some(percent);
        if bar.is_hidden() {
            eprintln!("{}", progress_line(kind, percent));
        } else if percent < 0 {
            bar.tick();
        } else {
            bar.set_position(percent as u64);
        }
    });
    bar.finish_and_clear();
    match outcome {
        TaskOutcome::Success(output) => Ok(output),
        TaskOutcome::Failure(err) => Err(err),
        TaskOutcome::Cancelled => Err(Error::Computation(format!("{kind} cancelled"))),
    }
}

fn unexpected(output: TaskOutput) -> Error {
    Error::Computation(format!("unexpected task output: {output:?}"))
}

fn expect_network(output: TaskOutput) -> Result<Network> {
    match output {
        TaskOutput::Network(network) => Ok(network),
        other => Err(unexpected(other)),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn generate_network(
    coordinator: &TaskCoordinator,
    settings: &NetworkSettings,
    seed: Option<u64>,
) -> Result<Network> {
    elog_debug!(
        "Generating {} nodes ({})",
        settings.size,
        settings.distribution.label()
    );
    expect_network(run_task(
        coordinator,
        TaskRequest::GenerateNetwork {
            size: settings.size,
            distribution: settings.degree_distribution(),
            seed,
        },
    )?)
}

fn import_network(coordinator: &TaskCoordinator, path: PathBuf) -> Result<Network> {
    expect_network(run_task(coordinator, TaskRequest::ImportEdgeList { path })?)
}

fn run_generate(mut config: Config, args: &NetworkArgs, export: Option<PathBuf>) -> Result<()> {
    args.apply(&mut config.network);
    let coordinator = TaskCoordinator::new();
    let network = Arc::new(generate_network(&coordinator, &config.network, config.seed)?);

    let exported = match export {
        Some(path) => match run_task(
            &coordinator,
            TaskRequest::ExportEdgeList {
                network: network.clone(),
                path,
            },
        )? {
            TaskOutput::Exported { path, edges } => Some(json!({ "path": path, "edges": edges })),
            other => return Err(unexpected(other)),
        },
        None => None,
    };

    let stats = network.degree_stats();
    print_json(&json!({
        "network": stats,
        "predictions": Predictions::compute(&stats, &config.simulation),
        "exported": exported,
    }))
}

fn run_analyze(edges: PathBuf, with_distances: bool) -> Result<()> {
    let coordinator = TaskCoordinator::new();
    let network = Arc::new(import_network(&coordinator, edges)?);

    let components = match run_task(
        &coordinator,
        TaskRequest::AnalyzeComponents {
            network: network.clone(),
        },
    )? {
        TaskOutput::Components(stats) => stats,
        other => return Err(unexpected(other)),
    };
    let transitivity = match run_task(
        &coordinator,
        TaskRequest::CalculateTransitivity {
            network: network.clone(),
        },
    )? {
        TaskOutput::Transitivity(t) => t,
        other => return Err(unexpected(other)),
    };
    let distances = if with_distances {
        match run_task(
            &coordinator,
            TaskRequest::CalculateDistances {
                network: network.clone(),
            },
        )? {
            TaskOutput::Distances(stats) => Some(stats),
            other => return Err(unexpected(other)),
        }
    } else {
        None
    };

    print_json(&json!({
        "network": network.degree_stats(),
        "components": components,
        "transitivity": transitivity,
        "distances": distances,
    }))
}

fn run_simulate(
    mut config: Config,
    edges: Option<PathBuf>,
    network_args: &NetworkArgs,
    sim_args: &SimulationArgs,
) -> Result<()> {
    network_args.apply(&mut config.network);
    sim_args.apply(&mut config.simulation);
    let coordinator = TaskCoordinator::new();

    let network = Arc::new(match edges {
        Some(path) => import_network(&coordinator, path)?,
        None => generate_network(&coordinator, &config.network, config.seed)?,
    });

    let results: SimResults = match run_task(
        &coordinator,
        TaskRequest::RunSimulation {
            network: network.clone(),
            params: config.simulation.clone(),
            seed: config.seed.map(|s| s.wrapping_add(1)),
        },
    )? {
        TaskOutput::Simulation(results) => results,
        other => return Err(unexpected(other)),
    };

    let stats = network.degree_stats();
    let final_sizes = results.final_sizes();
    print_json(&json!({
        "network": stats,
        "parameters": config.simulation,
        "predictions": Predictions::compute(&stats, &config.simulation),
        "analysis": ResultsAnalysis::from_final_sizes(&final_sizes),
        "final_sizes": final_sizes,
        "mean_epi_curve": results.mean_epi_curve(),
    }))
}

// -----------------------------------------------------------------------------
// Terminal UI
// -----------------------------------------------------------------------------

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
