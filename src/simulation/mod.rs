//! Epidemic simulation on a contact network.
//!
//! Two models are supported:
//! - **Percolation**: each infected node gets one chance to infect each
//!   susceptible neighbor with probability `T`, then recovers. Generations
//!   are the time steps.
//! - **Chain-binomial**: infected nodes stay infectious for a fixed number of
//!   days and infect each susceptible neighbor with a per-day probability
//!   chosen so that the total transmissibility over the infectious period is
//!   `T`.

pub mod chain_binomial;
pub mod percolation;

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::network::Network;
use crate::task::{TaskContext, TaskResult};
use crate::{Error, Result};

pub const FIELD_P_ZERO: &str = "patients zero";
pub const FIELD_TRANSMISSIBILITY: &str = "transmissibility";
pub const FIELD_INFECTIOUS_PERIOD: &str = "infectious period";
pub const FIELD_RUNS: &str = "number of runs";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SimulationType {
    #[default]
    Percolation,
    ChainBinomial,
}

impl SimulationType {
    pub fn label(&self) -> &'static str {
        match self {
            SimulationType::Percolation => "Percolation",
            SimulationType::ChainBinomial => "Chain binomial",
        }
    }

    pub fn next(&self) -> SimulationType {
        match self {
            SimulationType::Percolation => SimulationType::ChainBinomial,
            SimulationType::ChainBinomial => SimulationType::Percolation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub sim_type: SimulationType,
    /// Number of initially infected nodes.
    pub p_zero: usize,
    /// Probability that an infection passes along an edge over the whole
    /// infectious period.
    pub transmissibility: f64,
    /// Days a node stays infectious (chain-binomial only).
    pub infectious_period: u32,
    pub num_runs: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            sim_type: SimulationType::Percolation,
            p_zero: 1,
            transmissibility: 0.1,
            infectious_period: 5,
            num_runs: 1,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self, network_size: usize) -> Result<()> {
        if self.p_zero == 0 || self.p_zero > network_size {
            return Err(Error::invalid(
                FIELD_P_ZERO,
                format!("must be between 1 and the network size ({network_size})"),
            ));
        }
        if !(0.0..=1.0).contains(&self.transmissibility) {
            return Err(Error::invalid(
                FIELD_TRANSMISSIBILITY,
                "must be between 0 and 1",
            ));
        }
        if self.sim_type == SimulationType::ChainBinomial && self.infectious_period == 0 {
            return Err(Error::invalid(
                FIELD_INFECTIOUS_PERIOD,
                "must be at least one day",
            ));
        }
        if self.num_runs == 0 {
            return Err(Error::invalid(FIELD_RUNS, "must be at least one"));
        }
        Ok(())
    }
}

/// One simulated epidemic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// New infections per time step, starting with the patients zero.
    pub epi_curve: Vec<usize>,
    /// Nodes ever infected.
    pub final_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimResults {
    pub sim_type: SimulationType,
    pub network_size: usize,
    pub runs: Vec<RunResult>,
}

impl SimResults {
    pub fn final_sizes(&self) -> Vec<usize> {
        self.runs.iter().map(|r| r.final_size).collect()
    }

    /// Append the runs of `other` if it was produced on a network of the same
    /// size with the same model; otherwise hand `other` back untouched.
    pub fn absorb(&mut self, other: SimResults) -> std::result::Result<(), SimResults> {
        if other.network_size != self.network_size || other.sim_type != self.sim_type {
            return Err(other);
        }
        self.runs.extend(other.runs);
        Ok(())
    }

    /// Mean number of new infections per step across runs; runs that ended
    /// early count as zero.
    pub fn mean_epi_curve(&self) -> Vec<f64> {
        let len = self.runs.iter().map(|r| r.epi_curve.len()).max().unwrap_or(0);
        if self.runs.is_empty() {
            return Vec::new();
        }
        let mut curve = vec![0.0; len];
        for run in &self.runs {
            for (slot, &count) in curve.iter_mut().zip(&run.epi_curve) {
                *slot += count as f64;
            }
        }
        let n = self.runs.len() as f64;
        curve.iter_mut().for_each(|c| *c /= n);
        curve
    }
}

/// Infection state of a single node during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Susceptible,
    Infectious,
    Recovered,
}

pub(crate) fn patients_zero<R: Rng>(rng: &mut R, size: usize, count: usize) -> Vec<usize> {
    index::sample(rng, size, count).into_vec()
}

/// Run `params.num_runs` independent epidemics. Progress counts runs;
/// cancellation is checked every time step, and a cancelled batch returns no
/// runs at all.
pub fn run<R: Rng>(
    network: &Network,
    params: &SimulationParams,
    rng: &mut R,
    ctx: &mut TaskContext,
) -> TaskResult<SimResults> {
    params.validate(network.node_count())?;
    ctx.set_predicted(params.num_runs as f64);

    let adjacency = network.adjacency();
    let mut runs = Vec::with_capacity(params.num_runs);
    for _ in 0..params.num_runs {
        ctx.checkpoint()?;
        let run = match params.sim_type {
            SimulationType::Percolation => {
                percolation::run_once(&adjacency, params, rng, ctx)?
            }
            SimulationType::ChainBinomial => {
                chain_binomial::run_once(&adjacency, params, rng, ctx)?
            }
        };
        runs.push(run);
        ctx.advance(1);
    }

    Ok(SimResults {
        sim_type: params.sim_type,
        network_size: network.node_count(),
        runs,
    })
}
