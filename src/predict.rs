//! Analytic predictions for an epidemic on a network with a given degree
//! distribution: basic reproductive number, epidemic threshold and expected
//! final sizes under mass-action mixing and on the network itself.

use serde::Serialize;

use crate::network::DegreeStats;
use crate::simulation::{SimulationParams, SimulationType};

const MAX_ITERATIONS: usize = 10_000;
const TOLERANCE: f64 = 1e-10;

/// Daily transmissibility that compounds to `t` over `period` days.
pub fn t_to_tcb(t: f64, period: u32) -> f64 {
    let period = period.max(1) as f64;
    (1.0 - (1.0 - t.clamp(0.0, 1.0)).powf(1.0 / period)).clamp(0.0, 1.0)
}

/// Inverse of [`t_to_tcb`].
pub fn tcb_to_t(tcb: f64, period: u32) -> f64 {
    let period = period.max(1) as i32;
    (1.0 - (1.0 - tcb.clamp(0.0, 1.0)).powi(period)).clamp(0.0, 1.0)
}

/// Mean excess degree `(<k^2> - <k>) / <k>`; zero for an edgeless network.
fn excess_degree(stats: &DegreeStats) -> f64 {
    if stats.mean_degree <= 0.0 {
        return 0.0;
    }
    (stats.mean_sq_degree - stats.mean_degree) / stats.mean_degree
}

/// Transmissibility above which a large outbreak is possible. `None` when no
/// transmissibility is high enough.
pub fn t_crit(stats: &DegreeStats) -> Option<f64> {
    let excess = excess_degree(stats);
    (excess > 0.0).then(|| 1.0 / excess)
}

pub fn r0_from_t(stats: &DegreeStats, t: f64) -> f64 {
    t * excess_degree(stats)
}

/// Transmissibility giving `r0` on this network. Not clamped: a value above
/// 1 means the network cannot reach `r0`. `None` without excess degree.
pub fn t_from_r0(stats: &DegreeStats, r0: f64) -> Option<f64> {
    let excess = excess_degree(stats);
    (excess > 0.0).then(|| r0 / excess)
}

/// Expected attack rate under mass-action mixing, the fixed point of
/// `r = 1 - (1 - p0) e^(-R0 r)` reached from `guess`.
pub fn mass_action_expected_size(r0: f64, p0_frac: f64, guess: f64) -> f64 {
    let mut r = guess.clamp(0.0, 1.0);
    for _ in 0..MAX_ITERATIONS {
        let next = 1.0 - (1.0 - p0_frac) * (-r0 * r).exp();
        if (next - r).abs() < TOLERANCE {
            return next;
        }
        r = next;
    }
    r
}

/// Expected attack rate on a configuration-model network with degree
/// distribution `p_k`, from the generating functions `G0` and `G1`.
pub fn network_expected_size(p: &[f64], t: f64, p0_frac: f64) -> f64 {
    let mean: f64 = p.iter().enumerate().map(|(k, &pk)| k as f64 * pk).sum();
    if mean <= 0.0 {
        return p0_frac;
    }

    let g0 = |u: f64| -> f64 { p.iter().enumerate().map(|(k, &pk)| pk * u.powi(k as i32)).sum() };
    let g1 = |u: f64| -> f64 {
        p.iter()
            .enumerate()
            .skip(1)
            .map(|(k, &pk)| k as f64 * pk * u.powi(k as i32 - 1))
            .sum::<f64>()
            / mean
    };

    // Probability that following an edge does not lead into the epidemic.
    let mut u = 0.0;
    for _ in 0..MAX_ITERATIONS {
        let next = 1.0 - t + t * g1(u);
        if (next - u).abs() < TOLERANCE {
            u = next;
            break;
        }
        u = next;
    }
    (1.0 - (1.0 - p0_frac) * g0(u)).clamp(0.0, 1.0)
}

/// Everything shown in the predictions panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predictions {
    pub r0: f64,
    pub t_crit: Option<f64>,
    /// Daily transmissibility for the chain-binomial model.
    pub t_cb: Option<f64>,
    pub mass_action_size: f64,
    pub network_size: f64,
}

impl Predictions {
    pub fn compute(stats: &DegreeStats, params: &SimulationParams) -> Self {
        let t = params.transmissibility;
        let p0_frac = if stats.nodes == 0 {
            0.0
        } else {
            params.p_zero as f64 / stats.nodes as f64
        };
        let r0 = r0_from_t(stats, t);
        Self {
            r0,
            t_crit: t_crit(stats),
            t_cb: (params.sim_type == SimulationType::ChainBinomial)
                .then(|| t_to_tcb(t, params.infectious_period)),
            mass_action_size: mass_action_expected_size(r0, p0_frac, 0.5),
            network_size: network_expected_size(&stats.distribution(), t, p0_frac),
        }
    }
}
