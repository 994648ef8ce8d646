//! Degree distributions and degree-sequence sampling.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::{Exp, Poisson};
use serde::{Deserialize, Serialize};

use crate::task::{TaskContext, TaskResult};
use crate::{elog_warn, Error, Result};

pub const FIELD_LAMBDA: &str = "lambda";
pub const FIELD_BETA: &str = "beta";
pub const FIELD_ALPHA: &str = "alpha";
pub const FIELD_KAPPA: &str = "kappa";
pub const FIELD_K: &str = "degree";

/// Relative frequency of each degree (index = degree) in an urban contact
/// network. Degrees 0 and 1 are absent.
const URBAN_DEGREE_WEIGHTS: &[f64] = &[
    0.0, 0.0, 0.0427, 0.0651, 0.0795, 0.0862, 0.0868, 0.0829, 0.0764, 0.0683, 0.0598, 0.0515,
    0.0439, 0.0370, 0.0310, 0.0258, 0.0214, 0.0177, 0.0146, 0.0120, 0.0099, 0.0081, 0.0067,
    0.0055, 0.0045, 0.0037, 0.0031, 0.0026, 0.0021, 0.0018, 0.0015, 0.0013, 0.0011, 0.0009,
    0.0008, 0.0007, 0.0006, 0.0005, 0.0004, 0.0004, 0.0003,
];

/// Relative weight below which the power-law table is cut off.
const POWERLAW_TAIL_CUTOFF: f64 = 1e-12;

/// Upper bound on `size * mean degree`. The configuration model keeps every
/// stub in memory while matching.
pub const MAX_STUBS: f64 = 2e7;

/// Attempts at flipping the parity of one node's degree before giving up.
const PARITY_ATTEMPTS: usize = 10_000;

/// Attempts at drawing a degree that fits into the network before clamping.
const TRUNCATION_ATTEMPTS: usize = 100;

/// Distribution family selector, the part of [`DegreeDistribution`] the UI
/// cycles through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DistKind {
    #[default]
    Poisson,
    Exponential,
    PowerLaw,
    Urban,
    Constant,
}

impl DistKind {
    pub const ALL: [DistKind; 5] = [
        DistKind::Poisson,
        DistKind::Exponential,
        DistKind::PowerLaw,
        DistKind::Urban,
        DistKind::Constant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DistKind::Poisson => "Poisson",
            DistKind::Exponential => "Exponential",
            DistKind::PowerLaw => "Power law",
            DistKind::Urban => "Urban",
            DistKind::Constant => "Constant",
        }
    }

    pub fn next(&self) -> DistKind {
        let idx = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Names of the first and second parameter, if the family has them.
    pub fn param_labels(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            DistKind::Poisson => (Some("Lambda"), None),
            DistKind::Exponential => (Some("Beta"), None),
            DistKind::PowerLaw => (Some("Alpha"), Some("Kappa")),
            DistKind::Urban => (None, None),
            DistKind::Constant => (Some("Fixed degree"), None),
        }
    }
}

/// A degree distribution with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DegreeDistribution {
    /// `p_k = e^{-lambda} lambda^k / k!`
    Poisson { lambda: f64 },
    /// `p_k ∝ e^{-beta k}` for `k >= 0`
    Exponential { beta: f64 },
    /// `p_k ∝ k^{-alpha} e^{-k / kappa}` for `k >= 1`
    PowerLaw { alpha: f64, kappa: f64 },
    /// Tabulated urban contact degrees.
    Urban,
    /// Every node has degree `k`.
    Constant { k: usize },
}

impl DegreeDistribution {
    pub fn kind(&self) -> DistKind {
        match self {
            DegreeDistribution::Poisson { .. } => DistKind::Poisson,
            DegreeDistribution::Exponential { .. } => DistKind::Exponential,
            DegreeDistribution::PowerLaw { .. } => DistKind::PowerLaw,
            DegreeDistribution::Urban => DistKind::Urban,
            DegreeDistribution::Constant { .. } => DistKind::Constant,
        }
    }

    /// Check the parameters against a network of `size` nodes. Everything
    /// that would make sampling fail or blow up is caught here, so a request
    /// that passes never fails for its distribution once work has started.
    pub fn validate(&self, size: usize) -> Result<()> {
        match *self {
            DegreeDistribution::Poisson { lambda } => {
                positive(FIELD_LAMBDA, lambda)?;
                check_density(FIELD_LAMBDA, lambda, size)
            }
            DegreeDistribution::Exponential { beta } => {
                positive(FIELD_BETA, beta)?;
                check_density(FIELD_BETA, 1.0 / beta.exp_m1(), size)
            }
            DegreeDistribution::PowerLaw { alpha, kappa } => {
                if !alpha.is_finite() {
                    return Err(Error::invalid(FIELD_ALPHA, "must be a finite number"));
                }
                positive(FIELD_KAPPA, kappa)?;
                if size < 2 {
                    return Err(Error::invalid(
                        crate::network::FIELD_SIZE,
                        "power-law networks need at least 2 nodes",
                    ));
                }
                let weights = powerlaw_weights(alpha, kappa, size - 1)?;
                check_density(FIELD_ALPHA, table_mean(&weights), size)
            }
            DegreeDistribution::Urban => {
                if size < URBAN_DEGREE_WEIGHTS.len() {
                    return Err(Error::invalid(
                        crate::network::FIELD_SIZE,
                        format!(
                            "urban networks need at least {} nodes",
                            URBAN_DEGREE_WEIGHTS.len()
                        ),
                    ));
                }
                Ok(())
            }
            DegreeDistribution::Constant { k } => {
                if k >= size {
                    return Err(Error::invalid(
                        FIELD_K,
                        format!("must be smaller than the network size ({size})"),
                    ));
                }
                if k % 2 == 1 && size % 2 == 1 {
                    return Err(Error::invalid(
                        FIELD_K,
                        "an odd degree needs an even number of nodes",
                    ));
                }
                check_density(FIELD_K, k as f64, size)
            }
        }
    }

    /// Build a sampler for degrees in `0..=max_degree`.
    pub fn sampler(&self, max_degree: usize) -> Result<DegreeSampler> {
        let sampler = match *self {
            DegreeDistribution::Poisson { lambda } => DegreeSampler::Poisson(
                Poisson::new(lambda).map_err(|e| Error::invalid(FIELD_LAMBDA, e.to_string()))?,
            ),
            DegreeDistribution::Exponential { beta } => DegreeSampler::Exponential(
                Exp::new(beta).map_err(|e| Error::invalid(FIELD_BETA, e.to_string()))?,
            ),
            DegreeDistribution::PowerLaw { alpha, kappa } => {
                table(FIELD_ALPHA, &powerlaw_weights(alpha, kappa, max_degree)?)?
            }
            DegreeDistribution::Urban => {
                let len = URBAN_DEGREE_WEIGHTS.len().min(max_degree + 1);
                table(crate::network::FIELD_SIZE, &URBAN_DEGREE_WEIGHTS[..len])?
            }
            DegreeDistribution::Constant { k } => DegreeSampler::Constant(k),
        };
        Ok(sampler)
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(field, "must be a positive number"))
    }
}

/// Mean degree and network size must leave room for the stubs.
fn check_density(field: &'static str, mean_degree: f64, size: usize) -> Result<()> {
    let max_degree = size.saturating_sub(1) as f64;
    if mean_degree > max_degree {
        return Err(Error::invalid(
            field,
            format!("mean degree {mean_degree:.1} exceeds the largest possible degree ({max_degree})"),
        ));
    }
    if mean_degree * size as f64 > MAX_STUBS {
        return Err(Error::invalid(
            field,
            format!("{size} nodes with mean degree {mean_degree:.1} is too dense to wire"),
        ));
    }
    Ok(())
}

/// `k^{-alpha} e^{-k/kappa}` for `k` in `1..=max_degree`, with a zero weight
/// for degree 0, cut off once the tail is negligible.
fn powerlaw_weights(alpha: f64, kappa: f64, max_degree: usize) -> Result<Vec<f64>> {
    let mut weights = vec![0.0];
    for k in 1..=max_degree {
        let w = (k as f64).powf(-alpha) * (-(k as f64) / kappa).exp();
        if !w.is_finite() {
            return Err(Error::invalid(
                FIELD_ALPHA,
                format!("degree weight overflows at degree {k}"),
            ));
        }
        if k > 1 && w < POWERLAW_TAIL_CUTOFF * weights[1] {
            break;
        }
        weights.push(w);
    }
    if !weights.iter().any(|&w| w > 0.0) {
        return Err(Error::invalid(
            FIELD_KAPPA,
            "too small, every degree has zero weight",
        ));
    }
    if !weights.iter().sum::<f64>().is_finite() {
        return Err(Error::invalid(FIELD_ALPHA, "degree weights overflow"));
    }
    Ok(weights)
}

fn table_mean(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    weights
        .iter()
        .enumerate()
        .map(|(k, &w)| k as f64 * w)
        .sum::<f64>()
        / total
}

fn table(field: &'static str, weights: &[f64]) -> Result<DegreeSampler> {
    WeightedIndex::new(weights)
        .map(DegreeSampler::Table)
        .map_err(|e| Error::invalid(field, e.to_string()))
}

/// Draws single degrees from a [`DegreeDistribution`].
#[derive(Debug, Clone)]
pub enum DegreeSampler {
    Poisson(Poisson<f64>),
    Exponential(Exp<f64>),
    Table(WeightedIndex<f64>),
    Constant(usize),
}

impl DegreeSampler {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            DegreeSampler::Poisson(d) => d.sample(rng) as usize,
            DegreeSampler::Exponential(d) => d.sample(rng).floor() as usize,
            DegreeSampler::Table(d) => d.sample(rng),
            DegreeSampler::Constant(k) => *k,
        }
    }

    /// Sample, redrawing values that cannot fit into the network.
    pub fn sample_bounded<R: Rng + ?Sized>(&self, rng: &mut R, max_degree: usize) -> usize {
        for _ in 0..TRUNCATION_ATTEMPTS {
            let k = self.sample(rng);
            if k <= max_degree {
                return k;
            }
        }
        max_degree
    }
}

/// Draw one degree per node and fix the parity of the sum so that every stub
/// can be paired.
pub fn sample_degree_sequence<R: Rng>(
    distribution: &DegreeDistribution,
    size: usize,
    rng: &mut R,
    ctx: &mut TaskContext,
) -> TaskResult<Vec<usize>> {
    let max_degree = size.saturating_sub(1);
    let sampler = distribution.sampler(max_degree)?;

    let mut degrees = Vec::with_capacity(size);
    for _ in 0..size {
        ctx.checkpoint()?;
        degrees.push(sampler.sample_bounded(rng, max_degree));
        ctx.advance(1);
    }

    let saturated = degrees.iter().filter(|&&k| k == max_degree).count();
    let constant = matches!(distribution, DegreeDistribution::Constant { .. });
    if !constant && max_degree > 0 && saturated > size / 10 {
        elog_warn!(
            "{} of {} sampled degrees hit the maximum degree {}",
            saturated,
            size,
            max_degree
        );
    }

    let mut total: usize = degrees.iter().sum();
    let mut attempts = 0;
    while total % 2 == 1 {
        if attempts == PARITY_ATTEMPTS {
            return Err(Error::Computation(
                "could not draw a degree sequence with an even sum".to_string(),
            )
            .into());
        }
        attempts += 1;
        let node = rng.gen_range(0..size);
        let k = sampler.sample_bounded(rng, max_degree);
        total = total - degrees[node] + k;
        degrees[node] = k;
    }
    Ok(degrees)
}
