//! Summary of a batch of simulation runs: where small outbreaks end and
//! large epidemics begin, and descriptive statistics for each group.

use serde::Serialize;

/// Number of histogram bins used to look for the outbreak/epidemic gap.
const THRESHOLD_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub n: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Sample standard deviation; zero for fewer than two values.
    pub sd: f64,
}

impl SummaryStats {
    pub fn from_sizes(sizes: &[usize]) -> Option<Self> {
        let n = sizes.len();
        let min = sizes.iter().copied().min()?;
        let max = sizes.iter().copied().max()?;
        let mean = sizes.iter().map(|&s| s as f64).sum::<f64>() / n as f64;
        let sd = if n < 2 {
            0.0
        } else {
            let ss: f64 = sizes.iter().map(|&s| (s as f64 - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };
        Some(Self {
            n,
            min,
            max,
            mean,
            sd,
        })
    }
}

/// Smallest final size counted as an epidemic, found as the lower edge of
/// the first empty histogram bin that separates two populated ones. `None`
/// when the final sizes form a single cluster.
pub fn find_epi_threshold(final_sizes: &[usize]) -> Option<usize> {
    let max = final_sizes.iter().copied().max()?;
    let width = (max / THRESHOLD_BINS + 1).max(1);
    let mut counts = vec![0usize; max / width + 1];
    for &s in final_sizes {
        counts[s / width] += 1;
    }

    let first = counts.iter().position(|&c| c > 0)?;
    let gap = counts[first..].iter().position(|&c| c == 0)? + first;
    counts[gap..]
        .iter()
        .any(|&c| c > 0)
        .then_some(gap * width)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsAnalysis {
    pub threshold: Option<usize>,
    pub outbreaks: Option<SummaryStats>,
    pub epidemics: Option<SummaryStats>,
    pub all: Option<SummaryStats>,
}

impl ResultsAnalysis {
    pub fn from_final_sizes(final_sizes: &[usize]) -> Self {
        let threshold = find_epi_threshold(final_sizes);
        let (outbreaks, epidemics) = match threshold {
            Some(t) => {
                let (small, large): (Vec<usize>, Vec<usize>) =
                    final_sizes.iter().partition(|&&s| s < t);
                (
                    SummaryStats::from_sizes(&small),
                    SummaryStats::from_sizes(&large),
                )
            }
            None => (None, None),
        };
        Self {
            threshold,
            outbreaks,
            epidemics,
            all: SummaryStats::from_sizes(final_sizes),
        }
    }
}
