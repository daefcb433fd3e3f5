//! Mann-Kendall monotonic trend detection.
//!
//! Counts concordant and discordant pairs over every `i < j`; ties count as neither.
//! Small noisy samples are the expected input, so no distribution is assumed.

use std::cmp::Ordering;
use std::fmt;

use num::Num;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// |tau| must exceed this to count as a trend
pub const DEFAULT_TREND_THRESHOLD: f64 = 0.3;

/// Fewer samples than this are always `Stable` with tau 0
pub const MIN_SAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// (concordant - discordant) / total pairs, in [-1, 1]
    pub tau: f64,
    pub trend: Trend,
}

impl TrendResult {
    const STABLE: TrendResult = TrendResult { tau: 0.0, trend: Trend::Stable };
}

/// Full Mann-Kendall statistic with its normal approximation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannKendall {
    /// concordant - discordant
    pub s: i64,
    pub tau: f64,
    /// Var(S) with tie correction
    pub variance: f64,
    /// continuity-corrected standard score
    pub z: f64,
    /// two-sided p-value
    pub p_value: f64,
}

#[inline]
fn compare<N: PartialOrd>(a: &N, b: &N) -> Ordering {
    // NaN is incomparable and counts as a tie
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

fn s_statistic<N>(values: &[N]) -> i64
where
    N: PartialOrd,
{
    let mut s = 0i64;
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            match compare(&values[j], &values[i]) {
                Ordering::Greater => s += 1,
                Ordering::Less => s -= 1,
                Ordering::Equal => {}
            }
        }
    }
    s
}

#[inline]
fn total_pairs(n: usize) -> f64 {
    (n * (n - 1)) as f64 / 2.0
}

/// Classify `values` with the default threshold (0.3).
///
/// Strictly increasing input of length >= 4 gives `Increasing` with tau > 0.5,
/// a constant sequence gives `Stable`, and fewer than 3 samples give `Stable` with tau 0.
pub fn mann_kendall_trend<N>(values: &[N]) -> TrendResult
where
    N: Num + PartialOrd + Copy,
{
    mann_kendall_trend_with_threshold(values, DEFAULT_TREND_THRESHOLD)
}

pub fn mann_kendall_trend_with_threshold<N>(values: &[N], threshold: f64) -> TrendResult
where
    N: Num + PartialOrd + Copy,
{
    let n = values.len();
    if n < MIN_SAMPLES {
        return TrendResult::STABLE;
    }
    let tau = s_statistic(values) as f64 / total_pairs(n);
    let trend = if tau > threshold {
        Trend::Increasing
    } else if tau < -threshold {
        Trend::Decreasing
    } else {
        Trend::Stable
    };
    TrendResult { tau, trend }
}

/// Mann-Kendall S, tau, tie-corrected variance, Z and two-sided p-value.
pub fn mann_kendall_test<N>(values: &[N]) -> MannKendall
where
    N: Num + PartialOrd + Copy,
{
    let n = values.len();
    if n < MIN_SAMPLES {
        return MannKendall { s: 0, tau: 0.0, variance: 0.0, z: 0.0, p_value: 1.0 };
    }
    let s = s_statistic(values);
    let tau = s as f64 / total_pairs(n);

    // tie groups: sizes of runs of equal values after sorting
    let mut sorted: Vec<N> = values.to_vec();
    sorted.sort_by(compare);
    let mut tie_term = 0.0;
    let mut run = 1usize;
    for k in 1..=sorted.len() {
        if k < sorted.len() && compare(&sorted[k], &sorted[k - 1]) == Ordering::Equal {
            run += 1;
            continue;
        }
        if run > 1 {
            let t = run as f64;
            tie_term += t * (t - 1.0) * (2.0 * t + 5.0);
        }
        run = 1;
    }
    let nf = n as f64;
    let variance = ((nf * (nf - 1.0) * (2.0 * nf + 5.0) - tie_term) / 18.0).max(0.0);

    if variance == 0.0 {
        // every sample tied
        return MannKendall { s, tau, variance, z: 0.0, p_value: 1.0 };
    }
    let sd = variance.sqrt();
    let z = match s.cmp(&0) {
        Ordering::Greater => (s as f64 - 1.0) / sd,
        Ordering::Less => (s as f64 + 1.0) / sd,
        Ordering::Equal => 0.0,
    };
    let p_value = match Normal::new(0.0, 1.0) {
        Ok(normal) => (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    };
    MannKendall { s, tau, variance, z, p_value }
}

/// Mean of every contiguous window of length `window`.
/// Empty when `window` is 0 or longer than `values`.
pub fn sliding_window_means(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}
