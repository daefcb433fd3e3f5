//! Beta-Bernoulli estimation of a success rate.
//!
//! Prior: Beta(1, 1), uniform.
//! Posterior after k successes and f failures: Beta(1 + k, 1 + f).
//! Credible intervals and risk scores come from the exact Beta distribution
//! (`statrs`). Above `NORMAL_APPROX_OBSERVATIONS` pseudo-counts the Beta CDF loses
//! precision, so risk scores switch to a normal with the same mean and variance.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ContinuousCDF, Normal};

use crate::error::{EngineError, Result};

pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// alpha + beta above which `risk_score` uses the normal approximation
pub const NORMAL_APPROX_OBSERVATIONS: f64 = 1e5;

/// Mean and credible interval of a posterior, as stored by trackers and reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaSummary {
    pub mean: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BayesianEstimator {
    alpha: f64,
    beta: f64,
}

impl Default for BayesianEstimator {
    fn default() -> Self {
        Self { alpha: 1.0, beta: 1.0 }
    }
}

impl BayesianEstimator {
    /// Uniform prior, mean 0.5
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom prior. Both parameters must be finite and positive.
    pub fn with_prior(alpha: f64, beta: f64) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) || !(beta.is_finite() && beta > 0.0) {
            return Err(EngineError::invalid_argument(format!(
                "beta prior needs positive finite parameters, got ({alpha}, {beta})"
            )));
        }
        Ok(Self { alpha, beta })
    }

    /// Uniform prior updated with `successes` out of `total`.
    /// `successes > total` counts as zero failures.
    pub fn from_stats(successes: u64, total: u64) -> Self {
        let mut estimator = Self::new();
        estimator.update(successes, total.saturating_sub(successes));
        estimator
    }

    /// Accumulate observations
    pub fn update(&mut self, successes: u64, failures: u64) {
        self.alpha += successes as f64;
        self.beta += failures as f64;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// alpha + beta, prior pseudo-counts included
    pub fn observations(&self) -> f64 {
        self.alpha + self.beta
    }

    /// alpha / (alpha + beta), always inside (0, 1)
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }

    fn distribution(&self) -> Option<Beta> {
        Beta::new(self.alpha, self.beta).ok()
    }

    /// Equal-tailed credible interval holding `level` of the posterior mass.
    ///
    /// `level` is clamped to [0, 1]. The bounds always satisfy
    /// `lower <= mean() <= upper` and narrow as observations grow.
    pub fn confidence_interval(&self, level: f64) -> (f64, f64) {
        let level = if level.is_nan() { DEFAULT_CONFIDENCE_LEVEL } else { level.clamp(0.0, 1.0) };
        let mean = self.mean();
        if level >= 1.0 {
            return (0.0, 1.0);
        }
        let Some(dist) = self.distribution() else {
            return (0.0, 1.0);
        };
        let tail = (1.0 - level) / 2.0;
        let lower = dist.inverse_cdf(tail);
        let upper = dist.inverse_cdf(1.0 - tail);
        let lower = if lower.is_finite() { lower.clamp(0.0, 1.0) } else { 0.0 };
        let upper = if upper.is_finite() { upper.clamp(0.0, 1.0) } else { 1.0 };
        // narrow levels on a skewed posterior can leave the mean outside the quantiles
        (lower.min(mean), upper.max(mean))
    }

    /// Like `confidence_interval`, but rejects a level outside (0, 1)
    pub fn try_confidence_interval(&self, level: f64) -> Result<(f64, f64)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(EngineError::invalid_argument(format!(
                "confidence level must be in (0, 1), got {level}"
            )));
        }
        Ok(self.confidence_interval(level))
    }

    /// Posterior probability that the true rate lies below `threshold`.
    ///
    /// With failure-skewed evidence (1 success, 9 failures) and threshold 0.5
    /// this is close to 1.
    pub fn risk_score(&self, threshold: f64) -> f64 {
        if threshold.is_nan() {
            return 0.5;
        }
        let threshold = threshold.clamp(0.0, 1.0);
        if self.observations() > NORMAL_APPROX_OBSERVATIONS {
            if let Ok(normal) = Normal::new(self.mean(), self.variance().sqrt()) {
                return normal.cdf(threshold).clamp(0.0, 1.0);
            }
        }
        match self.distribution() {
            Some(dist) => dist.cdf(threshold).clamp(0.0, 1.0),
            None => {
                if self.mean() < threshold {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn summary(&self, level: f64) -> BetaSummary {
        let (ci_lower, ci_upper) = self.confidence_interval(level);
        BetaSummary {
            mean: self.mean(),
            ci_lower,
            ci_upper,
        }
    }
}
