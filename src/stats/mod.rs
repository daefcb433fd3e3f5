//! Statistics used to weigh evidence: Beta-Bernoulli estimation, temporal decay
//! and Mann-Kendall trend detection. Everything here is pure computation.

pub mod bayesian;
pub mod decay;
pub mod trend;

/// Round half away from zero to `decimals` places, as stored in persisted stats
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
