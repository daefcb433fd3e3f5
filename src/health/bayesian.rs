//! Probabilistic parts of the health report: the Beta posterior of the failure
//! rate, Mann-Kendall slopes of rolling indicators, and the composite score.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::{BayesConfig, HealthConfig, TrendConfig};
use crate::health::records::{
    DelegationRecord, ErrorRecord, FileRisk, FileRiskLevel, Severity, TechDebtTrend,
};
use crate::stats::bayesian::{BayesianEstimator, BetaSummary};
use crate::stats::round_to;
use crate::stats::trend::{mann_kendall_trend_with_threshold, sliding_window_means, MIN_SAMPLES};

pub const FAILURE_RATE: &str = "failure_rate";
pub const ERROR_DIVERSITY: &str = "error_diversity";

fn failure_estimator(delegations: &[DelegationRecord]) -> BayesianEstimator {
    let failures = delegations.iter().filter(|d| !d.success).count() as u64;
    BayesianEstimator::from_stats(failures, delegations.len() as u64)
}

/// Posterior of the failure rate, 4 decimals. `None` without delegations.
pub fn compute_bayesian_failure_rate(
    delegations: &[DelegationRecord],
    bayes: &BayesConfig,
) -> Option<BetaSummary> {
    if delegations.is_empty() {
        return None;
    }
    let summary = failure_estimator(delegations).summary(bayes.confidence_level);
    Some(BetaSummary {
        mean: round_to(summary.mean, 4),
        ci_lower: round_to(summary.ci_lower, 4),
        ci_upper: round_to(summary.ci_upper, 4),
    })
}

/// Probability that the delegation success rate is below `bayes.risk_threshold`,
/// 4 decimals. `None` without delegations.
pub fn compute_success_risk(delegations: &[DelegationRecord], bayes: &BayesConfig) -> Option<f64> {
    if delegations.is_empty() {
        return None;
    }
    let successes = delegations.iter().filter(|d| d.success).count() as u64;
    let estimator = BayesianEstimator::from_stats(successes, delegations.len() as u64);
    Some(round_to(estimator.risk_score(bayes.risk_threshold), 4))
}

/// Kendall tau of rolling indicators.
///
/// - `failure_rate`: share of failed delegations per window
/// - `error_diversity`: distinct error types per window
///
/// An indicator is present only with at least `window` records and 3 windows.
pub fn compute_trend_slopes(
    delegations: &[DelegationRecord],
    errors: &[ErrorRecord],
    trend: &TrendConfig,
) -> IndexMap<String, f64> {
    let window = trend.window.max(1);
    let mut slopes = IndexMap::new();

    if delegations.len() >= window {
        let fails: Vec<f64> = delegations
            .iter()
            .map(|d| if d.success { 0.0 } else { 1.0 })
            .collect();
        let rates = sliding_window_means(&fails, window);
        if rates.len() >= MIN_SAMPLES {
            let result = mann_kendall_trend_with_threshold(&rates, trend.threshold);
            slopes.insert(FAILURE_RATE.to_string(), round_to(result.tau, 4));
        }
    }

    if errors.len() >= window {
        let diversity: Vec<f64> = errors
            .windows(window)
            .map(|chunk| chunk.iter().map(|e| e.error_type.as_str()).collect::<HashSet<_>>().len() as f64)
            .collect();
        if diversity.len() >= MIN_SAMPLES {
            let result = mann_kendall_trend_with_threshold(&diversity, trend.threshold);
            slopes.insert(ERROR_DIVERSITY.to_string(), round_to(result.tau, 4));
        }
    }
    slopes
}

/// Mean trend severity in [0, 1]. A falling failure rate is good news and counts as 0.
pub fn trend_severity(slopes: &IndexMap<String, f64>) -> f64 {
    if slopes.is_empty() {
        return 0.0;
    }
    let sum: f64 = slopes
        .iter()
        .map(|(key, tau)| if key == FAILURE_RATE { tau.max(0.0) } else { tau.abs() })
        .sum();
    (sum / slopes.len() as f64).min(1.0)
}

/// File and debt risk in [0, 1]: 0.3 per critical file, 0.1 per warning file,
/// 0.2 per high severity trend
pub fn structural_risk(file_risks: &[FileRisk], trends: &[TechDebtTrend]) -> f64 {
    let critical = file_risks.iter().filter(|f| f.risk_level == FileRiskLevel::Critical).count();
    let warning = file_risks.iter().filter(|f| f.risk_level == FileRiskLevel::Warning).count();
    let files = (critical as f64 * 0.3 + warning as f64 * 0.1).min(1.0);
    let high = trends.iter().filter(|t| t.severity == Severity::High).count();
    (files + high as f64 * 0.2).min(1.0)
}

/// Weighted blend of failure mean, trend severity and structural risk, scaled to
/// 0-100 with one decimal
pub fn compute_composite_risk(
    delegations: &[DelegationRecord],
    slopes: &IndexMap<String, f64>,
    file_risks: &[FileRisk],
    trends: &[TechDebtTrend],
    health: &HealthConfig,
) -> f64 {
    let failure = if delegations.is_empty() {
        0.0
    } else {
        failure_estimator(delegations).mean()
    };
    let composite = health.failure_weight * failure
        + health.trend_weight * trend_severity(slopes)
        + health.risk_weight * structural_risk(file_risks, trends);
    round_to((composite * 100.0).clamp(0.0, 100.0), 1)
}

pub fn build_confidence_intervals(
    delegations: &[DelegationRecord],
    bayes: &BayesConfig,
) -> IndexMap<String, (f64, f64)> {
    let mut intervals = IndexMap::new();
    if let Some(rate) = compute_bayesian_failure_rate(delegations, bayes) {
        intervals.insert(FAILURE_RATE.to_string(), (rate.ci_lower, rate.ci_upper));
    }
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delegations(pattern: &[bool]) -> Vec<DelegationRecord> {
        pattern.iter().map(|s| DelegationRecord::new(*s)).collect()
    }

    #[test]
    fn failure_rate_posterior() {
        let history = delegations(&[true, true, false, false]);
        let rate = compute_bayesian_failure_rate(&history, &BayesConfig::default()).unwrap();
        assert!((rate.mean - 0.5).abs() < 1e-12);
        assert!(rate.ci_lower < rate.mean && rate.mean < rate.ci_upper);
        assert!(compute_bayesian_failure_rate(&[], &BayesConfig::default()).is_none());
    }

    #[test]
    fn success_risk_follows_threshold() {
        let failing = delegations(&[false, false, false, false, false, false, false, false, true]);
        let strict = BayesConfig { risk_threshold: 0.5, ..BayesConfig::default() };
        assert!(compute_success_risk(&failing, &strict).unwrap() > 0.9);

        let lenient = BayesConfig { risk_threshold: 0.05, ..BayesConfig::default() };
        assert!(compute_success_risk(&failing, &lenient).unwrap() < 0.1);
        assert!(compute_success_risk(&[], &strict).is_none());
    }

    #[test]
    fn rising_failures_give_positive_slope() {
        let mut pattern = vec![true; 6];
        pattern.extend(vec![false; 6]);
        let slopes = compute_trend_slopes(&delegations(&pattern), &[], &TrendConfig::default());
        assert!(slopes[FAILURE_RATE] > 0.5);
        assert!(!slopes.contains_key(ERROR_DIVERSITY));
        assert!(trend_severity(&slopes) > 0.5);
    }

    #[test]
    fn slopes_need_three_windows() {
        let slopes = compute_trend_slopes(&delegations(&[false; 6]), &[], &TrendConfig::default());
        assert!(slopes.is_empty());
        let slopes = compute_trend_slopes(&delegations(&[false; 7]), &[], &TrendConfig::default());
        assert_eq!(slopes[FAILURE_RATE], 0.0);
    }

    #[test]
    fn error_diversity_slope() {
        let errors: Vec<ErrorRecord> = ["a", "a", "a", "a", "a", "b", "c", "d", "e"]
            .iter()
            .map(|t| ErrorRecord::new(*t, ""))
            .collect();
        let slopes = compute_trend_slopes(&[], &errors, &TrendConfig::default());
        assert!(slopes[ERROR_DIVERSITY] > 0.9);
    }

    #[test]
    fn falling_failure_rate_is_not_severe() {
        let mut slopes = IndexMap::new();
        slopes.insert(FAILURE_RATE.to_string(), -0.8);
        assert_eq!(trend_severity(&slopes), 0.0);
        slopes.insert(ERROR_DIVERSITY.to_string(), -0.6);
        assert!((trend_severity(&slopes) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn structural_risk_is_capped() {
        let files: Vec<FileRisk> = (0..5).map(|i| FileRisk::assess(format!("f{i}.rs"), 400, 400)).collect();
        assert_eq!(structural_risk(&files, &[]), 1.0);
        let one = vec![FileRisk::assess("w.rs", 310, 400)];
        assert!((structural_risk(&one, &[]) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn composite_of_clean_history() {
        let history = delegations(&[true; 10]);
        let slopes = compute_trend_slopes(&history, &[], &TrendConfig::default());
        let score = compute_composite_risk(&history, &slopes, &[], &[], &HealthConfig::default());
        // 100 * 0.5 * 1/12
        assert_eq!(score, 4.2);
        assert_eq!(compute_composite_risk(&[], &IndexMap::new(), &[], &[], &HealthConfig::default()), 0.0);
    }

    #[test]
    fn intervals_keyed_by_indicator() {
        let intervals = build_confidence_intervals(&delegations(&[true, false]), &BayesConfig::default());
        let (lo, hi) = intervals[FAILURE_RATE];
        assert!(lo < 0.5 && 0.5 < hi);
        assert!(build_confidence_intervals(&[], &BayesConfig::default()).is_empty());
    }
}
