//! Predictive project health.
//!
//! Reads a project's error log, delegation history and file sizes, and turns them
//! into risk signals: recurring error clusters, tech debt trends, files close to the
//! line limit, a discrete risk level, and a 0-100 Bayesian risk score. Read-only:
//! nothing here mutates the history it is given.

pub mod bayesian;
pub mod records;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::config::{BayesConfig, EngineConfig, HealthConfig, TrendConfig};
use crate::stats::trend::Trend;

pub use records::{
    CrossProjectError, DebtIndicator, DelegationRecord, ErrorCluster, ErrorRecord, FileRisk, FileRiskLevel,
    HealthReport, ProjectHistory, ReportStats, RiskLevel, Severity, TechDebtTrend,
};

/// Errors considered "recent"
const RECENT_WINDOW: usize = 10;
const MAX_CLUSTERS: usize = 10;
const MAX_CLUSTER_EXAMPLES: usize = 3;
const EXAMPLE_CHARS: usize = 100;
const MAX_FILE_RISKS: usize = 20;
const MAX_CROSS_PROJECT_TRENDS: usize = 5;
const MAX_RECOMMENDATIONS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct HealthReporter {
    health: HealthConfig,
    trend: TrendConfig,
    bayes: BayesConfig,
}

impl HealthReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            health: config.health.clone(),
            trend: config.trend.clone(),
            bayes: config.bayes.clone(),
        }
    }

    /// Classify `(path, line count)` pairs against the configured limit.
    /// Safe files are left out; the rest come back riskiest first.
    pub fn assess_files<I, P>(&self, files: I) -> Vec<FileRisk>
    where
        I: IntoIterator<Item = (P, usize)>,
        P: Into<String>,
    {
        let risks = files
            .into_iter()
            .map(|(path, lines)| {
                FileRisk::assess_with(
                    path,
                    lines,
                    self.health.line_limit,
                    self.health.file_warning_ratio,
                    self.health.file_critical_ratio,
                )
            })
            .collect();
        rank_file_risks(risks)
    }

    pub fn generate(&self, history: &ProjectHistory, now: DateTime<Utc>) -> HealthReport {
        let file_risks = rank_file_risks(history.file_risks.clone());
        let error_clusters = identify_error_clusters(&history.error_log);
        let mut tech_debt_trends = detect_tech_debt_trends(&history.delegation_history, &history.error_log);
        tech_debt_trends.extend(detect_cross_project_trends(&history.cross_project_errors));

        let recommendations = generate_recommendations(&file_risks, &error_clusters, &tech_debt_trends);
        let risk_level = calculate_risk_level(&file_risks, &error_clusters, &tech_debt_trends);

        let trend_slopes =
            bayesian::compute_trend_slopes(&history.delegation_history, &history.error_log, &self.trend);
        let bayesian_risk_score = bayesian::compute_composite_risk(
            &history.delegation_history,
            &trend_slopes,
            &file_risks,
            &tech_debt_trends,
            &self.health,
        );
        let delegations = &history.delegation_history;
        let failure_rate = bayesian::compute_bayesian_failure_rate(delegations, &self.bayes);
        let success_risk = bayesian::compute_success_risk(delegations, &self.bayes);
        let confidence_intervals = bayesian::build_confidence_intervals(delegations, &self.bayes);

        tracing::info!(
            project = %history.project_name,
            risk_level = %risk_level,
            score = bayesian_risk_score,
            clusters = error_clusters.len(),
            trends = tech_debt_trends.len(),
            "generated health report"
        );

        HealthReport {
            generated_at: now,
            project_name: history.project_name.clone(),
            risk_level,
            stats: ReportStats {
                delegations: history.delegation_history.len(),
                errors_analyzed: history.error_log.len(),
                files_assessed: file_risks.len(),
            },
            file_risks,
            error_clusters,
            tech_debt_trends,
            recommendations,
            bayesian_risk_score,
            failure_rate,
            success_risk,
            confidence_intervals,
            trend_slopes,
        }
    }
}

/// Report with default settings, stamped with the current time
pub fn generate_health_report(history: &ProjectHistory) -> HealthReport {
    HealthReporter::new().generate(history, Utc::now())
}

fn rank_file_risks(mut risks: Vec<FileRisk>) -> Vec<FileRisk> {
    risks.retain(|r| r.risk_level != FileRiskLevel::Safe);
    risks.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    risks.truncate(MAX_FILE_RISKS);
    risks
}

fn recent<T>(records: &[T]) -> &[T] {
    &records[records.len().saturating_sub(RECENT_WINDOW)..]
}

/// Group errors by type. Only types seen at least twice form a cluster.
pub fn identify_error_clusters(errors: &[ErrorRecord]) -> Vec<ErrorCluster> {
    if errors.is_empty() {
        return Vec::new();
    }

    // error type -> (total, recent, examples), first-seen order
    let mut groups: IndexMap<&str, (usize, usize, Vec<String>)> = IndexMap::new();
    for error in errors {
        let group = groups.entry(error.error_type.as_str()).or_default();
        group.0 += 1;
        if group.2.len() < MAX_CLUSTER_EXAMPLES && !error.message.is_empty() {
            group.2.push(error.message.chars().take(EXAMPLE_CHARS).collect());
        }
    }
    for error in recent(errors) {
        if let Some(group) = groups.get_mut(error.error_type.as_str()) {
            group.1 += 1;
        }
    }

    let recent_len = RECENT_WINDOW.min(errors.len()) as f64;
    let total_len = errors.len() as f64;
    let mut clusters: Vec<ErrorCluster> = groups
        .into_iter()
        .filter(|(_, (total, _, _))| *total >= 2)
        .map(|(error_type, (count, recent_count, examples))| {
            let recent_rate = recent_count as f64 / recent_len;
            let total_rate = count as f64 / total_len;
            let trend = if recent_rate > total_rate * 1.3 {
                Trend::Increasing
            } else if recent_rate < total_rate * 0.7 {
                Trend::Decreasing
            } else {
                Trend::Stable
            };
            ErrorCluster {
                error_type: error_type.to_string(),
                count,
                recent_count,
                trend,
                examples,
            }
        })
        .collect();
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters.truncate(MAX_CLUSTERS);
    clusters
}

/// Debt signals from the delegation history and the recent error log
pub fn detect_tech_debt_trends(delegations: &[DelegationRecord], errors: &[ErrorRecord]) -> Vec<TechDebtTrend> {
    let mut trends = Vec::new();
    if delegations.is_empty() {
        return trends;
    }

    let total = delegations.len();
    let failures = delegations.iter().filter(|d| !d.success).count();
    if total >= 3 {
        let rate = failures as f64 / total as f64;
        if rate > 0.3 {
            trends.push(TechDebtTrend {
                indicator: DebtIndicator::FailureRate,
                description: format!("High failure rate: {failures}/{total} delegations fail"),
                severity: if rate > 0.5 { Severity::High } else { Severity::Medium },
                value: rate,
                threshold: 0.3,
            });
        }
    }

    let durations: Vec<f64> = delegations
        .iter()
        .filter_map(|d| d.duration_s)
        .filter(|s| *s > 0.0)
        .collect();
    if total >= 5 && durations.len() >= 5 {
        let half = durations.len() / 2;
        let first = durations[..half].iter().sum::<f64>() / half as f64;
        let second = durations[half..].iter().sum::<f64>() / (durations.len() - half) as f64;
        if first > 0.0 && second > first * 1.5 {
            trends.push(TechDebtTrend {
                indicator: DebtIndicator::DurationIncrease,
                description: "Delegation duration is growing (possible accumulated complexity)".to_string(),
                severity: Severity::Medium,
                value: second / first,
                threshold: 1.5,
            });
        }
    }

    let mut repeated: IndexMap<&str, usize> = IndexMap::new();
    for error in recent(errors) {
        *repeated.entry(error.error_type.as_str()).or_default() += 1;
    }
    for (error_type, count) in repeated {
        if count >= 3 {
            trends.push(TechDebtTrend {
                indicator: DebtIndicator::RepeatedError,
                description: format!(
                    "Error '{error_type}' appears {count}/{RECENT_WINDOW} recent times and needs a systematic fix"
                ),
                severity: if count >= 5 { Severity::High } else { Severity::Medium },
                value: count as f64 / RECENT_WINDOW as f64,
                threshold: 0.3,
            });
        }
    }
    trends
}

pub fn detect_cross_project_trends(errors: &[CrossProjectError]) -> Vec<TechDebtTrend> {
    errors
        .iter()
        .filter(|e| e.projects.len() >= 2 && e.count >= 3)
        .take(MAX_CROSS_PROJECT_TRENDS)
        .map(|e| TechDebtTrend {
            indicator: DebtIndicator::CrossProjectError,
            description: format!("Error '{}' repeats across {} projects", e.error_type, e.projects.len()),
            severity: Severity::Medium,
            value: e.count as f64,
            threshold: 3.0,
        })
        .collect()
}

/// Actionable advice, most urgent first
pub fn generate_recommendations(
    file_risks: &[FileRisk],
    clusters: &[ErrorCluster],
    trends: &[TechDebtTrend],
) -> Vec<String> {
    let mut recs = Vec::new();

    let critical: Vec<&FileRisk> = file_risks
        .iter()
        .filter(|f| f.risk_level == FileRiskLevel::Critical)
        .collect();
    if !critical.is_empty() {
        let names: Vec<&str> = critical.iter().take(3).map(|f| f.path.as_str()).collect();
        recs.push(format!(
            "URGENT: {} file(s) above 90% of the line limit: {}. Split them into helper modules now.",
            critical.len(),
            names.join(", ")
        ));
    }

    let warning = file_risks
        .iter()
        .filter(|f| f.risk_level == FileRiskLevel::Warning)
        .count();
    if warning > 0 {
        recs.push(format!(
            "ATTENTION: {warning} file(s) at 75-90% of the line limit. Plan a split before adding features."
        ));
    }

    for cluster in clusters.iter().filter(|c| c.trend == Trend::Increasing).take(3) {
        recs.push(format!(
            "Error '{}' is INCREASING ({} recent). Find the root cause and add a preventive rule.",
            cluster.error_type, cluster.recent_count
        ));
    }

    for trend in trends.iter().filter(|t| t.severity == Severity::High) {
        recs.push(format!("TECH DEBT: {}", trend.description));
    }

    if recs.is_empty() {
        recs.push("Project is healthy. No critical risks detected.".to_string());
    }
    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

/// Points: critical file 3, warning file 1, increasing cluster 2, high trend 3,
/// medium trend 1. 8 or more is critical, 3 or more is a warning.
pub fn calculate_risk_level(file_risks: &[FileRisk], clusters: &[ErrorCluster], trends: &[TechDebtTrend]) -> RiskLevel {
    let files: usize = file_risks
        .iter()
        .map(|f| match f.risk_level {
            FileRiskLevel::Critical => 3,
            FileRiskLevel::Warning => 1,
            FileRiskLevel::Safe => 0,
        })
        .sum();
    let growing = clusters.iter().filter(|c| c.trend == Trend::Increasing).count() * 2;
    let debt: usize = trends
        .iter()
        .map(|t| match t.severity {
            Severity::High => 3,
            Severity::Medium => 1,
            Severity::Low => 0,
        })
        .sum();

    match files + growing + debt {
        score if score >= 8 => RiskLevel::Critical,
        score if score >= 3 => RiskLevel::Warning,
        _ => RiskLevel::Healthy,
    }
}
