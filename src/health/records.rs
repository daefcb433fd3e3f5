use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::HealthConfig;
use crate::error::Result;
use crate::stats::bayesian::BetaSummary;
use crate::stats::trend::Trend;

/// One logged error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ErrorRecord {
    pub fn new<T, M>(error_type: T, message: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            timestamp: None,
        }
    }
}

/// One delegated task and how it ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationRecord {
    pub success: bool,
    #[serde(default)]
    pub duration_s: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl DelegationRecord {
    pub fn new(success: bool) -> Self {
        Self {
            success,
            duration_s: None,
            timestamp: None,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_s = Some(seconds);
        self
    }
}

/// An error type seen across several projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossProjectError {
    pub error_type: String,
    pub projects: Vec<String>,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRiskLevel {
    Safe,
    Warning,
    Critical,
}

/// A source file measured against the line limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRisk {
    pub path: String,
    pub lines: usize,
    pub limit: usize,
    /// lines / limit
    pub percentage: f64,
    pub risk_level: FileRiskLevel,
}

impl FileRisk {
    /// Classify with the default thresholds: warning from 75%, critical from 90%
    pub fn assess<P: Into<String>>(path: P, lines: usize, limit: usize) -> Self {
        let defaults = HealthConfig::default();
        Self::assess_with(path, lines, limit, defaults.file_warning_ratio, defaults.file_critical_ratio)
    }

    /// A limit of 0 never flags a file
    pub fn assess_with<P: Into<String>>(
        path: P,
        lines: usize,
        limit: usize,
        warning_ratio: f64,
        critical_ratio: f64,
    ) -> Self {
        let percentage = if limit > 0 { lines as f64 / limit as f64 } else { 0.0 };
        let risk_level = if limit == 0 || percentage < warning_ratio {
            FileRiskLevel::Safe
        } else if percentage >= critical_ratio {
            FileRiskLevel::Critical
        } else {
            FileRiskLevel::Warning
        };
        Self {
            path: path.into(),
            lines,
            limit,
            percentage,
            risk_level,
        }
    }
}

/// Errors of one type grouped together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCluster {
    pub error_type: String,
    pub count: usize,
    /// occurrences among the last 10 errors
    pub recent_count: usize,
    pub trend: Trend,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtIndicator {
    FailureRate,
    DurationIncrease,
    RepeatedError,
    CrossProjectError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechDebtTrend {
    pub indicator: DebtIndicator,
    pub description: String,
    pub severity: Severity,
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Healthy => "healthy",
            RiskLevel::Warning => "warning",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the reporter reads about one project. Oldest records first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectHistory {
    pub project_name: String,
    pub error_log: Vec<ErrorRecord>,
    pub delegation_history: Vec<DelegationRecord>,
    pub file_risks: Vec<FileRisk>,
    pub cross_project_errors: Vec<CrossProjectError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub delegations: usize,
    pub errors_analyzed: usize,
    pub files_assessed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub generated_at: DateTime<Utc>,
    pub project_name: String,
    pub risk_level: RiskLevel,
    pub file_risks: Vec<FileRisk>,
    pub error_clusters: Vec<ErrorCluster>,
    pub tech_debt_trends: Vec<TechDebtTrend>,
    pub recommendations: Vec<String>,
    /// 0 to 100
    pub bayesian_risk_score: f64,
    /// Posterior of the failure rate, absent without delegations
    pub failure_rate: Option<BetaSummary>,
    /// Posterior probability that the delegation success rate sits below the
    /// configured risk threshold, absent without delegations
    #[serde(default)]
    pub success_risk: Option<f64>,
    /// indicator name -> interval, rendered as a JSON object
    pub confidence_intervals: IndexMap<String, (f64, f64)>,
    pub trend_slopes: IndexMap<String, f64>,
    pub stats: ReportStats,
}

impl HealthReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_healthy(&self) -> bool {
        self.risk_level == RiskLevel::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_thresholds() {
        assert_eq!(FileRisk::assess("a.rs", 100, 400).risk_level, FileRiskLevel::Safe);
        assert_eq!(FileRisk::assess("a.rs", 300, 400).risk_level, FileRiskLevel::Warning);
        assert_eq!(FileRisk::assess("a.rs", 359, 400).risk_level, FileRiskLevel::Warning);
        assert_eq!(FileRisk::assess("a.rs", 360, 400).risk_level, FileRiskLevel::Critical);
        assert_eq!(FileRisk::assess("a.rs", 900, 0).risk_level, FileRiskLevel::Safe);
        assert!((FileRisk::assess("a.rs", 200, 400).percentage - 0.5).abs() < 1e-12);
    }

    #[test]
    fn history_accepts_partial_json() {
        let history: ProjectHistory = serde_json::from_str(
            r#"{"project_name":"demo","delegation_history":[{"success":false}],
                "error_log":[{"error_type":"truncation"}]}"#,
        )
        .unwrap();
        assert_eq!(history.project_name, "demo");
        assert!(!history.delegation_history[0].success);
        assert_eq!(history.error_log[0].message, "");
        assert!(history.file_risks.is_empty());
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&DebtIndicator::RepeatedError).unwrap(), "\"repeated_error\"");
        assert_eq!(serde_json::to_string(&FileRiskLevel::Critical).unwrap(), "\"critical\"");
        assert!(Severity::High > Severity::Medium);
    }
}
