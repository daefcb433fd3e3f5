//! Engine configuration.
//!
//! Every section is `#[serde(default)]`, so a partial TOML document only overrides the keys
//! it names. Loading the file is the caller's job; this module only parses text.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub decay: DecayConfig,
    pub trend: TrendConfig,
    pub bayes: BayesConfig,
    pub search: SearchConfig,
    pub memory: MemoryConfig,
    pub health: HealthConfig,
}

impl EngineConfig {
    /// Parse a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// days until an observation's weight halves
    pub half_life_days: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self { half_life_days: crate::stats::decay::DEFAULT_HALF_LIFE_DAYS }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// |tau| above this is classified as a trend
    pub threshold: f64,
    /// sliding window length used to turn event histories into rate samples
    pub window: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            threshold: crate::stats::trend::DEFAULT_TREND_THRESHOLD,
            window: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesConfig {
    pub confidence_level: f64,
    /// success rate below which a health report counts a project as at risk
    pub risk_threshold: f64,
}

impl Default for BayesConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            risk_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// boosted search pulls `top_k * boost_candidate_factor` raw candidates before re-ranking
    pub boost_candidate_factor: usize,
    /// multiplier for candidates without any recorded history
    pub neutral_boost: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            boost_candidate_factor: 3,
            neutral_boost: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub max_error_log: usize,
    pub max_delegation_history: usize,
    pub max_patterns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_error_log: 30,
            max_delegation_history: 20,
            max_patterns: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// weight of the Beta failure mean in the composite score
    pub failure_weight: f64,
    /// weight of the trend severity in the composite score
    pub trend_weight: f64,
    /// weight of file and tech debt risks in the composite score
    pub risk_weight: f64,
    pub line_limit: usize,
    pub file_warning_ratio: f64,
    pub file_critical_ratio: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_weight: 0.5,
            trend_weight: 0.2,
            risk_weight: 0.3,
            line_limit: 400,
            file_warning_ratio: 0.75,
            file_critical_ratio: 0.90,
        }
    }
}
