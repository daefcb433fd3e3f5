use std::collections::HashMap;
use std::hash::BuildHasher;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::stats::bayesian::{BayesianEstimator, DEFAULT_CONFIDENCE_LEVEL};
use crate::stats::round_to;

/// Purging only starts once more skills than this are tracked
const PURGE_MIN_TRACKED: usize = 30;
/// Skills injected fewer times than this are purge candidates
const PURGE_MIN_INJECTIONS: u64 = 2;
/// ... when unused for longer than this many days
const PURGE_IDLE_DAYS: i64 = 90;
/// Combos are keyed by at most this many skill names
const MAX_COMBO_SIZE: usize = 4;

/// Raw success history of one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOutcome {
    pub successes: u64,
    pub total: u64,
}

/// Anything that can report `(successes, total)` for a skill name
pub trait StatsSource {
    fn outcome(&self, name: &str) -> Option<SkillOutcome>;
}

impl<S: BuildHasher> StatsSource for HashMap<String, SkillOutcome, S> {
    fn outcome(&self, name: &str) -> Option<SkillOutcome> {
        self.get(name).copied()
    }
}

impl<S: BuildHasher> StatsSource for IndexMap<String, SkillOutcome, S> {
    fn outcome(&self, name: &str) -> Option<SkillOutcome> {
        self.get(name).copied()
    }
}

/// Per-skill statistics as persisted by callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillStat {
    pub injected: u64,
    pub with_success: u64,
    pub with_truncation: u64,
    /// raw ratio, 3 decimals
    pub success_rate: f64,
    pub bayesian_mean: f64,
    pub bayesian_ci_lower: f64,
    pub bayesian_ci_upper: f64,
    pub last_used: Option<DateTime<Utc>>,
}

impl Default for SkillStat {
    fn default() -> Self {
        Self {
            injected: 0,
            with_success: 0,
            with_truncation: 0,
            success_rate: 1.0,
            bayesian_mean: 0.5,
            bayesian_ci_lower: 0.0,
            bayesian_ci_upper: 1.0,
            last_used: None,
        }
    }
}

impl SkillStat {
    pub fn outcome(&self) -> SkillOutcome {
        SkillOutcome {
            successes: self.with_success,
            total: self.injected,
        }
    }

    pub fn estimator(&self) -> BayesianEstimator {
        BayesianEstimator::from_stats(self.with_success, self.injected)
    }

    fn refresh(&mut self) {
        if self.injected > 0 {
            self.success_rate = round_to(self.with_success as f64 / self.injected as f64, 3);
        }
        let summary = self.estimator().summary(DEFAULT_CONFIDENCE_LEVEL);
        self.bayesian_mean = round_to(summary.mean, 4);
        self.bayesian_ci_lower = round_to(summary.ci_lower, 4);
        self.bayesian_ci_upper = round_to(summary.ci_upper, 4);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCombo {
    /// sorted skill names
    pub skills: Vec<String>,
    pub count: u64,
    pub successes: u64,
    pub success_rate: f64,
}

/// Success tracking per skill, one Beta posterior per name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillTracker {
    #[serde(with = "indexmap::map::serde_seq")]
    stats: IndexMap<String, SkillStat>,
    combos: Vec<SkillCombo>,
}

impl SkillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one injection of `name` and its result
    pub fn record(&mut self, name: &str, success: bool, truncated: bool, at: DateTime<Utc>) -> &SkillStat {
        let stat = self.stats.entry(name.to_string()).or_default();
        stat.injected += 1;
        if success {
            stat.with_success += 1;
        }
        if truncated {
            stat.with_truncation += 1;
        }
        stat.last_used = Some(at);
        stat.refresh();
        tracing::trace!(skill = name, injected = stat.injected, mean = stat.bayesian_mean, "skill outcome recorded");
        stat
    }

    /// Record a combination of skills used together.
    /// Fewer than 2 names is not a combination and is ignored.
    pub fn record_combo<T>(&mut self, names: &[T], success: bool)
    where
        T: AsRef<str>,
    {
        if names.len() < 2 {
            return;
        }
        let mut key: Vec<String> = names
            .iter()
            .take(MAX_COMBO_SIZE)
            .map(|n| n.as_ref().to_string())
            .collect();
        key.sort();

        let combo = match self.combos.iter().position(|c| c.skills == key) {
            Some(idx) => &mut self.combos[idx],
            None => {
                self.combos.push(SkillCombo {
                    skills: key,
                    count: 0,
                    successes: 0,
                    success_rate: 0.0,
                });
                let last = self.combos.len() - 1;
                &mut self.combos[last]
            }
        };
        combo.count += 1;
        if success {
            combo.successes += 1;
        }
        combo.success_rate = round_to(combo.successes as f64 / combo.count as f64, 3);
    }

    pub fn get(&self, name: &str) -> Option<&SkillStat> {
        self.stats.get(name)
    }

    pub fn combos(&self) -> &[SkillCombo] {
        &self.combos
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SkillStat)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop rarely used skills that went idle, once the table grows past 30 entries.
    /// Returns the purged names.
    pub fn purge_stale(&mut self, now: DateTime<Utc>) -> Vec<String> {
        if self.stats.len() <= PURGE_MIN_TRACKED {
            return Vec::new();
        }
        let cutoff = now - Duration::days(PURGE_IDLE_DAYS);
        let stale: Vec<String> = self
            .stats
            .iter()
            .filter(|(_, st)| st.injected < PURGE_MIN_INJECTIONS)
            .filter(|(_, st)| st.last_used.map_or(true, |last| last < cutoff))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &stale {
            self.stats.shift_remove(name);
        }
        if !stale.is_empty() {
            tracing::debug!(purged = stale.len(), "purged stale skill stats");
        }
        stale
    }
}

impl StatsSource for SkillTracker {
    fn outcome(&self, name: &str) -> Option<SkillOutcome> {
        self.stats.get(name).map(SkillStat::outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bayesian_fields_follow_outcomes() {
        let mut tracker = SkillTracker::new();
        let now = Utc::now();
        for _ in 0..8 {
            tracker.record("test-skill", true, false, now);
        }
        for _ in 0..2 {
            tracker.record("test-skill", false, true, now);
        }
        let stat = tracker.get("test-skill").unwrap();
        assert_eq!(stat.injected, 10);
        assert_eq!(stat.with_truncation, 2);
        assert_eq!(stat.success_rate, 0.8);
        // Beta(9, 3)
        assert!((stat.bayesian_mean - 0.75).abs() < 1e-4);
        assert!(stat.bayesian_ci_lower < stat.bayesian_mean);
        assert!(stat.bayesian_mean < stat.bayesian_ci_upper);
        assert_eq!(tracker.outcome("test-skill"), Some(SkillOutcome { successes: 8, total: 10 }));
        assert_eq!(tracker.outcome("missing"), None);
    }

    #[test]
    fn combos_are_order_insensitive() {
        let mut tracker = SkillTracker::new();
        tracker.record_combo(&["b", "a"], true);
        tracker.record_combo(&["a", "b"], false);
        tracker.record_combo(&["solo"], true);
        assert_eq!(tracker.combos().len(), 1);
        let combo = &tracker.combos()[0];
        assert_eq!(combo.skills, vec!["a", "b"]);
        assert_eq!((combo.count, combo.successes), (2, 1));
        assert_eq!(combo.success_rate, 0.5);
    }

    #[test]
    fn combo_key_is_capped() {
        let mut tracker = SkillTracker::new();
        tracker.record_combo(&["e", "d", "c", "b", "a"], true);
        assert_eq!(tracker.combos()[0].skills, vec!["b", "c", "d", "e"]);
    }

    #[test]
    fn purge_only_when_table_is_large() {
        let now = Utc::now();
        let old = now - Duration::days(120);
        let mut tracker = SkillTracker::new();
        tracker.record("idle", true, false, old);
        assert!(tracker.purge_stale(now).is_empty());

        for i in 0..30 {
            tracker.record(&format!("busy-{i}"), true, false, now);
        }
        tracker.record("heavy-but-old", true, false, old);
        tracker.record("heavy-but-old", true, false, old);
        let purged = tracker.purge_stale(now);
        assert_eq!(purged, vec!["idle".to_string()]);
        assert!(tracker.get("heavy-but-old").is_some());
        assert_eq!(tracker.len(), 31);
    }

    #[test]
    fn map_sources() {
        let mut stats: HashMap<String, SkillOutcome> = HashMap::new();
        stats.insert("x".into(), SkillOutcome { successes: 1, total: 2 });
        assert_eq!(stats.outcome("x").unwrap().total, 2);
        assert!(stats.outcome("y").is_none());
    }
}
