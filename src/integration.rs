//! Boundary between the engine and the workflow that consumes it.
//!
//! Intelligence features are advisory: a failure in one of them must never stop
//! the surrounding task. `fail_open` makes that explicit instead of swallowing
//! errors silently, and `IntelligenceHub` owns the per-workspace state that used to
//! live in process-wide registries.

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::memory::RelevanceStore;
use crate::skills::{SemanticSkillIndex, SkillStat, SkillTracker};
use crate::vectorizer::evaluate::scoring::Hits;

/// The value of `result`, or `T::default()` after logging the error
pub fn fail_open<T: Default>(operation: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(operation, error = %err, "intelligence feature failed, continuing without it");
            T::default()
        }
    }
}

/// Skill index, success tracker, memory and configuration for one workspace
#[derive(Debug, Clone, Default)]
pub struct IntelligenceHub {
    config: EngineConfig,
    index: SemanticSkillIndex,
    tracker: SkillTracker,
    memory: RelevanceStore,
}

impl IntelligenceHub {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            index: SemanticSkillIndex::with_config(config.search.clone()),
            tracker: SkillTracker::new(),
            memory: RelevanceStore::from_config(&config),
            config,
        }
    }

    /// Restore a hub around a previously persisted tracker
    pub fn with_tracker(config: EngineConfig, tracker: SkillTracker) -> Self {
        Self {
            tracker,
            ..Self::new(config)
        }
    }

    pub fn build_skill_index<I, N, K, S>(&mut self, catalog: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.index.build_from_keywords(catalog);
        self
    }

    /// Best skills for `task`, boosted by their recorded success
    pub fn try_suggest_skills(&self, task: &str, top_k: usize) -> Result<Hits<String>> {
        if !self.index.is_built() {
            return Err(EngineError::IndexNotBuilt);
        }
        Ok(self.index.search_with_boost(task, top_k, &self.tracker))
    }

    /// `try_suggest_skills` that fails open: no suggestions instead of an error
    pub fn suggest_skills(&self, task: &str, top_k: usize) -> Hits<String> {
        fail_open("suggest_skills", self.try_suggest_skills(task, top_k))
    }

    pub fn record_skill_outcome(
        &mut self,
        name: &str,
        success: bool,
        truncated: bool,
        at: DateTime<Utc>,
    ) -> &SkillStat {
        self.tracker.record(name, success, truncated, at)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn index(&self) -> &SemanticSkillIndex {
        &self.index
    }

    pub fn tracker(&self) -> &SkillTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SkillTracker {
        &mut self.tracker
    }

    pub fn memory(&self) -> &RelevanceStore {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut RelevanceStore {
        &mut self.memory
    }
}
