//! Skill selection: a TF-IDF search index over a skill catalog and the
//! success history used to boost it.

pub mod index;
pub mod tracker;

pub use index::SemanticSkillIndex;
pub use tracker::{SkillCombo, SkillOutcome, SkillStat, SkillTracker, StatsSource};
