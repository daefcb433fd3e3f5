//! Relevance-ranked project memory.
//!
//! Entries live in capped sections. Relevance is `occurrences` decayed by age, so
//! compaction and briefings favor recent, repeated evidence without throwing the
//! rest of the history away first.

pub mod entry;

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DecayConfig, EngineConfig, MemoryConfig};
use crate::stats::decay::{age_in_days, weighted_score};
use crate::vectorizer::compare::cosine_similarity;
use crate::vectorizer::evaluate::scoring::Hits;
use crate::vectorizer::TFIDFVectorizer;

pub use entry::{MemoryEntry, Section};

/// Longest message rendered into a briefing line
const BRIEFING_MESSAGE_CHARS: usize = 120;

/// Capped, decayed memory sections.
///
/// Caps and half-life are serialized with the entries, so a restored store keeps
/// compacting the way it did before. Snapshots without them load with defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceStore {
    error_log: Vec<MemoryEntry>,
    delegation_history: Vec<MemoryEntry>,
    patterns: Vec<MemoryEntry>,
    #[serde(default)]
    config: MemoryConfig,
    #[serde(default)]
    decay: DecayConfig,
}

impl RelevanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom caps, default half-life
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Caps from the `memory` section, half-life from the `decay` section
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            config: config.memory.clone(),
            decay: config.decay.clone(),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn half_life_days(&self) -> f64 {
        self.decay.half_life_days
    }

    pub fn entries(&self, section: Section) -> &[MemoryEntry] {
        match section {
            Section::ErrorLog => &self.error_log,
            Section::DelegationHistory => &self.delegation_history,
            Section::Patterns => &self.patterns,
        }
    }

    fn entries_mut(&mut self, section: Section) -> &mut Vec<MemoryEntry> {
        match section {
            Section::ErrorLog => &mut self.error_log,
            Section::DelegationHistory => &mut self.delegation_history,
            Section::Patterns => &mut self.patterns,
        }
    }

    pub fn len(&self, section: Section) -> usize {
        self.entries(section).len()
    }

    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|s| self.entries(*s).is_empty())
    }

    /// `record_at` with the current time as reference
    pub fn record(&mut self, section: Section, entry: MemoryEntry) {
        self.record_at(section, entry, Utc::now());
    }

    /// Add `entry` to `section`, then compact the section against `now`.
    ///
    /// A pattern with an already known `kind` is merged into the existing entry:
    /// occurrences are summed and the timestamp refreshed.
    pub fn record_at(&mut self, section: Section, entry: MemoryEntry, now: DateTime<Utc>) {
        let entries = self.entries_mut(section);
        let merge_at = match section {
            Section::Patterns => entries.iter().position(|e| e.kind == entry.kind),
            _ => None,
        };
        match merge_at {
            Some(idx) => {
                let known = &mut entries[idx];
                known.occurrences += entry.occurrences.max(1);
                known.message = entry.message;
                known.timestamp = entry.timestamp.or(Some(now));
                if entry.success.is_some() {
                    known.success = entry.success;
                }
            }
            None => entries.push(entry),
        }
        self.compact(section, now);
    }

    /// Decayed weight of `entry` at `now`; untimed entries count as fresh
    pub fn entry_relevance(&self, entry: &MemoryEntry, now: DateTime<Utc>) -> f64 {
        let age = entry.timestamp.map_or(0.0, |ts| age_in_days(ts, now));
        weighted_score(entry.occurrences as f64, age, self.decay.half_life_days)
    }

    /// Trim `section` to its cap, keeping the most relevant entries in their original order
    fn compact(&mut self, section: Section, now: DateTime<Utc>) {
        let cap = section.cap(&self.config);
        let len = self.entries(section).len();
        if len <= cap {
            return;
        }
        let mut order: Vec<(usize, f64)> = self
            .entries(section)
            .iter()
            .enumerate()
            .map(|(idx, e)| (idx, self.entry_relevance(e, now)))
            .collect();
        // ties go to the newer entry
        order.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.0.cmp(&a.0)));
        let mut keep = vec![false; len];
        for (idx, _) in order.iter().take(cap) {
            keep[*idx] = true;
        }
        let mut flags = keep.into_iter();
        self.entries_mut(section).retain(|_| flags.next().unwrap_or(false));
        tracing::debug!(section = section.as_str(), dropped = len - cap, "compacted memory section");
    }

    /// Entries of `section` by decayed relevance, best first, at most `limit`
    pub fn ranked(&self, section: Section, now: DateTime<Utc>, limit: usize) -> Hits<&MemoryEntry> {
        let mut hits = Hits::from_pairs(
            self.entries(section)
                .iter()
                .map(|e| (e, self.entry_relevance(e, now))),
        );
        hits.sort_by_score_desc().top_k(limit);
        hits
    }

    /// Entries of `section` most similar to `query`, best first.
    ///
    /// A vectorizer is fitted over the section on each call; sections are small.
    /// Entries sharing no terms with the query are left out.
    pub fn find_relevant(&self, query: &str, section: Section, top_k: usize) -> Hits<&MemoryEntry> {
        let entries = self.entries(section);
        if query.trim().is_empty() || entries.is_empty() {
            return Hits::default();
        }
        let texts: Vec<String> = entries.iter().map(MemoryEntry::text).collect();
        let mut vectorizer: TFIDFVectorizer = TFIDFVectorizer::new();
        let vectors = vectorizer.fit_transform(&texts);
        let query_vec = vectorizer.transform(query);
        if query_vec.is_empty() {
            return Hits::default();
        }
        let mut hits = Hits::from_pairs(
            entries
                .iter()
                .zip(vectors.iter())
                .map(|(e, v)| (e, cosine_similarity(&query_vec, v))),
        );
        hits.retain_above(0.0).sort_by_score_desc().top_k(top_k);
        hits
    }

    /// Compact text of the most relevant entries per section, for a prompt.
    /// Empty sections are skipped; an empty store renders as an empty string.
    pub fn briefing(&self, now: DateTime<Utc>, per_section: usize) -> String {
        let mut out = String::new();
        for section in Section::ALL {
            let hits = self.ranked(section, now, per_section);
            if hits.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}:", section.title());
            for hit in hits.iter() {
                let entry = hit.key;
                let message: String = entry.message.chars().take(BRIEFING_MESSAGE_CHARS).collect();
                let marker = match (section, entry.success) {
                    (Section::DelegationHistory, Some(true)) => "ok".to_string(),
                    (Section::DelegationHistory, Some(false)) => "failed".to_string(),
                    _ => format!("{}x", entry.occurrences),
                };
                let _ = writeln!(out, "- [{marker}] {}: {message}", entry.kind);
            }
        }
        out
    }

    pub fn clear(&mut self) {
        for section in Section::ALL {
            self.entries_mut(section).clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn store_with_errors() -> RelevanceStore {
        let mut store = RelevanceStore::new();
        let now = Utc::now();
        for (kind, msg) in [
            ("TypeError", "Cannot read property of undefined"),
            ("SyntaxError", "Unexpected token }"),
            ("TypeError", "null is not an object"),
        ] {
            store.record_at(Section::ErrorLog, MemoryEntry::new(kind, msg).at(now), now);
        }
        store
    }

    #[test]
    fn find_relevant_ranks_by_text() {
        let store = store_with_errors();
        let hits = store.find_relevant("undefined null type errors", Section::ErrorLog, 2);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.key.kind == "TypeError"));
    }

    #[test]
    fn find_relevant_degenerate_inputs() {
        let store = store_with_errors();
        assert!(store.find_relevant("", Section::ErrorLog, 5).is_empty());
        assert!(store.find_relevant("undefined", Section::Patterns, 5).is_empty());
        assert!(store.find_relevant("kubernetes", Section::ErrorLog, 5).is_empty());
    }

    #[test]
    fn relevance_decays_with_age() {
        let store = RelevanceStore::new();
        let now = Utc::now();
        let fresh = MemoryEntry::new("E", "m").with_occurrences(4).at(now);
        let old = MemoryEntry::new("E", "m").with_occurrences(4).at(now - Duration::days(30));
        let untimed = MemoryEntry::new("E", "m").with_occurrences(4);
        assert!((store.entry_relevance(&fresh, now) - 4.0).abs() < 1e-9);
        assert!((store.entry_relevance(&old, now) - 2.0).abs() < 1e-6);
        assert_eq!(store.entry_relevance(&untimed, now), 4.0);
    }

    #[test]
    fn ranked_prefers_recent_and_repeated() {
        let mut store = RelevanceStore::new();
        let now = Utc::now();
        store.record_at(Section::ErrorLog, MemoryEntry::new("Old", "x").at(now - Duration::days(90)), now);
        store.record_at(Section::ErrorLog, MemoryEntry::new("New", "y").at(now), now);
        store.record_at(
            Section::ErrorLog,
            MemoryEntry::new("Frequent", "z").with_occurrences(5).at(now - Duration::days(10)),
            now,
        );
        let hits = store.ranked(Section::ErrorLog, now, 2);
        let kinds: Vec<&str> = hits.iter().map(|h| h.key.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Frequent", "New"]);
    }

    #[test]
    fn sections_are_capped_by_relevance() {
        let mut store = RelevanceStore::new();
        let now = Utc::now();
        // one very old entry first, then 30 fresh ones
        store.record_at(Section::ErrorLog, MemoryEntry::new("Ancient", "a").at(now - Duration::days(365)), now);
        for i in 0..30 {
            store.record_at(Section::ErrorLog, MemoryEntry::new(format!("E{i}"), "b").at(now), now);
        }
        assert_eq!(store.len(Section::ErrorLog), 30);
        let entries = store.entries(Section::ErrorLog);
        assert!(entries.iter().all(|e| e.kind != "Ancient"));
        // original order is kept
        assert_eq!(entries[0].kind, "E0");
        assert_eq!(entries[29].kind, "E29");
    }

    #[test]
    fn untimed_ties_keep_newest() {
        let mut store = RelevanceStore::new();
        let now = Utc::now();
        for i in 0..25 {
            store.record_at(Section::DelegationHistory, MemoryEntry::new("task", format!("run {i}")), now);
        }
        let entries = store.entries(Section::DelegationHistory);
        assert_eq!(entries.len(), 20);
        assert_eq!(entries[0].message, "run 5");
    }

    #[test]
    fn patterns_merge_by_kind() {
        let mut store = RelevanceStore::new();
        let now = Utc::now();
        store.record_at(Section::Patterns, MemoryEntry::new("retry-on-timeout", "first"), now);
        store.record_at(Section::Patterns, MemoryEntry::new("retry-on-timeout", "second"), now);
        store.record_at(Section::ErrorLog, MemoryEntry::new("retry-on-timeout", "err"), now);
        store.record_at(Section::ErrorLog, MemoryEntry::new("retry-on-timeout", "err"), now);
        assert_eq!(store.len(Section::Patterns), 1);
        let pattern = &store.entries(Section::Patterns)[0];
        assert_eq!(pattern.occurrences, 2);
        assert_eq!(pattern.message, "second");
        assert_eq!(pattern.timestamp, Some(now));
        assert_eq!(store.len(Section::ErrorLog), 2);
    }

    #[test]
    fn briefing_renders_sections() {
        let mut store = store_with_errors();
        let now = Utc::now();
        assert_eq!(RelevanceStore::new().briefing(now, 3), "");
        store.record_at(
            Section::DelegationHistory,
            MemoryEntry::new("refactor", "split parser").with_success(false).at(now),
            now,
        );
        let text = store.briefing(now, 2);
        assert!(text.starts_with("RECENT ERRORS:\n"));
        assert!(text.contains("RECENT DELEGATIONS:\n- [failed] refactor: split parser"));
        assert!(!text.contains("KNOWN PATTERNS"));
        assert_eq!(text.matches("- [1x]").count(), 2);
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = store_with_errors();
        assert!(!store.is_empty());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn half_life_comes_from_decay_section() {
        let config = EngineConfig::from_toml_str("[decay]\nhalf_life_days = 10.0\n").unwrap();
        let store = RelevanceStore::from_config(&config);
        assert_eq!(store.half_life_days(), 10.0);
        let now = Utc::now();
        let entry = MemoryEntry::new("E", "m").with_occurrences(4).at(now - Duration::days(10));
        assert!((store.entry_relevance(&entry, now) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn settings_survive_serialization() {
        let config = EngineConfig::from_toml_str(
            "[memory]\nmax_error_log = 2\n\n[decay]\nhalf_life_days = 7.0\n",
        )
        .unwrap();
        let mut store = RelevanceStore::from_config(&config);
        let now = Utc::now();
        store.record_at(Section::ErrorLog, MemoryEntry::new("A", "a").at(now), now);

        let json = serde_json::to_string(&store).unwrap();
        let mut restored: RelevanceStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.config().max_error_log, 2);
        assert_eq!(restored.half_life_days(), 7.0);
        for kind in ["B", "C"] {
            restored.record_at(Section::ErrorLog, MemoryEntry::new(kind, "b").at(now), now);
        }
        assert_eq!(restored.len(Section::ErrorLog), 2);

        let bare: RelevanceStore =
            serde_json::from_str(r#"{"error_log":[],"delegation_history":[],"patterns":[]}"#).unwrap();
        assert_eq!(bare.config(), &MemoryConfig::default());
        assert_eq!(bare.half_life_days(), 30.0);
    }
}
