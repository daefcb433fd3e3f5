use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitEntry<K> {
    pub key: K,
    pub score: f64,
}

/// Structure to store ranked results
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Hits<K> {
    pub list: Vec<HitEntry<K>>,
}

impl<K> Default for Hits<K> {
    fn default() -> Self {
        Hits { list: Vec::new() }
    }
}

impl<K> Hits<K> {
    /// Create a new Hits instance
    pub fn new(list: Vec<HitEntry<K>>) -> Self {
        Hits { list }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        Hits {
            list: pairs.into_iter().map(|(key, score)| HitEntry { key, score }).collect(),
        }
    }

    /// Sort results by descending score.
    /// NaN scores are removed; ties keep their input order.
    pub fn sort_by_score_desc(&mut self) -> &mut Self {
        self.list.retain(|e| !e.score.is_nan());
        self.list.sort_by(|a, b| b.score.total_cmp(&a.score));
        self
    }

    /// Sort results by ascending score
    pub fn sort_by_score_asc(&mut self) -> &mut Self {
        self.list.retain(|e| !e.score.is_nan());
        self.list.sort_by(|a, b| a.score.total_cmp(&b.score));
        self
    }

    /// Keep the first `k` entries
    pub fn top_k(&mut self, k: usize) -> &mut Self {
        self.list.truncate(k);
        self
    }

    /// Drop entries whose score is not above `min`
    pub fn retain_above(&mut self, min: f64) -> &mut Self {
        self.list.retain(|e| e.score > min);
        self
    }

    /// Multiply each score by `f(key)`
    pub fn rescale<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&K) -> f64,
    {
        for entry in self.list.iter_mut() {
            entry.score *= f(&entry.key);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitEntry<K>> {
        self.list.iter()
    }

    pub fn keys(&self) -> Vec<&K> {
        self.list.iter().map(|e| &e.key).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.list.iter().map(|e| e.score).collect()
    }

    pub fn into_pairs(self) -> Vec<(K, f64)> {
        self.list.into_iter().map(|e| (e.key, e.score)).collect()
    }
}

impl<K> IntoIterator for Hits<K> {
    type Item = HitEntry<K>;
    type IntoIter = std::vec::IntoIter<HitEntry<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl<K> Debug for Hits<K>
where
    K: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // one hit per line
            writeln!(f, "Hits [")?;
            for entry in &self.list {
                writeln!(f, "    {:?}: {:.6}", entry.key, entry.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list()
                .entries(self.list.iter().map(|e| (&e.key, e.score)))
                .finish()
        }
    }
}

impl<K> Display for Hits<K>
where
    K: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, entry) in self.list.iter().enumerate() {
            writeln!(f, "{:>3}. {} ({:.4})", rank + 1, entry.key, entry.score)?;
        }
        Ok(())
    }
}
