use rayon::prelude::*;

use crate::config::SearchConfig;
use crate::error::{EngineError, Result};
use crate::skills::tracker::StatsSource;
use crate::stats::bayesian::BayesianEstimator;
use crate::vectorizer::compare::{cosine_similarity, SparseVec};
use crate::vectorizer::evaluate::scoring::Hits;
use crate::vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};
use crate::vectorizer::TFIDFVectorizer;

/// Precomputed TF-IDF index over a catalog of named skills.
///
/// Each skill is indexed as its name (with `-`/`_` split into words) followed by
/// its keywords, so queries can hit either. Built once, then searched read-only.
#[derive(Debug, Clone)]
pub struct SemanticSkillIndex<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    vectorizer: TFIDFVectorizer<E>,
    names: Vec<String>,
    vectors: Vec<SparseVec>,
    config: SearchConfig,
    built: bool,
}

impl<E> Default for SemanticSkillIndex<E>
where
    E: TFIDFEngine,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SemanticSkillIndex<E>
where
    E: TFIDFEngine,
{
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            vectorizer: TFIDFVectorizer::new(),
            names: Vec::new(),
            vectors: Vec::new(),
            config,
            built: false,
        }
    }

    /// Index `catalog` of `(name, keywords)`, replacing any previous build
    pub fn build_from_keywords<I, N, K, S>(&mut self, catalog: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut texts = Vec::new();
        for (name, keywords) in catalog {
            let name: String = name.into();
            let mut text = name.replace(['-', '_'], " ");
            for keyword in keywords {
                text.push(' ');
                text.push_str(keyword.as_ref());
            }
            names.push(name);
            texts.push(text);
        }

        self.vectors = self.vectorizer.fit_transform(&texts);
        self.names = names;
        self.built = true;
        tracing::debug!(
            skills = self.names.len(),
            vocabulary = self.vectorizer.vocab_size(),
            "built skill index"
        );
        self
    }

    /// Top `top_k` skills by cosine similarity to `query`, best first.
    ///
    /// Only candidates with a similarity above zero are returned. A blank query,
    /// an unbuilt index, or a query sharing no terms with the catalog gives no hits.
    pub fn search(&self, query: &str, top_k: usize) -> Hits<String> {
        if !self.built || query.trim().is_empty() {
            return Hits::default();
        }
        let query_vec = self.vectorizer.transform(query);
        if query_vec.is_empty() {
            return Hits::default();
        }

        let scores: Vec<f64> = self
            .vectors
            .par_iter()
            .map(|vec| cosine_similarity(&query_vec, vec))
            .collect();

        let mut hits = Hits::from_pairs(self.names.iter().cloned().zip(scores));
        hits.retain_above(0.0).sort_by_score_desc().top_k(top_k);
        hits
    }

    /// Like `search`, but an unbuilt index is an error
    pub fn try_search(&self, query: &str, top_k: usize) -> Result<Hits<String>> {
        if !self.built {
            return Err(EngineError::IndexNotBuilt);
        }
        Ok(self.search(query, top_k))
    }

    /// `search`, re-ranked by each candidate's historical success.
    ///
    /// Similarity is multiplied by the Beta posterior mean of the candidate's
    /// `(successes, total)`; candidates without history get the neutral boost.
    /// A wider candidate pool (`top_k * boost_candidate_factor`) is ranked so a
    /// reliable skill just outside the plain top-k can move in.
    pub fn search_with_boost<S>(&self, query: &str, top_k: usize, stats: &S) -> Hits<String>
    where
        S: StatsSource + ?Sized,
    {
        let pool = top_k.saturating_mul(self.config.boost_candidate_factor.max(1));
        let mut hits = self.search(query, pool);
        if hits.is_empty() {
            return hits;
        }
        let neutral = self.config.neutral_boost;
        hits.rescale(|name| match stats.outcome(name) {
            Some(outcome) if outcome.total > 0 => {
                BayesianEstimator::from_stats(outcome.successes, outcome.total).mean()
            }
            _ => neutral,
        })
        .sort_by_score_desc()
        .top_k(top_k);
        hits
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
