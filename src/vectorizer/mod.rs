pub mod compare;
pub mod corpus;
pub mod evaluate;
pub mod serde;
pub mod term;
pub mod tfidf;
pub mod tokenizer;

use std::marker::PhantomData;

use ::serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::{EngineError, Result};
use crate::vectorizer::{
    compare::SparseVec,
    corpus::Corpus,
    tfidf::{DefaultTFIDFEngine, TFIDFEngine},
    term::TermFrequency,
};

/// Fitted IDF weights.
/// Built once by `fit`, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IDFVector {
    /// term -> idf
    #[serde(with = "indexmap::map::serde_seq")]
    pub idf_vec: IndexMap<String, f64>,
    /// number of training documents
    pub doc_num: u64,
}

impl IDFVector {
    pub fn new() -> Self {
        Self {
            idf_vec: IndexMap::new(),
            doc_num: 0,
        }
    }

    /// Compute weights for every term of `corpus` with engine `E`
    pub fn from_corpus<E: TFIDFEngine>(corpus: &Corpus) -> Self {
        let doc_num = corpus.get_doc_num();
        let idf_vec = corpus
            .term_counts
            .iter()
            .map(|(term, &doc_freq)| (term.to_string(), E::idf(doc_num, doc_freq)))
            .collect();
        Self { idf_vec, doc_num }
    }
}

/// TF-IDF Vectorizer
///
/// `fit` over a training corpus once, then `transform` any number of texts into
/// sparse TF-IDF vectors. `transform` takes `&self` and never touches the IDF table,
/// so a fitted vectorizer can be shared between threads without locking.
///
/// `E` is the weighting engine (see `TFIDFEngine`).
#[derive(Debug, Clone)]
pub struct TFIDFVectorizer<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    /// IDF table
    pub idf: IDFVector,
    fitted: bool,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Default for TFIDFVectorizer<E>
where
    E: TFIDFEngine,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TFIDFVectorizer<E>
where
    E: TFIDFEngine,
{
    /// Create an unfitted vectorizer
    pub fn new() -> Self {
        Self {
            idf: IDFVector::new(),
            fitted: false,
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_idf(idf: IDFVector) -> Self {
        Self {
            idf,
            fitted: true,
            _marker: PhantomData,
        }
    }

    /// Build document frequencies and IDF weights from `corpus`.
    /// Replaces whatever a previous `fit` produced.
    pub fn fit<T>(&mut self, corpus: &[T]) -> &mut Self
    where
        T: AsRef<str> + Sync,
    {
        // tokenization is the expensive part, do it in parallel
        let doc_terms: Vec<TermFrequency> = corpus
            .par_iter()
            .map(|doc| TermFrequency::from_text(doc.as_ref()))
            .collect();

        let mut counts = Corpus::new();
        for freq in &doc_terms {
            counts.add_doc(freq);
        }
        self.idf = IDFVector::from_corpus::<E>(&counts);
        self.fitted = true;

        tracing::debug!(
            documents = counts.get_doc_num(),
            vocabulary = counts.vocab_size(),
            "fitted tf-idf vectorizer"
        );
        self
    }

    /// Project `text` onto the fitted vocabulary.
    ///
    /// Terms unseen during `fit` are dropped. Empty text, text with no known
    /// terms, or an unfitted vectorizer give an empty vector.
    pub fn transform(&self, text: &str) -> SparseVec {
        if !self.fitted {
            tracing::debug!("transform called before fit, returning empty vector");
            return SparseVec::new();
        }
        self.transform_freq(&TermFrequency::from_text(text))
    }

    /// Like `transform`, but reports a missing `fit` as an error
    pub fn try_transform(&self, text: &str) -> Result<SparseVec> {
        if !self.fitted {
            return Err(EngineError::NotFitted);
        }
        Ok(self.transform_freq(&TermFrequency::from_text(text)))
    }

    /// Weight already-counted terms
    pub fn transform_freq(&self, freq: &TermFrequency) -> SparseVec {
        let total = freq.term_sum();
        let mut vec = SparseVec::with_capacity(freq.term_num());
        if total == 0 {
            return vec;
        }
        for (term, count) in freq.iter() {
            if let Some(&idf) = self.idf.idf_vec.get(term) {
                vec.insert(term.to_string(), E::tf(count, total) * idf);
            }
        }
        vec
    }

    /// `fit` on `corpus`, then `transform` each of its documents.
    /// Output order matches input order.
    pub fn fit_transform<T>(&mut self, corpus: &[T]) -> Vec<SparseVec>
    where
        T: AsRef<str> + Sync,
    {
        self.fit(corpus);
        let this = &*self;
        corpus
            .par_iter()
            .map(|doc| this.transform(doc.as_ref()))
            .collect()
    }

    /// IDF of `term`, `None` if it was not in the training corpus
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.idf_vec.get(term).copied()
    }

    pub fn vocab_size(&self) -> usize {
        self.idf.idf_vec.len()
    }

    pub fn doc_num(&self) -> u64 {
        self.idf.doc_num
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.idf.idf_vec.contains_key(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::tfidf::SublinearTFIDFEngine;

    #[test]
    fn rare_terms_get_higher_idf() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
        v.fit(&["the cat sat", "the dog ran", "a bird flew"]);
        assert!(v.idf("cat").unwrap() > v.idf("the").unwrap());
        assert_eq!(v.doc_num(), 3);
    }

    #[test]
    fn transform_keeps_known_terms_only() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
        v.fit(&["alpha beta gamma", "beta gamma delta", "gamma delta epsilon"]);
        let vec = v.transform("alpha beta zeta");
        assert!(vec["alpha"] > 0.0);
        assert!(vec.contains_key("beta"));
        assert!(vec.contains_key("alpha_beta"));
        assert!(!vec.contains_key("zeta"));
    }

    #[test]
    fn unknown_or_empty_text_gives_empty_vector() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
        v.fit(&["some text"]);
        assert!(v.transform("").is_empty());
        assert!(v.transform("nothing matches here").is_empty());
    }

    #[test]
    fn single_word_documents() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
        v.fit(&["hello", "world"]);
        let vec = v.transform("hello");
        assert!(vec["hello"] > 0.0);
    }

    #[test]
    fn transform_before_fit() {
        let v: TFIDFVectorizer = TFIDFVectorizer::new();
        assert!(v.transform("hello").is_empty());
        assert!(matches!(v.try_transform("hello"), Err(EngineError::NotFitted)));
    }

    #[test]
    fn fit_transform_preserves_order() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
        let vectors = v.fit_transform(&["hello world", "goodbye world"]);
        assert_eq!(vectors.len(), 2);
        assert!(vectors[0].contains_key("hello"));
        assert!(vectors[1].contains_key("goodbye"));
    }

    #[test]
    fn refit_replaces_vocabulary() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
        v.fit(&["old words"]);
        v.fit(&["new terms"]);
        assert!(!v.contains_term("old"));
        assert!(v.contains_term("new"));
    }

    #[test]
    fn empty_corpus_fits_to_empty_vocabulary() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
        v.fit::<&str>(&[]);
        assert!(v.is_fitted());
        assert_eq!(v.vocab_size(), 0);
        assert!(v.transform("anything").is_empty());
    }

    #[test]
    fn engine_is_pluggable() {
        let mut v: TFIDFVectorizer<SublinearTFIDFEngine> = TFIDFVectorizer::new();
        v.fit(&["error error error timeout", "timeout"]);
        let vec = v.transform("error error error");
        let expected = (1.0 + 3f64.ln()) * v.idf("error").unwrap();
        assert!((vec["error"] - expected).abs() < 1e-12);
    }
}
