use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::TermFrequency;

/// Document frequencies of a training corpus.
/// Stores no text, only how many documents were seen and in how many of them
/// each term appears. This is the input of the IDF calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Corpus {
    /// number of documents added
    pub doc_num: u64,
    /// term -> number of documents containing it
    #[serde(with = "indexmap::map::serde_seq")]
    pub term_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_counts: IndexMap::new(),
        }
    }

    /// Add one document given as its distinct terms.
    /// Duplicates in `terms` must already be removed by the caller.
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        for term in terms {
            if let Some(count) = self.term_counts.get_mut(term.as_ref()) {
                *count += 1;
            } else {
                self.term_counts.insert(term.as_ref().into(), 1);
            }
        }
    }

    /// Add one document from its term counts
    pub fn add_doc(&mut self, freq: &TermFrequency) {
        self.add_set(&freq.term_set_ref_str());
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Number of documents containing `term`
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_counts.len()
    }

    /// Merge another corpus into self
    pub fn merge_corpus(&mut self, other: &Corpus) {
        for (term, &count_other) in other.term_counts.iter() {
            if let Some(count) = self.term_counts.get_mut(term) {
                *count += count_other;
            } else {
                self.term_counts.insert(term.clone(), count_other);
            }
        }
        self.doc_num += other.doc_num;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_documents_not_occurrences() {
        let mut corpus = Corpus::new();
        corpus.add_doc(&TermFrequency::from_text("the cat the cat"));
        corpus.add_doc(&TermFrequency::from_text("the dog"));
        assert_eq!(corpus.get_doc_num(), 2);
        assert_eq!(corpus.get_term_count("the"), 2);
        assert_eq!(corpus.get_term_count("cat"), 1);
        assert_eq!(corpus.get_term_count("bird"), 0);
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = Corpus::new();
        a.add_set(&["x", "y"]);
        let mut b = Corpus::new();
        b.add_set(&["y", "z"]);
        a.merge_corpus(&b);
        assert_eq!(a.get_doc_num(), 2);
        assert_eq!(a.get_term_count("y"), 2);
        assert_eq!(a.vocab_size(), 3);
    }
}
