/// TF-IDF calculation engine.
///
/// Plugs the weighting formulas into `TFIDFVectorizer<E>`.
/// Implementations must keep `idf` finite and non-negative, and strictly
/// decreasing in `doc_freq` for a fixed `doc_num`.
pub trait TFIDFEngine {
    /// IDF of a term found in `doc_freq` of `doc_num` documents
    fn idf(doc_num: u64, doc_freq: u64) -> f64;
    /// TF of a term seen `count` times among `total` terms
    fn tf(count: u64, total: u64) -> f64;
}

/// Default TF-IDF engine
///
/// - idf = ln((N + 1) / (df + 1)) + 1
/// - tf = count / total
///
/// The +1 smoothing keeps a term present in every document at weight 1.0
/// instead of 0, and a corpus of one document well defined.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl DefaultTFIDFEngine {
    pub fn new() -> Self {
        DefaultTFIDFEngine
    }
}

impl TFIDFEngine for DefaultTFIDFEngine {
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        ((doc_num as f64 + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0
    }

    #[inline]
    fn tf(count: u64, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        count as f64 / total as f64
    }
}

/// Sublinear TF variant
///
/// - idf: same as `DefaultTFIDFEngine`
/// - tf = 1 + ln(count), 0 for absent terms
///
/// Damps repeated terms in long texts such as log messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SublinearTFIDFEngine;

impl TFIDFEngine for SublinearTFIDFEngine {
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        DefaultTFIDFEngine::idf(doc_num, doc_freq)
    }

    #[inline]
    fn tf(count: u64, _total: u64) -> f64 {
        if count == 0 {
            return 0.0;
        }
        1.0 + (count as f64).ln()
    }
}
