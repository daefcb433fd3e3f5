//! This crate is a small statistical engine for ranking and risk assessment:
//! TF-IDF text similarity, Beta-Bernoulli success estimation, temporal decay and
//! Mann-Kendall trend detection, plus the consumers built on top of them
//! (skill search, project memory, skill tracking, health reporting).
pub mod config;
pub mod error;
pub mod health;
pub mod integration;
pub mod memory;
pub mod skills;
pub mod stats;
pub mod vectorizer;

/// TF-IDF Vectorizer
/// The top-level text model of this crate.
/// `fit` builds IDF weights from a training corpus once; `transform` then projects
/// any text onto that vocabulary as a sparse TF-IDF vector.
///
/// `TFIDFVectorizer<E>` is generic over its weighting engine `E`
/// (`DefaultTFIDFEngine` unless specified).
///
/// # Thread Safety
/// `transform` only reads the IDF table, so a fitted vectorizer can be shared
/// across threads for concurrent queries.
///
/// # Serialization
/// Use `TFIDFData` (via `to_data`) to persist a fitted vectorizer.
pub use vectorizer::TFIDFVectorizer;

/// TF-IDF Vectorizer Data Structure for Serialization
/// A snapshot of the fitted IDF table. CBOR encoding is provided by
/// `to_cbor`/`from_cbor`; convert back with `into_tf_idf_vectorizer`.
pub use vectorizer::serde::TFIDFData;

/// Fitted IDF weights and training document count
pub use vectorizer::IDFVector;

/// Corpus statistics
/// Tracks the number of documents and, per term, how many documents contain it.
/// It is the base data for IDF calculation. It does not keep document text.
pub use vectorizer::corpus::Corpus;

/// Term Frequency structure
/// Counts of each term within one document and the total number of terms.
/// Used as base data for TF calculation.
pub use vectorizer::term::TermFrequency;

/// TF IDF Calculation Engine Trait
/// Plug a different weighting scheme into `TFIDFVectorizer<E>` by implementing it.
/// `DefaultTFIDFEngine` uses relative term frequency and smoothed IDF,
/// `SublinearTFIDFEngine` dampens repeated terms with `1 + ln(tf)`.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, SublinearTFIDFEngine, TFIDFEngine};

/// Sparse vectors and their similarity
pub use vectorizer::compare::{cosine_similarity, Compare, DefaultCompare, SparseVec};

/// Text normalization into unigram and bigram terms
pub use vectorizer::tokenizer::tokenize;

/// Search Hits and Hit Entry structures
/// - `Hits`: ranked results with sorting, truncation and rescaling helpers
/// - `HitEntry`: a single result, key and score
pub use vectorizer::evaluate::scoring::{HitEntry, Hits};

/// Beta-Bernoulli success estimation
pub use stats::bayesian::{BayesianEstimator, BetaSummary};

/// Exponential decay of aged observations
pub use stats::decay::{temporal_decay, weighted_score};

/// Mann-Kendall monotonic trend detection
pub use stats::trend::{mann_kendall_test, mann_kendall_trend, MannKendall, Trend, TrendResult};

pub use config::EngineConfig;
pub use error::{EngineError, Result};

pub use health::{generate_health_report, HealthReport, HealthReporter, ProjectHistory, RiskLevel};
pub use integration::{fail_open, IntelligenceHub};
pub use memory::{MemoryEntry, RelevanceStore, Section};
pub use skills::{SemanticSkillIndex, SkillOutcome, SkillStat, SkillTracker, StatsSource};
