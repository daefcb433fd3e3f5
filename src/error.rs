//! Error types for the engine.
//!
//! Almost every operation in this crate degrades to a neutral value instead of failing
//! (empty vector, similarity 0.0, trend `stable`). The variants below are only produced by
//! the checked `try_*` entry points and by the snapshot/config codecs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// `transform` was called on a vectorizer that never saw `fit`
    #[error("vectorizer has not been fitted")]
    NotFitted,

    /// search was called on a skill index that was never built
    #[error("skill index has not been built")]
    IndexNotBuilt,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_cbor::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        EngineError::InvalidArgument(msg.into())
    }
}
