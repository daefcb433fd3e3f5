use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vectorizer::{tfidf::TFIDFEngine, IDFVector, TFIDFVectorizer};

/// Serializable snapshot of a fitted `TFIDFVectorizer`.
///
/// The engine type is not stored; the caller picks it again when converting back
/// with `into_tf_idf_vectorizer`. Storing the bytes is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TFIDFData {
    /// IDF table
    pub idf: IDFVector,
}

impl TFIDFData {
    /// Convert back into a ready-to-use vectorizer
    pub fn into_tf_idf_vectorizer<E>(self) -> TFIDFVectorizer<E>
    where
        E: TFIDFEngine,
    {
        TFIDFVectorizer::from_idf(self.idf)
    }

    /// Encode as CBOR
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode from CBOR
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

impl<E> TFIDFVectorizer<E>
where
    E: TFIDFEngine,
{
    /// Snapshot of the fitted state, `None` before `fit`
    pub fn to_data(&self) -> Option<TFIDFData> {
        if !self.is_fitted() {
            return None;
        }
        Some(TFIDFData { idf: self.idf.clone() })
    }
}
