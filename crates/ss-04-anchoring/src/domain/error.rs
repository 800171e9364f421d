//! Anchoring errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("Content store error: {0}")]
    Storage(String),

    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("Contract call {method} failed: {reason}")]
    Contract { method: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AnchorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
