//! Error type shared by every stage of circuit input compilation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CircuitInputError>;

/// Every failure is terminal for the compilation that raised it; none of
/// them are transient.
#[derive(Debug, Error)]
pub enum CircuitInputError {
    /// Decompression or hex decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Wrong length, missing tag or prefix.
    #[error("format error: {0}")]
    Format(String),

    /// Semantic field checks on a decoded document.
    #[error("validation failed: {rule}")]
    Validation { rule: String },

    #[error("document expired: expiry {expiry} is before reference time {reference}")]
    ExpiredDocument { expiry: String, reference: String },

    /// A value does not fit the declared word width x count, or a padding
    /// target is too small for the message.
    #[error("encoding capacity exceeded: {0}")]
    EncodingCapacity(String),

    /// Schema/depth mismatch in the template tree. Never retried.
    #[error("template tree invariant violated: {0}")]
    TreeInvariant(String),

    #[error("public signal count mismatch: expected {expected}, got {got}")]
    SignalCountMismatch { expected: usize, got: usize },

    #[error("failed to parse public signal {field}: '{value}'")]
    SignalParse { field: &'static str, value: String },

    #[error("invalid identifier: {0}")]
    IdentifierFormat(String),

    #[error("invalid public key: {0}")]
    KeyFormat(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unknown circuit id: {0}")]
    UnknownCircuit(String),
}

impl CircuitInputError {
    pub(crate) fn validation(rule: impl Into<String>) -> Self {
        CircuitInputError::Validation { rule: rule.into() }
    }
}

impl From<serde_json::Error> for CircuitInputError {
    fn from(err: serde_json::Error) -> Self {
        CircuitInputError::Serialization(err.to_string())
    }
}
