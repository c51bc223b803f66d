//! Error types for the Virtue Receipt core.

use thiserror::Error;

/// Core errors that can occur while hashing or decoding receipts.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed digest: {0}")]
    MalformedDigest(String),

    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("malformed receipt: {0}")]
    MalformedReceipt(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Structural validation errors for a receipt.
///
/// The `Display` output of each variant is the message surfaced to callers
/// in a verification result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid hash format: expected 64 hex characters, got '{0}'")]
    InvalidHashFormat(String),

    #[error("invalid governance level: '{0}' (expected HIGH, MEDIUM or LOW)")]
    InvalidGovernanceLevel(String),

    #[error("invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

/// Errors raised while walking a sequence of chained receipts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("receipt {index} has no chain data")]
    MissingLink { index: usize },

    #[error("receipt {index} breaks the chain: expected prev_hash {expected}, got {got}")]
    BrokenLink {
        index: usize,
        expected: String,
        got: String,
    },

    #[error("receipt {index} chain_hash does not match its contents")]
    HashMismatch { index: usize },
}
