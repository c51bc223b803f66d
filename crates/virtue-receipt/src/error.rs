//! Error types for verification.

use thiserror::Error;
use virtue_receipt_core::CoreError;

/// Errors that can occur outside the verification state machine.
///
/// Expected failure modes (tampering, broken chains, missing receipts) are
/// reported through [`crate::VerificationResult`], never as an `Err`.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Reading or hashing a document failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The receipt extractor failed unexpectedly.
    #[error("receipt extraction failed: {0}")]
    Extraction(String),

    /// Client configuration is incomplete or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The remote verification service failed.
    #[error("remote verification failed: {0}")]
    Remote(String),
}

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
