//! Verification outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use virtue_receipt_core::{Digest, GovernanceLevel, VirtueReceipt};

/// State of a document verification.
///
/// `Pending` is the initial state; every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Invalid,
    Error,
    NoGovernance,
}

impl VerificationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Invalid => "INVALID",
            VerificationStatus::Error => "ERROR",
            VerificationStatus::NoGovernance => "NO_GOVERNANCE",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    pub status: VerificationStatus,
    /// Digest of the document bytes, once computed.
    pub document_hash: Option<Digest>,
    pub receipt: Option<VirtueReceipt>,
    pub governance_level: Option<GovernanceLevel>,
    pub isp_profile: Option<String>,
    pub chain_intact: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Set when the result reaches a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
}

impl VerificationResult {
    /// A fresh result in the `Pending` state.
    pub fn pending() -> Self {
        Self {
            verified: false,
            status: VerificationStatus::Pending,
            document_hash: None,
            receipt: None,
            governance_level: None,
            isp_profile: None,
            chain_intact: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            completed_at: None,
        }
    }

    /// Move to a terminal state and stamp the completion time.
    pub(crate) fn finish(mut self, status: VerificationStatus) -> Self {
        self.status = status;
        self.verified = status == VerificationStatus::Verified;
        self.completed_at = Some(Utc::now());
        self
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Whether any error mentions a content hash mismatch.
    pub fn has_hash_mismatch(&self) -> bool {
        self.errors.iter().any(|e| e.starts_with(HASH_MISMATCH))
    }
}

/// Prefix of the error recorded when the receipt's hash does not match the
/// document.
pub const HASH_MISMATCH: &str = "hash mismatch";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&VerificationStatus::NoGovernance).unwrap();
        assert_eq!(json, "\"NO_GOVERNANCE\"");
        assert_eq!(VerificationStatus::Verified.to_string(), "VERIFIED");
        assert!(!VerificationStatus::Pending.is_terminal());
        assert!(VerificationStatus::Error.is_terminal());
    }

    #[test]
    fn test_finish_stamps_completion() {
        let result = VerificationResult::pending();
        assert!(result.completed_at.is_none());

        let done = result.finish(VerificationStatus::Verified);
        assert!(done.verified);
        assert!(done.completed_at.is_some());

        let failed = VerificationResult::pending().finish(VerificationStatus::Invalid);
        assert!(!failed.verified);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let mut result = VerificationResult::pending();
        result.chain_intact = true;
        let value = serde_json::to_value(result.finish(VerificationStatus::NoGovernance)).unwrap();
        assert_eq!(value["status"], "NO_GOVERNANCE");
        assert_eq!(value["chainIntact"], true);
        assert!(value.get("completedAt").is_some());
        assert!(value.get("documentHash").is_some());
    }
}
