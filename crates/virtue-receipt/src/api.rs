//! Remote verification contract.
//!
//! These types mirror the JSON exchanged with the remote verification
//! service. The transport is pluggable through [`RemoteVerifier`]; no HTTP
//! client ships with this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use virtue_receipt_core::{CoreError, Digest, VirtueReceipt};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::result::{VerificationResult, VerificationStatus};

/// Depth of verification requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofLevel {
    L1,
    L2,
    L3,
}

/// Depth of verification the service reports having achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrustLevel {
    L1,
    L2,
    L3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Valid,
    Suspect,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Integrity {
    Intact,
    Modified,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssuerStatus {
    Trusted,
    Unknown,
    Revoked,
}

/// Request body for the verify endpoint.
///
/// Only the document's digest is sent, never its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub document_id: String,
    /// URN form, `sha256:<hex>`.
    pub document_hash: String,
    pub issuer_key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_level: Option<ProofLevel>,
}

impl VerifyRequest {
    pub fn new(document_id: impl Into<String>, digest: &Digest, config: &ClientConfig) -> Self {
        Self {
            document_id: document_id.into(),
            document_hash: digest.to_urn(),
            issuer_key_id: config.issuer_key_id().to_string(),
            manifest_id: None,
            proof_level: None,
        }
    }

    /// Build a request from a receipt's identifier and declared hash.
    pub fn for_receipt(receipt: &VirtueReceipt, config: &ClientConfig) -> Result<Self> {
        let document_id = receipt
            .document_id()
            .ok_or_else(|| CoreError::MalformedReceipt("receipt has no document_id".into()))?;
        let hash = receipt
            .hash()
            .ok_or_else(|| CoreError::MalformedReceipt("receipt has no hash".into()))?;
        let digest = Digest::from_urn(hash)?;
        Ok(Self::new(document_id, &digest, config))
    }

    pub fn with_manifest(mut self, manifest_id: impl Into<String>) -> Self {
        self.manifest_id = Some(manifest_id.into());
        self
    }

    pub fn with_proof_level(mut self, level: ProofLevel) -> Self {
        self.proof_level = Some(level);
        self
    }
}

/// Response body from the verify endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub verdict: Verdict,
    pub integrity: Integrity,
    pub trust_level: TrustLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_status: Option<IssuerStatus>,
    /// Named checks performed by the service, such as `signature_valid`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checks: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl VerifyResponse {
    /// Boolean outcome of a named check, if the service reported one.
    pub fn check(&self, name: &str) -> Option<bool> {
        self.checks.get(name).and_then(Value::as_bool)
    }

    /// Signature verification is performed remotely; this is its outcome.
    pub fn signature_valid(&self) -> Option<bool> {
        self.check("signature_valid")
    }

    pub fn is_revoked(&self) -> bool {
        self.issuer_status == Some(IssuerStatus::Revoked)
    }
}

/// Transport to the remote verification service.
#[async_trait]
pub trait RemoteVerifier: Send + Sync {
    /// Submit a verify request.
    async fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse>;
}

/// What an institution should do with a payment document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentDecision {
    Allow,
    Hold,
    Block,
}

impl PaymentDecision {
    /// Decide from the remote service's answer.
    ///
    /// Any negative signal blocks; only a valid, intact document from a
    /// non-revoked issuer is allowed.
    pub fn from_response(response: &VerifyResponse) -> Self {
        if response.verdict == Verdict::Invalid
            || response.integrity == Integrity::Modified
            || response.is_revoked()
        {
            return PaymentDecision::Block;
        }
        if response.verdict == Verdict::Valid && response.integrity == Integrity::Intact {
            return PaymentDecision::Allow;
        }
        PaymentDecision::Hold
    }

    /// Decide from a local verification.
    pub fn from_result(result: &VerificationResult) -> Self {
        match result.status {
            VerificationStatus::Verified if result.chain_intact => PaymentDecision::Allow,
            VerificationStatus::Invalid => PaymentDecision::Block,
            VerificationStatus::Verified
            | VerificationStatus::NoGovernance
            | VerificationStatus::Error
            | VerificationStatus::Pending => PaymentDecision::Hold,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentDecision::Allow => "ALLOW",
            PaymentDecision::Hold => "HOLD",
            PaymentDecision::Block => "BLOCK",
        }
    }
}

impl fmt::Display for PaymentDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ask the remote service about a receipt and turn the answer into a decision.
pub async fn decide_remote<R: RemoteVerifier + ?Sized>(
    remote: &R,
    request: &VerifyRequest,
) -> Result<PaymentDecision> {
    let response = remote.verify(request).await?;
    let decision = PaymentDecision::from_response(&response);
    tracing::debug!(
        document_id = %request.document_id,
        verdict = ?response.verdict,
        integrity = ?response.integrity,
        %decision,
        "remote verification decided"
    );
    Ok(decision)
}
