//! The Verifier: document-level verification state machine.
//!
//! A verification starts `PENDING` and ends in exactly one terminal state.
//! Checks run in a fixed order and the first failing check decides:
//!
//! 1. read and hash the document (`ERROR` on I/O failure)
//! 2. extract the receipt (`NO_GOVERNANCE` when absent)
//! 3. structural validation (`INVALID`)
//! 4. receipt hash against document digest (`INVALID`, always fatal)
//! 5. chain link (`INVALID` when strict, a warning otherwise)
//! 6. `VERIFIED`
//!
//! Expected failures never surface as `Err`; they are recorded on the
//! returned [`VerificationResult`].

use std::path::Path;

use virtue_receipt_core::{validate_receipt, verify_chain_link, CoreError, Digest, VirtueReceipt};

use crate::config::VerifyConfig;
use crate::error::Result;
use crate::extract::{MarkerExtractor, ReceiptExtractor};
use crate::result::{VerificationResult, VerificationStatus, HASH_MISMATCH};

/// Hash a file without blocking the runtime.
pub async fn hash_file_async(path: impl AsRef<Path>) -> Result<Digest> {
    let bytes = read_document(path.as_ref()).await?;
    Ok(Digest::of(&bytes))
}

async fn read_document(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(bytes)
}

/// Verifies documents against their embedded receipts.
///
/// Holds no per-call state; configuration is supplied to each call.
#[derive(Debug, Clone, Default)]
pub struct Verifier<E = MarkerExtractor> {
    extractor: E,
}

impl Verifier<MarkerExtractor> {
    /// Create a verifier that scans documents for receipt markers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: ReceiptExtractor> Verifier<E> {
    /// Create a verifier with a custom extractor.
    pub fn with_extractor(extractor: E) -> Self {
        Self { extractor }
    }

    /// Get the extractor.
    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entry Points
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a document on disk.
    pub async fn verify_file(
        &self,
        path: impl AsRef<Path>,
        config: &VerifyConfig,
    ) -> VerificationResult {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "verifying document");

        match read_document(path).await {
            Ok(bytes) => self.verify_bytes(&bytes, config),
            Err(err) => {
                tracing::warn!(error = %err, "document unreadable");
                let mut result = VerificationResult::pending();
                result.errors.push(err.to_string());
                conclude(result, VerificationStatus::Error)
            }
        }
    }

    /// Verify a document already in memory.
    pub fn verify_bytes(&self, document: &[u8], config: &VerifyConfig) -> VerificationResult {
        let (mut result, digest) = start(document);

        let receipt = match self.extractor.extract(document) {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                tracing::debug!(document_hash = %digest, "no embedded receipt");
                return conclude(result, VerificationStatus::NoGovernance);
            }
            Err(err) => {
                tracing::warn!(error = %err, "receipt extractor failed");
                result.errors.push(err.to_string());
                return conclude(result, VerificationStatus::Error);
            }
        };

        check_receipt(result, digest, receipt, config)
    }

    /// Verify a document against a receipt that travelled separately.
    ///
    /// The extractor is not consulted.
    pub fn verify_with_receipt(
        &self,
        document: &[u8],
        receipt: VirtueReceipt,
        config: &VerifyConfig,
    ) -> VerificationResult {
        let (result, digest) = start(document);
        check_receipt(result, digest, receipt, config)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Checks
// ─────────────────────────────────────────────────────────────────────────────

/// Hash the document into a fresh pending result.
fn start(document: &[u8]) -> (VerificationResult, Digest) {
    let digest = Digest::of(document);
    let mut result = VerificationResult::pending();
    result.document_hash = Some(digest);
    (result, digest)
}

fn check_receipt(
    mut result: VerificationResult,
    digest: Digest,
    receipt: VirtueReceipt,
    config: &VerifyConfig,
) -> VerificationResult {
    let status = evaluate(&mut result, digest, &receipt, config);
    result.receipt = Some(receipt);
    conclude(result, status)
}

/// Run steps 3 to 6 and return the terminal state they reach.
fn evaluate(
    result: &mut VerificationResult,
    digest: Digest,
    receipt: &VirtueReceipt,
    config: &VerifyConfig,
) -> VerificationStatus {
    let structural = validate_receipt(receipt);
    if !structural.is_empty() {
        tracing::debug!(count = structural.len(), "receipt failed structural validation");
        result.errors.extend(structural.iter().map(ToString::to_string));
        return VerificationStatus::Invalid;
    }

    let computed = digest.to_hex();
    let declared = receipt.hash().unwrap_or_default().to_ascii_lowercase();
    if declared != computed {
        tracing::warn!(
            document_id = receipt.document_id().unwrap_or_default(),
            declared = %declared,
            computed = %computed,
            "document hash mismatch"
        );
        result.errors.push(format!(
            "{HASH_MISMATCH}: receipt declares {declared}, document hashes to {computed}"
        ));
        return VerificationStatus::Invalid;
    }

    match check_chain(receipt) {
        Ok(()) => result.chain_intact = true,
        Err(message) => {
            tracing::warn!(strict = config.strict_chain, %message, "chain verification failed");
            result.chain_intact = false;
            if config.strict_chain {
                result.errors.push(message);
                return VerificationStatus::Invalid;
            }
            result.warnings.push(message);
        }
    }

    result.governance_level = receipt.governance();
    result.isp_profile = receipt.isp_profile().map(str::to_string);
    VerificationStatus::Verified
}

/// Check the receipt's own chain link.
///
/// A receipt without chain data is intact. A receipt with only one half of
/// the link is not.
fn check_chain(receipt: &VirtueReceipt) -> std::result::Result<(), String> {
    match (receipt.prev_hash(), receipt.chain_hash()) {
        (None, None) => Ok(()),
        (Some(prev), Some(chain)) => {
            let expected = chain.to_ascii_lowercase();
            if verify_chain_link(prev, &receipt.chain_payload(), &expected) {
                Ok(())
            } else {
                Err(format!(
                    "chain hash mismatch: chain_hash {chain} does not match \
                     prev_hash and receipt contents"
                ))
            }
        }
        (Some(_), None) => {
            Err("incomplete chain link: prev_hash present without chain_hash".into())
        }
        (None, Some(_)) => {
            Err("incomplete chain link: chain_hash present without prev_hash".into())
        }
    }
}

fn conclude(result: VerificationResult, status: VerificationStatus) -> VerificationResult {
    let result = result.finish(status);
    tracing::debug!(
        status = %result.status,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "verification complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerifyError;
    use crate::extract::StaticExtractor;
    use virtue_receipt_core::{GovernanceLevel, ReceiptBuilder, GENESIS_HASH};

    const DOC: &[u8] = b"Invoice INV-7: 1.234,50 EUR to DE89370400440532013000";

    fn receipt_for(doc: &[u8]) -> ReceiptBuilder {
        ReceiptBuilder::new("INV-7", Digest::of(doc).to_hex())
            .timestamp("2024-03-01T09:30:00Z")
            .governance(GovernanceLevel::Medium)
            .isp_profile("bank-eu")
    }

    struct FailingExtractor;

    impl ReceiptExtractor for FailingExtractor {
        fn extract(&self, _document: &[u8]) -> Result<Option<VirtueReceipt>> {
            Err(VerifyError::Extraction("container is corrupt".into()))
        }
    }

    #[test]
    fn test_verified_without_chain() {
        let verifier = Verifier::new();
        let result =
            verifier.verify_with_receipt(DOC, receipt_for(DOC).build(), &VerifyConfig::default());

        assert_eq!(result.status, VerificationStatus::Verified);
        assert!(result.verified);
        assert!(result.chain_intact);
        assert!(result.errors.is_empty());
        assert_eq!(result.governance_level, Some(GovernanceLevel::Medium));
        assert_eq!(result.isp_profile.as_deref(), Some("bank-eu"));
        assert_eq!(result.document_hash, Some(Digest::of(DOC)));
        assert!(result.completed_at.is_some());
    }

    #[test]
    fn test_verified_with_genesis_chain() {
        let receipt = receipt_for(DOC).chained_to(GENESIS_HASH).build();
        let result = Verifier::new().verify_with_receipt(DOC, receipt, &VerifyConfig::strict());
        assert_eq!(result.status, VerificationStatus::Verified);
        assert!(result.chain_intact);
    }

    #[test]
    fn test_uppercase_hash_accepted() {
        let mut receipt = receipt_for(DOC).build();
        receipt.hash = receipt.hash.map(|h| h.to_uppercase());
        let result = Verifier::new().verify_with_receipt(DOC, receipt, &VerifyConfig::default());
        assert_eq!(result.status, VerificationStatus::Verified);
    }

    #[test]
    fn test_hash_mismatch_is_fatal() {
        let receipt = receipt_for(b"original").chained_to(GENESIS_HASH).build();
        for config in [VerifyConfig::lenient(), VerifyConfig::strict()] {
            let result = Verifier::new().verify_with_receipt(DOC, receipt.clone(), &config);
            assert_eq!(result.status, VerificationStatus::Invalid);
            assert!(!result.verified);
            assert!(result.has_hash_mismatch());
        }
    }

    #[test]
    fn test_structural_errors_before_hash() {
        let mut receipt = receipt_for(b"other").build();
        receipt.timestamp = None;
        let result = Verifier::new().verify_with_receipt(DOC, receipt, &VerifyConfig::default());
        assert_eq!(result.status, VerificationStatus::Invalid);
        assert_eq!(result.errors, vec!["missing required field: timestamp".to_string()]);
        assert!(result.receipt.is_some());
    }

    #[test]
    fn test_broken_chain_strict_vs_lenient() {
        let mut receipt = receipt_for(DOC).chained_to(GENESIS_HASH).build();
        receipt.chain_hash = Some("0".repeat(64));

        let strict =
            Verifier::new().verify_with_receipt(DOC, receipt.clone(), &VerifyConfig::strict());
        assert_eq!(strict.status, VerificationStatus::Invalid);
        assert!(!strict.chain_intact);
        assert_eq!(strict.errors.len(), 1);

        let lenient = Verifier::new().verify_with_receipt(DOC, receipt, &VerifyConfig::lenient());
        assert_eq!(lenient.status, VerificationStatus::Verified);
        assert!(!lenient.chain_intact);
        assert!(lenient.errors.is_empty());
        assert_eq!(lenient.warnings.len(), 1);
    }

    #[test]
    fn test_half_chain_link() {
        let mut receipt = receipt_for(DOC).build();
        receipt.prev_hash = Some(GENESIS_HASH.to_string());

        let result = Verifier::new().verify_with_receipt(DOC, receipt, &VerifyConfig::lenient());
        assert_eq!(result.status, VerificationStatus::Verified);
        assert!(!result.chain_intact);
        assert!(result.warnings[0].contains("incomplete chain link"));
    }

    #[test]
    fn test_no_governance() {
        let verifier = Verifier::with_extractor(StaticExtractor::none());
        let result = verifier.verify_bytes(DOC, &VerifyConfig::default());
        assert_eq!(result.status, VerificationStatus::NoGovernance);
        assert!(!result.verified);
        assert!(result.errors.is_empty());
        assert!(result.completed_at.is_some());
    }

    #[test]
    fn test_extractor_failure_is_error() {
        let result =
            Verifier::with_extractor(FailingExtractor).verify_bytes(DOC, &VerifyConfig::default());
        assert_eq!(result.status, VerificationStatus::Error);
        assert!(result.errors[0].contains("container is corrupt"));
        assert!(result.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Verifier::new()
            .verify_file(dir.path().join("absent.pdf"), &VerifyConfig::default())
            .await;
        assert_eq!(result.status, VerificationStatus::Error);
        assert!(result.errors[0].contains("absent.pdf"));
        assert!(result.document_hash.is_none());
        assert!(result.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_hash_file_async_matches_sync() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, DOC).unwrap();

        let digest = hash_file_async(&path).await.unwrap();
        assert_eq!(digest, virtue_receipt_core::hash_file(&path).unwrap());
        let err = hash_file_async(dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, VerifyError::Core(CoreError::Io { .. })));
        assert!(err.to_string().contains("nope"));
    }
}
