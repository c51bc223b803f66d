//! # Virtue Receipt
//!
//! Document verification against Virtue Receipts: hash-level integrity
//! plus a governance classification, without sending document content
//! anywhere.
//!
//! ## Overview
//!
//! - **Verifier**: runs the verification state machine over a document
//! - **Extraction**: locates the receipt embedded in a document
//! - **Remote contract**: request/response types for the verification
//!   service and the payment decision derived from them
//!
//! ## Usage
//!
//! ```rust,no_run
//! use virtue_receipt::{PaymentDecision, Verifier, VerifyConfig};
//!
//! async fn example() {
//!     let verifier = Verifier::new();
//!     let result = verifier
//!         .verify_file("invoice.pdf", &VerifyConfig::strict())
//!         .await;
//!
//!     match PaymentDecision::from_result(&result) {
//!         PaymentDecision::Allow => println!("verified: {:?}", result.governance_level),
//!         decision => println!("{decision}: {:?}", result.errors),
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! `virtue_receipt::core` is the primitives crate (digests, canonical
//! JSON, shelf strings, chains, validation).

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod result;
pub mod verifier;

pub use virtue_receipt_core as core;

pub use api::{
    decide_remote, Integrity, IssuerStatus, PaymentDecision, ProofLevel, RemoteVerifier,
    TrustLevel, Verdict, VerifyRequest, VerifyResponse,
};
pub use config::{ClientConfig, VerifyConfig};
pub use error::{Result, VerifyError};
pub use extract::{MarkerExtractor, ReceiptExtractor, StaticExtractor};
pub use result::{VerificationResult, VerificationStatus};
pub use verifier::{hash_file_async, Verifier};

pub use virtue_receipt_core::{
    Digest, GovernanceLevel, PaymentFields, ReceiptBuilder, ShelfField, VirtueReceipt,
    GENESIS_HASH,
};
