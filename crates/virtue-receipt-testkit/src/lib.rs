//! # Virtue Receipt Testkit
//!
//! Testing utilities for Virtue Receipt verification.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: shelf strings, amounts, chain links and Merkle
//!   roots with their expected digests
//! - **Generators**: Proptest strategies for receipts and JSON values
//! - **Fixtures**: documents with matching receipts, receipt chains and
//!   documents that embed their receipt
//!
//! ## Golden Vectors
//!
//! ```rust
//! use virtue_receipt_testkit::vectors::verify_all_vectors;
//!
//! let failures = verify_all_vectors();
//! assert!(failures.is_empty(), "{failures:?}");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use virtue_receipt_testkit::generators::{receipt_from_params, ReceiptParams};
//!
//! proptest! {
//!     #[test]
//!     fn chain_payload_is_stable(params: ReceiptParams) {
//!         let r1 = receipt_from_params(&params);
//!         let r2 = receipt_from_params(&params);
//!         prop_assert_eq!(r1.chain_payload(), r2.chain_payload());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use virtue_receipt_testkit::fixtures::ChainFixture;
//!
//! let chain = ChainFixture::new(3);
//! assert!(chain.receipts[0].is_genesis());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_payment, ChainFixture, DocumentFixture};
pub use generators::{receipt_from_params, ReceiptParams};
pub use vectors::{
    amount_vectors, chain_vectors, merkle_vectors, shelf_vectors, verify_all_vectors,
};
