//! # Virtue Receipt Core
//!
//! Pure primitives for verifying Virtue Receipts: digests, canonical
//! serialization, payment-field shelves, hash chains and receipt validation.
//!
//! This crate does no networking and no async work. The only I/O is
//! [`hash_file`], which reads a file once and closes it.
//!
//! ## Key Types
//!
//! - [`Digest`] - SHA-256 value with hex and URN forms
//! - [`VirtueReceipt`] - The governance record carried by a document
//! - [`GovernanceLevel`] - `HIGH`, `MEDIUM` or `LOW`
//! - [`PaymentFields`] - Payment data normalized into shelf strings
//!
//! ## Canonicalization
//!
//! Structured data is hashed through [`canonicalize_json`], which sorts
//! object keys and drops whitespace so that equal values hash equally.

pub mod canonical;
pub mod chain;
pub mod digest;
pub mod error;
pub mod receipt;
pub mod shelf;
pub mod validation;

pub use canonical::{canonical_digest, canonicalize_json, canonicalize_str};
pub use chain::{
    compute_merkle_root, generate_chain_hash, verify_chain_link, verify_merkle_root,
    verify_receipt_chain, GENESIS_HASH,
};
pub use digest::{hash_file, hash_text, is_hex_digest, Digest};
pub use error::{ChainError, CoreError, ValidationError};
pub use receipt::{GovernanceLevel, ReceiptBuilder, VirtueReceipt};
pub use shelf::{
    canon_amount2, canon_currency, canon_iban, canon_text, canon_text_upper, shelf_amount,
    shelf_beneficiary, shelf_currency, shelf_iban, shelf_reference, PaymentFields, ShelfField,
};
pub use validation::{is_structurally_valid, parse_timestamp, validate_receipt};
