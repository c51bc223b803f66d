//! Hash-chain and Merkle-root integrity checks.
//!
//! Every hash here is `SHA-256(left || right)` over the UTF-8 text of its
//! inputs, rendered as lowercase hex. Inputs are concatenated without any
//! length prefix; other implementations depend on this exact layout.

use sha2::{Digest as _, Sha256};

use crate::error::ChainError;
use crate::receipt::VirtueReceipt;

/// `prev_hash` of the first link in any chain.
pub const GENESIS_HASH: &str =
    "00000000000000000000000000000000000000000000000000000000000000000000";

/// Hash of `left || right`, as lowercase hex.
fn hash_pair(left: &str, right: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the chain hash of a link: `H(prev || payload)`.
pub fn generate_chain_hash(prev: &str, payload: &str) -> String {
    hash_pair(prev, payload)
}

/// Recompute a link's hash and compare it with `expected`.
pub fn verify_chain_link(prev: &str, payload: &str, expected: &str) -> bool {
    generate_chain_hash(prev, payload) == expected
}

/// Fold an ordered list of leaf digests into a Merkle root.
///
/// Returns `None` for no leaves. A single leaf is its own root with no
/// hashing applied. At every level with an odd count the last element is
/// paired with itself.
pub fn compute_merkle_root<S: AsRef<str>>(leaves: &[S]) -> Option<String> {
    let mut level: Vec<String> = leaves.iter().map(|l| l.as_ref().to_string()).collect();
    if level.is_empty() {
        return None;
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                hash_pair(left, right)
            })
            .collect();
    }

    level.pop()
}

/// Check an ordered list of leaf digests against an expected root.
///
/// An empty list is never valid.
pub fn verify_merkle_root<S: AsRef<str>>(leaves: &[S], expected_root: &str) -> bool {
    compute_merkle_root(leaves).map_or(false, |root| root == expected_root)
}

/// Walk an ordered sequence of receipts from genesis.
///
/// Each receipt must carry chain data, link to its predecessor's
/// `chain_hash` (the first one to [`GENESIS_HASH`]), and have a
/// `chain_hash` that recomputes from its own core fields.
pub fn verify_receipt_chain(receipts: &[VirtueReceipt]) -> Result<(), ChainError> {
    let mut expected_prev = GENESIS_HASH.to_string();

    for (index, receipt) in receipts.iter().enumerate() {
        let (prev, chain) = match (receipt.prev_hash(), receipt.chain_hash()) {
            (Some(prev), Some(chain)) => (prev, chain),
            _ => return Err(ChainError::MissingLink { index }),
        };

        if prev != expected_prev {
            return Err(ChainError::BrokenLink {
                index,
                expected: expected_prev,
                got: prev.to_string(),
            });
        }

        if !verify_chain_link(prev, &receipt.chain_payload(), chain) {
            return Err(ChainError::HashMismatch { index });
        }

        expected_prev = chain.to_string();
    }

    Ok(())
}
