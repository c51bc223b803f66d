//! Golden test vectors for cross-implementation agreement.
//!
//! Issuers and verifiers hash shelf strings and chain payloads
//! independently, so any implementation must reproduce these values
//! exactly.

use virtue_receipt_core::{
    canon_amount2, compute_merkle_root, generate_chain_hash, hash_text, Digest, GovernanceLevel,
    ReceiptBuilder, ShelfField, GENESIS_HASH,
};

/// Amount normalization case.
#[derive(Debug, Clone, Copy)]
pub struct AmountVector {
    pub input: &'static str,
    pub expected: &'static str,
}

/// Shelf string case with the digest both parties should agree on.
#[derive(Debug, Clone, Copy)]
pub struct ShelfVector {
    pub field: ShelfField,
    pub input: &'static str,
    pub expected_shelf: &'static str,
    pub expected_sha256: &'static str,
}

/// One link of a golden chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainVector {
    pub document_id: &'static str,
    pub content: &'static [u8],
    pub timestamp: &'static str,
    pub governance: GovernanceLevel,
    pub expected_hash: &'static str,
    pub expected_chain_hash: &'static str,
}

/// Merkle root over the SHA-256 of each text leaf.
#[derive(Debug, Clone, Copy)]
pub struct MerkleVector {
    pub name: &'static str,
    pub leaves: &'static [&'static str],
    pub expected_root: &'static str,
}

pub fn amount_vectors() -> Vec<AmountVector> {
    let v = |input: &'static str, expected: &'static str| AmountVector { input, expected };
    vec![
        v("€ 1.234,50", "1234.50"),
        v("1,234.50", "1234.50"),
        v("", "0.00"),
        v("abc", "0.00"),
        v("100", "100.00"),
        v("12,5", "12.50"),
        v(".5", "0.50"),
        v("99.999", "100.00"),
        v("0,005", "0.01"),
        v("-12.345", "-12.35"),
        v("-0.001", "0.00"),
        v("USD 1 000 000", "1000000.00"),
        v("1.234.567,891", "1234567.89"),
        // A lone comma is always the decimal mark.
        v("1,234", "1.23"),
        // So repeated commas leave several decimal marks and nothing parses.
        v("1,234,567", "0.00"),
        v("9,999,999", "0.00"),
    ]
}

pub fn shelf_vectors() -> Vec<ShelfVector> {
    vec![
        ShelfVector {
            field: ShelfField::Iban,
            input: "de89 3704-0044 0532 0130 00",
            expected_shelf: "PAYTO|IBAN|DE89370400440532013000",
            expected_sha256: "fc4b83d6faad476176b8412d20d45e73fbbd97fcc5881b64e2c0ca2676c59e4f",
        },
        ShelfVector {
            field: ShelfField::Amount,
            input: "€ 1.234,50",
            expected_shelf: "AMOUNT|DEC|1234.50",
            expected_sha256: "0a44328e04d5fd729a28fdad413ec4cabf110883dae4a78c437f1ab8d5cea169",
        },
        ShelfVector {
            field: ShelfField::Currency,
            input: "euro",
            expected_shelf: "CURRENCY|ISO4217|EUR",
            expected_sha256: "ff40444602726af3d0ac7160f846a92ac72560c79581038f6696103c83114f81",
        },
        ShelfVector {
            field: ShelfField::Beneficiary,
            input: "  Acme   GmbH ",
            expected_shelf: "BENEFICIARY|NAME|ACME GMBH",
            expected_sha256: "cb4c422603d1f9a98814012b5a4cf1d0cfb28ee8499c21e353eb92ba9197cc4f",
        },
        ShelfVector {
            field: ShelfField::Reference,
            input: "inv-2024-001",
            expected_shelf: "REFERENCE|E2E|INV-2024-001",
            expected_sha256: "ac63d579478e6ee8bdd0c0c47156b17db52769662927dabdaf2a205f84b09608",
        },
    ]
}

/// Three links from genesis, in order.
pub fn chain_vectors() -> Vec<ChainVector> {
    vec![
        ChainVector {
            document_id: "INV-2024-001",
            content: b"Invoice INV-2024-001\nAmount: 1.234,50 EUR\n",
            timestamp: "2024-03-01T09:30:00Z",
            governance: GovernanceLevel::High,
            expected_hash: "f9e402b5e6500a35b2053e4acfa30fee4a5b8421cd54d04c75685510805dcb6b",
            expected_chain_hash: "1e793b1a8e13dcc8d3b5feea223c732490c9db8ef4468f541c839475ca8bf34c",
        },
        ChainVector {
            document_id: "INV-2024-002",
            content: b"Invoice INV-2024-002\nAmount: 99.99 USD\n",
            timestamp: "2024-03-02T10:00:00Z",
            governance: GovernanceLevel::Medium,
            expected_hash: "448899b394c0a7b5b83562780b674407db40d30eeaf6fe3d7d758f008503b745",
            expected_chain_hash: "632b68d007c1fa2effd9c2b56272c61431e962489e807b2819c99ce6c7d16f39",
        },
        ChainVector {
            document_id: "INV-2024-003",
            content: b"Invoice INV-2024-003\nAmount: 0,05 GBP\n",
            timestamp: "2024-03-03T11:15:00Z",
            governance: GovernanceLevel::Low,
            expected_hash: "f29bddbc02e6b9d1569f03a0c8e90323e0dc5ec81310a270e4812e1f146af735",
            expected_chain_hash: "fdaeac78eb3fcb4ed406d4ee7ecfe2fb142f450c560d8c6a3a2daca7db1c1a5e",
        },
    ]
}

pub fn merkle_vectors() -> Vec<MerkleVector> {
    vec![
        MerkleVector {
            name: "single leaf is its own root",
            leaves: &["a"],
            expected_root: "ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb",
        },
        MerkleVector {
            name: "pair",
            leaves: &["a", "b"],
            expected_root: "62af5c3cb8da3e4f25061e829ebeea5c7513c54949115b1acc225930a90154da",
        },
        MerkleVector {
            name: "odd leaf paired with itself",
            leaves: &["a", "b", "c"],
            expected_root: "0bdf27bf7ec894ca7cadfe491ec1a3ece840f117989e8c5e9bd7086467bf6c38",
        },
        MerkleVector {
            name: "balanced four",
            leaves: &["a", "b", "c", "d"],
            expected_root: "58c89d709329eb37285837b042ab6ff72c7c8f74de0446b091b6a0131c102cfd",
        },
        MerkleVector {
            name: "odd at two levels",
            leaves: &["a", "b", "c", "d", "e"],
            expected_root: "3615e586768e706351e326736e446554c49123d0e24c169d3ecf9b791a82636b",
        },
    ]
}

/// Leaf digests for a Merkle vector.
pub fn merkle_leaves(vector: &MerkleVector) -> Vec<String> {
    vector.leaves.iter().map(|l| hash_text(l).to_hex()).collect()
}

/// Check every vector, returning a description of each failure.
pub fn verify_all_vectors() -> Vec<String> {
    let mut failures = Vec::new();

    for v in amount_vectors() {
        let got = canon_amount2(v.input);
        if got != v.expected {
            failures.push(format!("amount {:?}: expected {}, got {got}", v.input, v.expected));
        }
    }

    for v in shelf_vectors() {
        let shelf = v.field.shelf(v.input);
        if shelf != v.expected_shelf {
            failures.push(format!(
                "shelf {:?}: expected {}, got {shelf}",
                v.input, v.expected_shelf
            ));
        }
        let digest = hash_text(&shelf).to_hex();
        if digest != v.expected_sha256 {
            failures.push(format!("shelf digest {}: got {digest}", v.expected_shelf));
        }
    }

    let mut prev = GENESIS_HASH.to_string();
    for v in chain_vectors() {
        let hash = Digest::of(v.content).to_hex();
        if hash != v.expected_hash {
            failures.push(format!("chain {} content hash: got {hash}", v.document_id));
        }
        let receipt = ReceiptBuilder::new(v.document_id, hash)
            .timestamp(v.timestamp)
            .governance(v.governance)
            .build();
        let chain_hash = generate_chain_hash(&prev, &receipt.chain_payload());
        if chain_hash != v.expected_chain_hash {
            failures.push(format!("chain {} link: got {chain_hash}", v.document_id));
        }
        prev = v.expected_chain_hash.to_string();
    }

    for v in merkle_vectors() {
        let root = compute_merkle_root(&merkle_leaves(&v));
        if root.as_deref() != Some(v.expected_root) {
            failures.push(format!("merkle {}: got {root:?}", v.name));
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtue_receipt_core::{verify_merkle_root, verify_receipt_chain, VirtueReceipt};

    #[test]
    fn test_all_vectors_pass() {
        let failures = verify_all_vectors();
        assert!(failures.is_empty(), "vector failures: {failures:#?}");
    }

    #[test]
    fn test_chain_vectors_form_a_chain() {
        let mut receipts: Vec<VirtueReceipt> = Vec::new();
        for v in chain_vectors() {
            let prev = receipts
                .last()
                .and_then(|r| r.chain_hash())
                .unwrap_or(GENESIS_HASH)
                .to_string();
            let receipt = ReceiptBuilder::new(v.document_id, v.expected_hash)
                .timestamp(v.timestamp)
                .governance(v.governance)
                .chained_to(prev)
                .build();
            assert_eq!(receipt.chain_hash(), Some(v.expected_chain_hash));
            receipts.push(receipt);
        }
        assert_eq!(verify_receipt_chain(&receipts), Ok(()));
    }

    #[test]
    fn test_merkle_vectors_reject_other_roots() {
        for v in merkle_vectors() {
            let leaves = merkle_leaves(&v);
            assert!(verify_merkle_root(&leaves, v.expected_root), "{}", v.name);
            assert!(!verify_merkle_root(&leaves, GENESIS_HASH), "{}", v.name);
        }
    }
}
