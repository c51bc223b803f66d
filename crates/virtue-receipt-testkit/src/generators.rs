//! Proptest generators for property-based testing.

use chrono::{DateTime, SecondsFormat};
use proptest::prelude::*;
use serde_json::Value;

use virtue_receipt_core::{Digest, GovernanceLevel, ReceiptBuilder, VirtueReceipt, GENESIS_HASH};

/// Generate a random lowercase hex digest.
pub fn hex_digest() -> impl Strategy<Value = String> {
    any::<[u8; 32]>().prop_map(|bytes| Digest::from_bytes(bytes).to_hex())
}

/// Generate a governance level.
pub fn governance_level() -> impl Strategy<Value = GovernanceLevel> {
    prop_oneof![
        Just(GovernanceLevel::High),
        Just(GovernanceLevel::Medium),
        Just(GovernanceLevel::Low),
    ]
}

/// Generate an RFC 3339 timestamp between 1970 and 2100.
pub fn timestamp() -> impl Strategy<Value = String> {
    (0i64..=4_102_444_800i64).prop_filter_map("timestamp out of range", |secs| {
        DateTime::from_timestamp(secs, 0).map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    })
}

/// Generate a document identifier.
pub fn document_id() -> impl Strategy<Value = String> {
    "[A-Z]{3}-[0-9]{4}-[0-9]{3}".prop_map(String::from)
}

/// Generate document content of at most `max_len` bytes.
pub fn content(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate an arbitrary JSON value with nested arrays and objects.
pub fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 éß\"\\\\]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Parameters for generating a receipt over a document.
#[derive(Debug, Clone)]
pub struct ReceiptParams {
    pub document_id: String,
    pub content: Vec<u8>,
    pub timestamp: String,
    pub governance: GovernanceLevel,
    pub isp_profile: Option<String>,
    pub chained: bool,
}

impl Arbitrary for ReceiptParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            document_id(),
            content(512),
            timestamp(),
            governance_level(),
            proptest::option::of("[a-z]{2,8}-[a-z]{2}"),
            any::<bool>(),
        )
            .prop_map(|(document_id, content, timestamp, governance, isp_profile, chained)| {
                ReceiptParams {
                    document_id,
                    content,
                    timestamp,
                    governance,
                    isp_profile,
                    chained,
                }
            })
            .boxed()
    }
}

/// Build a receipt matching the parameters' document.
///
/// Chained receipts link to genesis.
pub fn receipt_from_params(params: &ReceiptParams) -> VirtueReceipt {
    let mut builder = ReceiptBuilder::new(
        params.document_id.clone(),
        Digest::of(&params.content).to_hex(),
    )
    .timestamp(params.timestamp.clone())
    .governance(params.governance);

    if let Some(profile) = &params.isp_profile {
        builder = builder.isp_profile(profile.clone());
    }
    if params.chained {
        builder = builder.chained_to(GENESIS_HASH);
    }

    builder.build()
}
