//! Virtue Receipt: the governance record attached to a document.
//!
//! Receipts are created upstream when a document is issued and are only
//! read here. Every field is optional at the type level so that structural
//! validation can report exactly which required fields are missing instead
//! of failing deserialization. Mistyped fields are kept as text for the same
//! reason: a receipt with `"governance_level": 1` is found and then rejected,
//! not mistaken for a document without governance.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::canonical::canonicalize_json;
use crate::chain::{generate_chain_hash, GENESIS_HASH};
use crate::error::{CoreError, ValidationError};

/// Oversight classification of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GovernanceLevel {
    High,
    Medium,
    Low,
}

impl GovernanceLevel {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            GovernanceLevel::High => "HIGH",
            GovernanceLevel::Medium => "MEDIUM",
            GovernanceLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for GovernanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GovernanceLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(GovernanceLevel::High),
            "MEDIUM" => Ok(GovernanceLevel::Medium),
            "LOW" => Ok(GovernanceLevel::Low),
            other => Err(ValidationError::InvalidGovernanceLevel(other.to_string())),
        }
    }
}

/// A governance receipt as carried in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtueReceipt {
    /// Identifier of the governed document.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub document_id: Option<String>,

    /// SHA-256 of the document content, 64 hex characters.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub hash: Option<String>,

    /// `chain_hash` of the previous link, or [`GENESIS_HASH`].
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub prev_hash: Option<String>,

    /// Hash of this link: `H(prev_hash || chain_payload)`.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub chain_hash: Option<String>,

    /// ISO-8601 issuance time.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,

    /// `HIGH`, `MEDIUM` or `LOW`. Kept raw so invalid values can be reported.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub governance_level: Option<String>,

    /// Institutional profile identifier.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub isp_profile: Option<String>,

    /// Named scores. Entries that are not numbers are dropped.
    #[serde(
        default,
        deserialize_with = "lenient_scores",
        skip_serializing_if = "Option::is_none"
    )]
    pub sge_scores: Option<BTreeMap<String, f64>>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub actor: Option<String>,

    /// Issuer signature. Carried through, not checked locally.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub signature: Option<String>,
}

/// Read any JSON value as text. `null` is absent; non-strings keep their
/// JSON literal.
fn lenient_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Read a score map, keeping only numeric entries.
fn lenient_scores<'de, D>(de: D) -> Result<Option<BTreeMap<String, f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Object(map)) => Some(
            map.into_iter()
                .filter_map(|(name, score)| score.as_f64().map(|n| (name, n)))
                .collect(),
        ),
        _ => None,
    })
}

/// Treat blank strings as absent.
fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

impl VirtueReceipt {
    /// Parse a receipt from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(CoreError::MalformedReceipt("expected a JSON object".into()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn document_id(&self) -> Option<&str> {
        non_empty(&self.document_id)
    }

    pub fn hash(&self) -> Option<&str> {
        non_empty(&self.hash)
    }

    pub fn prev_hash(&self) -> Option<&str> {
        non_empty(&self.prev_hash)
    }

    pub fn chain_hash(&self) -> Option<&str> {
        non_empty(&self.chain_hash)
    }

    pub fn timestamp(&self) -> Option<&str> {
        non_empty(&self.timestamp)
    }

    pub fn isp_profile(&self) -> Option<&str> {
        non_empty(&self.isp_profile)
    }

    /// Raw governance level as written, which may be invalid.
    pub fn governance_level(&self) -> Option<&str> {
        non_empty(&self.governance_level)
    }

    /// Typed governance level, if present and valid.
    pub fn governance(&self) -> Option<GovernanceLevel> {
        self.governance_level().and_then(|s| s.parse().ok())
    }

    /// Whether the receipt carries any chain data.
    pub fn has_chain_data(&self) -> bool {
        self.prev_hash().is_some() || self.chain_hash().is_some()
    }

    /// Whether this receipt is the first link of its chain.
    pub fn is_genesis(&self) -> bool {
        self.prev_hash() == Some(GENESIS_HASH)
    }

    /// Canonical payload covered by `chain_hash`.
    ///
    /// Only the four core fields take part; absent fields encode as `null`.
    pub fn chain_payload(&self) -> String {
        let core = json!({
            "document_id": self.document_id,
            "hash": self.hash,
            "timestamp": self.timestamp,
            "governance_level": self.governance_level,
        });
        canonicalize_json(&core)
    }

    /// Link this receipt after `prev`, filling `prev_hash` and `chain_hash`.
    pub fn link_to(&mut self, prev: impl Into<String>) {
        let prev = prev.into();
        self.chain_hash = Some(generate_chain_hash(&prev, &self.chain_payload()));
        self.prev_hash = Some(prev);
    }
}

/// Builder for creating receipts.
pub struct ReceiptBuilder {
    receipt: VirtueReceipt,
    link: Option<String>,
}

impl ReceiptBuilder {
    /// Start building a receipt for a document and its content hash.
    pub fn new(document_id: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            receipt: VirtueReceipt {
                document_id: Some(document_id.into()),
                hash: Some(hash.into()),
                ..Default::default()
            },
            link: None,
        }
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, ts: impl Into<String>) -> Self {
        self.receipt.timestamp = Some(ts.into());
        self
    }

    /// Set the governance level.
    pub fn governance(mut self, level: GovernanceLevel) -> Self {
        self.receipt.governance_level = Some(level.as_str().to_string());
        self
    }

    /// Set the institutional profile.
    pub fn isp_profile(mut self, profile: impl Into<String>) -> Self {
        self.receipt.isp_profile = Some(profile.into());
        self
    }

    /// Set the actor.
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.receipt.actor = Some(actor.into());
        self
    }

    /// Add a score.
    pub fn score(mut self, name: impl Into<String>, value: f64) -> Self {
        self.receipt
            .sge_scores
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value);
        self
    }

    /// Set the signature.
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.receipt.signature = Some(signature.into());
        self
    }

    /// Link the receipt after `prev` when built.
    pub fn chained_to(mut self, prev: impl Into<String>) -> Self {
        self.link = Some(prev.into());
        self
    }

    /// Build the receipt, computing chain data last so it covers every field.
    pub fn build(self) -> VirtueReceipt {
        let mut receipt = self.receipt;
        if let Some(prev) = self.link {
            receipt.link_to(prev);
        }
        receipt
    }
}
