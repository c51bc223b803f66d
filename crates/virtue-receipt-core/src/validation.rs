//! Receipt validation: structural completeness and field formats.
//!
//! Validation is independent of the document and of chain state. It never
//! stops at the first problem: every rule runs and every failure is
//! reported, in a fixed order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::digest::is_hex_digest;
use crate::error::ValidationError;
use crate::receipt::{GovernanceLevel, VirtueReceipt};

/// Offset date-time layouts accepted after RFC 3339. `%#z` takes `Z`,
/// `+01`, `+0100` and `+01:00`.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// Naive date-time layouts, taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339, ISO-8601 offsets without a colon or without seconds,
/// a naive date-time (taken as UTC), or a bare calendar date (midnight UTC).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(input, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validate a receipt's structure.
///
/// Checks, in order:
/// 1. Required fields `document_id`, `hash`, `timestamp`, `governance_level`
/// 2. `hash` is 64 hex characters
/// 3. `governance_level` is `HIGH`, `MEDIUM` or `LOW`
/// 4. `timestamp` parses as a date-time
///
/// An empty list means the receipt is structurally valid.
pub fn validate_receipt(receipt: &VirtueReceipt) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let required = [
        ("document_id", receipt.document_id()),
        ("hash", receipt.hash()),
        ("timestamp", receipt.timestamp()),
        ("governance_level", receipt.governance_level()),
    ];
    for (name, value) in required {
        if value.is_none() {
            errors.push(ValidationError::MissingField(name));
        }
    }

    if let Some(hash) = receipt.hash() {
        if !is_hex_digest(hash) {
            errors.push(ValidationError::InvalidHashFormat(hash.to_string()));
        }
    }

    if let Some(level) = receipt.governance_level() {
        if let Err(err) = level.parse::<GovernanceLevel>() {
            errors.push(err);
        }
    }

    if let Some(ts) = receipt.timestamp() {
        if parse_timestamp(ts).is_none() {
            errors.push(ValidationError::InvalidTimestamp(ts.to_string()));
        }
    }

    errors
}

/// Shorthand for [`validate_receipt`] when only a verdict is needed.
pub fn is_structurally_valid(receipt: &VirtueReceipt) -> bool {
    validate_receipt(receipt).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::ReceiptBuilder;
    use chrono::{Datelike, Timelike};

    const DOC_HASH: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn valid() -> VirtueReceipt {
        ReceiptBuilder::new("INV-2024-001", DOC_HASH)
            .timestamp("2024-03-01T09:30:00Z")
            .governance(GovernanceLevel::High)
            .build()
    }

    #[test]
    fn test_valid_receipt() {
        assert!(validate_receipt(&valid()).is_empty());
        assert!(is_structurally_valid(&valid()));
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let errors = validate_receipt(&VirtueReceipt::default());
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingField("document_id"),
                ValidationError::MissingField("hash"),
                ValidationError::MissingField("timestamp"),
                ValidationError::MissingField("governance_level"),
            ]
        );
        assert!(errors[1].to_string().contains("hash"));
    }

    #[test]
    fn test_blank_field_is_missing() {
        let mut receipt = valid();
        receipt.document_id = Some("  ".into());
        assert_eq!(
            validate_receipt(&receipt),
            vec![ValidationError::MissingField("document_id")]
        );
    }

    #[test]
    fn test_hash_format() {
        let mut receipt = valid();
        receipt.hash = Some(DOC_HASH.to_uppercase());
        assert!(validate_receipt(&receipt).is_empty());

        receipt.hash = Some("abc123".into());
        assert_eq!(
            validate_receipt(&receipt),
            vec![ValidationError::InvalidHashFormat("abc123".into())]
        );

        receipt.hash = Some(format!("{}zz", &DOC_HASH[..62]));
        assert_eq!(validate_receipt(&receipt).len(), 1);
    }

    #[test]
    fn test_governance_level_named_in_error() {
        let mut receipt = valid();
        receipt.governance_level = Some("EXTREME".into());
        let errors = validate_receipt(&receipt);
        assert_eq!(
            errors,
            vec![ValidationError::InvalidGovernanceLevel("EXTREME".into())]
        );
        assert!(errors[0].to_string().contains("EXTREME"));
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut receipt = valid();
        receipt.timestamp = Some("yesterday".into());
        assert_eq!(
            validate_receipt(&receipt),
            vec![ValidationError::InvalidTimestamp("yesterday".into())]
        );
    }

    #[test]
    fn test_compact_iso_timestamps_are_valid() {
        for ts in ["2024-03-01T09:30Z", "2024-03-01T09:30", "2024-03-01T10:30:00+0100"] {
            let mut receipt = valid();
            receipt.timestamp = Some(ts.into());
            assert!(validate_receipt(&receipt).is_empty(), "{ts}");
        }
    }

    #[test]
    fn test_independent_rules_all_run() {
        let receipt = VirtueReceipt {
            hash: Some("nothex".into()),
            governance_level: Some("low".into()),
            timestamp: Some("2024-13-45".into()),
            ..Default::default()
        };
        let errors = validate_receipt(&receipt);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ValidationError::MissingField("document_id"));
        assert!(matches!(errors[1], ValidationError::InvalidHashFormat(_)));
        assert!(matches!(errors[2], ValidationError::InvalidGovernanceLevel(_)));
        assert!(matches!(errors[3], ValidationError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let receipt = valid();
        let before = receipt.clone();
        let _ = validate_receipt(&receipt);
        assert_eq!(receipt, before);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let offset = parse_timestamp("2024-03-01T10:30:00+01:00").unwrap();
        assert_eq!(offset.hour(), 9);

        let naive = parse_timestamp("2024-03-01T09:30:00.250").unwrap();
        assert_eq!(naive.minute(), 30);

        let spaced = parse_timestamp("2024-03-01 09:30:00").unwrap();
        assert_eq!(spaced, parse_timestamp("2024-03-01T09:30:00Z").unwrap());

        let minutes = parse_timestamp("2024-03-01T09:30Z").unwrap();
        assert_eq!(minutes, parse_timestamp("2024-03-01T09:30:00Z").unwrap());
        assert_eq!(parse_timestamp("2024-03-01T09:30"), Some(minutes));
        assert_eq!(parse_timestamp("2024-03-01 09:30"), Some(minutes));
        assert_eq!(parse_timestamp("2024-03-01T10:30+01:00"), Some(minutes));

        let basic = parse_timestamp("2024-03-01T09:30:00+0100").unwrap();
        assert_eq!(basic.hour(), 8);
        let fractional = parse_timestamp("2024-03-01T10:30:00.5+01").unwrap();
        assert_eq!((fractional.hour(), fractional.timestamp_subsec_millis()), (9, 500));

        let date = parse_timestamp("2024-03-01").unwrap();
        assert_eq!((date.year(), date.month(), date.day(), date.hour()), (2024, 3, 1, 0));

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-02-30").is_none());
    }
}
