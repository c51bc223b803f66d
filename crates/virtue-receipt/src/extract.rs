//! Locating an embedded receipt in a document.
//!
//! Extraction is best-effort. A document that carries no receipt, or one
//! whose embedded JSON is malformed, yields `Ok(None)`; only unexpected
//! failures of the extractor itself are errors.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use virtue_receipt_core::VirtueReceipt;

use crate::error::{Result, VerifyError};

/// Capability to find a receipt inside a document's bytes.
pub trait ReceiptExtractor: Send + Sync {
    /// Return the embedded receipt, or `None` when there is none.
    fn extract(&self, document: &[u8]) -> Result<Option<VirtueReceipt>>;
}

impl<T: ReceiptExtractor + ?Sized> ReceiptExtractor for &T {
    fn extract(&self, document: &[u8]) -> Result<Option<VirtueReceipt>> {
        (**self).extract(document)
    }
}

impl<T: ReceiptExtractor + ?Sized> ReceiptExtractor for Box<T> {
    fn extract(&self, document: &[u8]) -> Result<Option<VirtueReceipt>> {
        (**self).extract(document)
    }
}

/// PDF dictionary key carrying a receipt as a literal string.
pub const PDF_KEY: &str = "/VirtueReceipt";

/// Plain-text marker preceding a receipt object.
pub const TEXT_MARKER: &str = "VIRTUE-RECEIPT:";

fn marker_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?P<pdf>/VirtueReceipt\s*\()|(?P<text>VIRTUE-RECEIPT:\s*)").ok()
        })
        .as_ref()
}

/// Scans documents for receipt markers.
///
/// Two forms are recognized, and the first one that parses wins:
/// - a PDF dictionary entry `/VirtueReceipt (<json>)`, with the usual
///   literal-string escapes
/// - a text marker `VIRTUE-RECEIPT:<json>`
///
/// Non-UTF-8 bytes are replaced before scanning, so binary containers work
/// as long as the receipt itself is plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerExtractor;

impl MarkerExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ReceiptExtractor for MarkerExtractor {
    fn extract(&self, document: &[u8]) -> Result<Option<VirtueReceipt>> {
        let pattern = marker_pattern()
            .ok_or_else(|| VerifyError::Extraction("marker pattern failed to compile".into()))?;
        let text = String::from_utf8_lossy(document);

        for caps in pattern.captures_iter(&text) {
            let found = match (caps.name("pdf"), caps.name("text")) {
                (Some(m), _) => pdf_literal(&text[m.end()..]).and_then(|s| parse_receipt(&s)),
                (_, Some(m)) => parse_leading_object(&text[m.end()..]),
                _ => None,
            };
            if found.is_some() {
                return Ok(found);
            }
        }

        Ok(None)
    }
}

/// Read a PDF literal string body up to its closing parenthesis.
///
/// `rest` starts just after the opening `(`. Nested balanced parentheses are
/// kept; escapes are resolved. Returns `None` when the string never closes.
fn pdf_literal(rest: &str) -> Option<String> {
    let mut out = String::new();
    let mut depth = 1usize;
    let mut chars = rest.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                // Line continuation.
                '\n' => {}
                other => out.push(other),
            },
            '(' => {
                depth += 1;
                out.push(c);
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(out);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    None
}

fn parse_receipt(json: &str) -> Option<VirtueReceipt> {
    VirtueReceipt::from_json(json.trim()).ok()
}

/// Parse the first JSON value in `rest`, ignoring whatever follows it.
fn parse_leading_object(rest: &str) -> Option<VirtueReceipt> {
    let value = serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()?
        .ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Extractor that returns a fixed answer regardless of the document.
///
/// Useful when the receipt travels separately from the document, and in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    receipt: Option<VirtueReceipt>,
}

impl StaticExtractor {
    pub fn new(receipt: VirtueReceipt) -> Self {
        Self {
            receipt: Some(receipt),
        }
    }

    /// An extractor that never finds a receipt.
    pub fn none() -> Self {
        Self::default()
    }
}

impl ReceiptExtractor for StaticExtractor {
    fn extract(&self, _document: &[u8]) -> Result<Option<VirtueReceipt>> {
        Ok(self.receipt.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtue_receipt_core::GovernanceLevel;

    const RECEIPT_JSON: &str = concat!(
        r#"{"document_id":"INV-7","#,
        r#""hash":"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad","#,
        r#""timestamp":"2024-03-01T09:30:00Z","governance_level":"HIGH"}"#,
    );

    #[test]
    fn test_text_marker() {
        let doc = format!("Invoice 7\nTotal: 100 EUR\nVIRTUE-RECEIPT: {RECEIPT_JSON}\ntrailer");
        let receipt = MarkerExtractor.extract(doc.as_bytes()).unwrap().unwrap();
        assert_eq!(receipt.document_id(), Some("INV-7"));
        assert_eq!(receipt.governance(), Some(GovernanceLevel::High));
    }

    #[test]
    fn test_pdf_dictionary_entry() {
        let escaped = RECEIPT_JSON.replace('(', "\\(").replace(')', "\\)");
        let mut doc = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog /VirtueReceipt (".to_vec();
        doc.extend_from_slice(escaped.as_bytes());
        doc.extend_from_slice(b") >>\nendobj\n\xff\xfe binary");

        let receipt = MarkerExtractor.extract(&doc).unwrap().unwrap();
        assert_eq!(receipt.document_id(), Some("INV-7"));
    }

    #[test]
    fn test_pdf_literal_escapes_and_nesting() {
        assert_eq!(pdf_literal(r#"a \(b\) (c) d) tail"#).as_deref(), Some("a (b) (c) d"));
        assert_eq!(pdf_literal("unterminated"), None);
        assert_eq!(pdf_literal(r"x\\y)"), Some(r"x\y".to_string()));
    }

    #[test]
    fn test_no_marker() {
        assert!(MarkerExtractor.extract(b"plain document").unwrap().is_none());
        assert!(MarkerExtractor.extract(&[]).unwrap().is_none());
    }

    #[test]
    fn test_malformed_json_is_no_receipt() {
        let doc = b"VIRTUE-RECEIPT: {\"document_id\": \"x\",";
        assert!(MarkerExtractor.extract(doc).unwrap().is_none());

        let doc = b"/VirtueReceipt ([1, 2, 3])";
        assert!(MarkerExtractor.extract(doc).unwrap().is_none());
    }

    #[test]
    fn test_mistyped_fields_still_yield_a_receipt() {
        let doc = concat!(
            r#"VIRTUE-RECEIPT: {"document_id": 7, "governance_level": 1, "#,
            r#""sge_scores": {"risk": "low"}}"#,
        )
        .as_bytes();
        let receipt = MarkerExtractor.extract(doc).unwrap().unwrap();
        assert_eq!(receipt.document_id(), Some("7"));
        assert_eq!(receipt.governance_level(), Some("1"));
        assert_eq!(receipt.sge_scores, Some(Default::default()));

        let doc = br#"/VirtueReceipt ({"document_id": "INV-7", "governance_level": true})"#;
        let receipt = MarkerExtractor.extract(doc).unwrap().unwrap();
        assert_eq!(receipt.governance_level(), Some("true"));
    }

    #[test]
    fn test_first_parsable_marker_wins() {
        let doc = format!("VIRTUE-RECEIPT: not-json\nVIRTUE-RECEIPT:{RECEIPT_JSON}");
        let receipt = MarkerExtractor.extract(doc.as_bytes()).unwrap().unwrap();
        assert_eq!(receipt.document_id(), Some("INV-7"));
    }

    #[test]
    fn test_static_extractor() {
        let receipt = VirtueReceipt::from_json(RECEIPT_JSON).unwrap();
        let found = StaticExtractor::new(receipt.clone()).extract(b"anything").unwrap();
        assert_eq!(found, Some(receipt));
        assert!(StaticExtractor::none().extract(b"anything").unwrap().is_none());
    }
}
