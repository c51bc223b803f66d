//! Test fixtures and helpers.
//!
//! Documents with matching receipts, chains of receipts, and documents that
//! embed their receipt the way issuers ship them.

use std::io;
use std::path::{Path, PathBuf};

use virtue_receipt_core::{
    CoreError, Digest, GovernanceLevel, PaymentFields, ReceiptBuilder, VirtueReceipt,
    GENESIS_HASH,
};

/// Timestamp used by fixtures unless overridden.
pub const FIXTURE_TIMESTAMP: &str = "2024-03-01T09:30:00Z";

/// A document and the metadata its receipt will carry.
#[derive(Debug, Clone)]
pub struct DocumentFixture {
    pub document_id: String,
    pub content: Vec<u8>,
    pub timestamp: String,
    pub governance: GovernanceLevel,
}

impl DocumentFixture {
    pub fn new(document_id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            document_id: document_id.into(),
            content: content.into(),
            timestamp: FIXTURE_TIMESTAMP.to_string(),
            governance: GovernanceLevel::High,
        }
    }

    /// A small text invoice numbered `number`.
    pub fn invoice(number: u32) -> Self {
        let id = format!("INV-2024-{number:03}");
        let content = format!(
            "Invoice {id}\nBeneficiary: Acme GmbH\n\
             IBAN: DE89 3704 0044 0532 0130 00\nAmount: {number}.00 EUR\n"
        );
        Self::new(id, content)
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_governance(mut self, level: GovernanceLevel) -> Self {
        self.governance = level;
        self
    }

    pub fn digest(&self) -> Digest {
        Digest::of(&self.content)
    }

    /// A receipt builder pre-filled to match this document.
    pub fn receipt(&self) -> ReceiptBuilder {
        ReceiptBuilder::new(self.document_id.clone(), self.digest().to_hex())
            .timestamp(self.timestamp.clone())
            .governance(self.governance)
    }

    /// Content followed by a `VIRTUE-RECEIPT:` text marker.
    pub fn with_text_marker(&self, receipt: &VirtueReceipt) -> Result<Vec<u8>, CoreError> {
        let mut out = self.content.clone();
        out.extend_from_slice(b"\nVIRTUE-RECEIPT:");
        out.extend_from_slice(receipt.to_json()?.as_bytes());
        out.push(b'\n');
        Ok(out)
    }

    /// A minimal PDF-like container with the receipt in its catalog.
    pub fn with_pdf_entry(&self, receipt: &VirtueReceipt) -> Result<Vec<u8>, CoreError> {
        let json = receipt.to_json()?;
        let literal = json
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");

        let mut out = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n".to_vec();
        out.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /VirtueReceipt (");
        out.extend_from_slice(literal.as_bytes());
        out.extend_from_slice(b") >>\nendobj\n2 0 obj\n<< /Length ");
        out.extend_from_slice(self.content.len().to_string().as_bytes());
        out.extend_from_slice(b" >>\nstream\n");
        out.extend_from_slice(&self.content);
        out.extend_from_slice(b"\nendstream\nendobj\n%%EOF\n");
        Ok(out)
    }

    /// Write the bare content into `dir` and return the path.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(format!("{}.txt", self.document_id));
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// A chain of receipts over consecutive invoices, starting from genesis.
#[derive(Debug, Clone)]
pub struct ChainFixture {
    pub documents: Vec<DocumentFixture>,
    pub receipts: Vec<VirtueReceipt>,
}

impl ChainFixture {
    /// Build a chain of `len` invoices.
    pub fn new(len: usize) -> Self {
        let documents = (1..=len as u32).map(DocumentFixture::invoice).collect();
        Self::from_documents(documents)
    }

    /// Chain receipts over the given documents in order.
    pub fn from_documents(documents: Vec<DocumentFixture>) -> Self {
        let mut receipts: Vec<VirtueReceipt> = Vec::with_capacity(documents.len());
        for doc in &documents {
            let prev = receipts
                .last()
                .and_then(|r| r.chain_hash())
                .unwrap_or(GENESIS_HASH)
                .to_string();
            receipts.push(doc.receipt().chained_to(prev).build());
        }
        Self {
            documents,
            receipts,
        }
    }

    /// `chain_hash` of the last link.
    pub fn head(&self) -> Option<&str> {
        self.receipts.last().and_then(|r| r.chain_hash())
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}

/// Payment fields as they might be scraped from [`DocumentFixture::invoice`].
pub fn sample_payment() -> PaymentFields {
    PaymentFields {
        iban: Some("DE89 3704 0044 0532 0130 00".into()),
        amount: Some("€ 1.234,50".into()),
        currency: Some("euro".into()),
        beneficiary: Some("  Acme   GmbH ".into()),
        reference: Some("inv-2024-001".into()),
    }
}
