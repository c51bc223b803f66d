//! Field canonicalization and shelf strings for payment fingerprints.
//!
//! A shelf string is `<TAG>|<SUBTAG>|<canonical-value>`. The issuer and the
//! verifier each normalize a payment field independently; agreeing on these
//! rules is what lets both sides compare digests instead of raw values.
//!
//! This is the single authoritative rule set: currency symbols map through
//! a fixed ISO 4217 table and amounts detect their decimal mark from the
//! rightmost separator. Amount normalization is best-effort and must not be
//! used for accounting.

use unicode_normalization::UnicodeNormalization;

use crate::digest::{hash_text, Digest};

/// Returned by [`canon_amount2`] for empty or unparsable input.
pub const ZERO_AMOUNT: &str = "0.00";

/// Separator between shelf string segments.
pub const SHELF_SEPARATOR: char = '|';

/// Trim and collapse internal whitespace runs to a single space.
pub fn canon_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`canon_text`], then NFKC normalization, then uppercase.
pub fn canon_text_upper(raw: &str) -> String {
    canon_text(raw).nfkc().collect::<String>().to_uppercase()
}

/// Normalize an IBAN: drop spaces and hyphens, uppercase.
///
/// No checksum validation happens here.
pub fn canon_iban(raw: &str) -> String {
    canon_text(raw)
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

/// Map a currency symbol or name to its ISO 4217 code.
///
/// Unknown input passes through uppercased.
pub fn canon_currency(raw: &str) -> String {
    let key = canon_text(raw).to_uppercase();
    let code = match key.as_str() {
        "€" | "EURO" | "EUR" => "EUR",
        "$" | "DOLLAR" | "USD" => "USD",
        "£" | "POUND" | "GBP" => "GBP",
        "¥" | "YEN" | "JPY" => "JPY",
        "CHF" | "FRANC" => "CHF",
        _ => return key,
    };
    code.to_string()
}

/// Normalize a monetary amount to a two-decimal string.
///
/// The rightmost of `,` and `.` is taken as the decimal mark and the other
/// as a thousands separator. Rounding is half-up (away from zero) on exact
/// decimal digits. Empty or unparsable input yields [`ZERO_AMOUNT`].
pub fn canon_amount2(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let comma_is_decimal = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) => comma > dot,
        (Some(_), None) => true,
        _ => false,
    };

    let numeric = if comma_is_decimal {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };

    match ParsedAmount::parse(&numeric) {
        Some(amount) => amount.round_to_cents(),
        None => ZERO_AMOUNT.to_string(),
    }
}

/// A decimal split into sign, integer digits and fraction digits.
struct ParsedAmount<'a> {
    negative: bool,
    int_digits: &'a str,
    frac_digits: &'a str,
}

impl<'a> ParsedAmount<'a> {
    /// Accepts `-?\d*(\.\d*)?` with at least one digit.
    fn parse(s: &'a str) -> Option<Self> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_digits, frac_digits) = body.split_once('.').unwrap_or((body, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_digits) || !all_digits(frac_digits) {
            return None;
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        Some(Self {
            negative,
            int_digits,
            frac_digits,
        })
    }

    fn round_to_cents(&self) -> String {
        let frac = self.frac_digits.as_bytes();
        let cents = [
            frac.first().copied().unwrap_or(b'0'),
            frac.get(1).copied().unwrap_or(b'0'),
        ];
        let round_up = frac.get(2).map_or(false, |d| *d >= b'5');

        // Work on the value scaled by 100 as a digit string so arbitrarily
        // long inputs never overflow.
        let mut digits: Vec<u8> = self
            .int_digits
            .bytes()
            .skip_while(|b| *b == b'0')
            .chain(cents)
            .collect();
        if round_up {
            increment_digits(&mut digits);
        }
        while digits.len() < 3 {
            digits.insert(0, b'0');
        }

        let split = digits.len() - 2;
        let is_zero = digits.iter().all(|d| *d == b'0');
        let mut out = String::with_capacity(digits.len() + 2);
        if self.negative && !is_zero {
            out.push('-');
        }
        out.extend(digits[..split].iter().map(|d| *d as char));
        out.push('.');
        out.extend(digits[split..].iter().map(|d| *d as char));
        out
    }
}

/// Add one to a big-endian ASCII digit string.
fn increment_digits(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// The payment fields that have a shelf representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShelfField {
    Iban,
    Amount,
    Currency,
    Beneficiary,
    Reference,
}

impl ShelfField {
    /// All fields, in fingerprint order.
    pub const ALL: [ShelfField; 5] = [
        ShelfField::Iban,
        ShelfField::Amount,
        ShelfField::Currency,
        ShelfField::Beneficiary,
        ShelfField::Reference,
    ];

    /// Leading tag.
    pub const fn tag(self) -> &'static str {
        match self {
            ShelfField::Iban => "PAYTO",
            ShelfField::Amount => "AMOUNT",
            ShelfField::Currency => "CURRENCY",
            ShelfField::Beneficiary => "BENEFICIARY",
            ShelfField::Reference => "REFERENCE",
        }
    }

    /// Second tag.
    pub const fn subtag(self) -> &'static str {
        match self {
            ShelfField::Iban => "IBAN",
            ShelfField::Amount => "DEC",
            ShelfField::Currency => "ISO4217",
            ShelfField::Beneficiary => "NAME",
            ShelfField::Reference => "E2E",
        }
    }

    /// Apply the field's normalization rule.
    pub fn canonicalize(self, raw: &str) -> String {
        match self {
            ShelfField::Iban => canon_iban(raw),
            ShelfField::Amount => canon_amount2(raw),
            ShelfField::Currency => canon_currency(raw),
            ShelfField::Beneficiary | ShelfField::Reference => canon_text_upper(raw),
        }
    }

    /// Build the shelf string for a raw value.
    pub fn shelf(self, raw: &str) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.tag(),
            self.subtag(),
            self.canonicalize(raw),
            sep = SHELF_SEPARATOR
        )
    }
}

/// `PAYTO|IBAN|<iban>`
pub fn shelf_iban(raw: &str) -> String {
    ShelfField::Iban.shelf(raw)
}

/// `AMOUNT|DEC|<amount>`
pub fn shelf_amount(raw: &str) -> String {
    ShelfField::Amount.shelf(raw)
}

/// `CURRENCY|ISO4217|<code>`
pub fn shelf_currency(raw: &str) -> String {
    ShelfField::Currency.shelf(raw)
}

/// `BENEFICIARY|NAME|<name>`
pub fn shelf_beneficiary(raw: &str) -> String {
    ShelfField::Beneficiary.shelf(raw)
}

/// `REFERENCE|E2E|<ref>`
pub fn shelf_reference(raw: &str) -> String {
    ShelfField::Reference.shelf(raw)
}

/// Raw payment fields as scraped from a document. Any may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFields {
    pub iban: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub beneficiary: Option<String>,
    pub reference: Option<String>,
}

impl PaymentFields {
    fn get(&self, field: ShelfField) -> Option<&str> {
        match field {
            ShelfField::Iban => self.iban.as_deref(),
            ShelfField::Amount => self.amount.as_deref(),
            ShelfField::Currency => self.currency.as_deref(),
            ShelfField::Beneficiary => self.beneficiary.as_deref(),
            ShelfField::Reference => self.reference.as_deref(),
        }
    }

    /// Shelf strings for the present fields, in [`ShelfField::ALL`] order.
    pub fn shelves(&self) -> Vec<(ShelfField, String)> {
        ShelfField::ALL
            .iter()
            .filter_map(|field| self.get(*field).map(|raw| (*field, field.shelf(raw))))
            .collect()
    }

    /// Digest of each present shelf string.
    pub fn fingerprints(&self) -> Vec<(ShelfField, Digest)> {
        self.shelves()
            .into_iter()
            .map(|(field, shelf)| (field, hash_text(&shelf)))
            .collect()
    }
}
