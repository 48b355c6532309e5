//! Checkout form validation.
//!
//! Every validator collects all violations instead of stopping at the first,
//! so the form can flag each bad field at once.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use atelier_core::{CardNetwork, Email};

use crate::models::ShippingDetails;

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("Invalid regex"));

static CVC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("Invalid regex"));

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CardNumber,
    Expiry,
    Cvc,
    FullName,
    Email,
    Address,
    City,
    PostalCode,
    Country,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CardNumber => "card_number",
            Self::Expiry => "expiry",
            Self::Cvc => "cvc",
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Address => "address",
            Self::City => "city",
            Self::PostalCode => "postal_code",
            Self::Country => "country",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field's problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// All problems found in a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Whether `field` is among the violations.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn message(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn check(&mut self, ok: bool, field: Field, message: &str) {
        if !ok {
            self.0.push(FieldError {
                field,
                message: message.to_string(),
            });
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors: self.0 })
        }
    }
}

/// Card fields as typed by the visitor.
///
/// `Debug` masks everything but the last four digits.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = digits_of(&self.number);
        let last4 = digits.get(digits.len().saturating_sub(4)..).unwrap_or_default();
        f.debug_struct("CardDetails")
            .field("number", &format!("****{last4}"))
            .field("expiry", &self.expiry)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

fn digits_of(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Luhn checksum over the digits of `number`, ignoring spaces and dashes.
///
/// Requires 13 to 19 digits.
#[must_use]
pub fn luhn_valid(number: &str) -> bool {
    let digits = digits_of(number);
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// `MM/YY` with a month of 01-12.
///
/// Only the shape is checked; an expired date such as `01/19` passes.
#[must_use]
pub fn validate_expiry(expiry: &str) -> bool {
    EXPIRY_RE.is_match(expiry.trim())
}

/// Three or four digits.
#[must_use]
pub fn validate_cvc(cvc: &str) -> bool {
    CVC_RE.is_match(cvc.trim())
}

/// Check number, expiry and CVC independently.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_card(card: &CardDetails) -> Result<(), ValidationError> {
    let mut errors = Collector::default();
    errors.check(luhn_valid(&card.number), Field::CardNumber, "Card number is not valid");
    errors.check(validate_expiry(&card.expiry), Field::Expiry, "Expiry must be MM/YY");
    errors.check(validate_cvc(&card.cvc), Field::Cvc, "CVC must be 3 or 4 digits");
    errors.finish()
}

/// Check that required shipping fields are filled and the email is
/// well-formed. Phone is optional.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_shipping(details: &ShippingDetails) -> Result<(), ValidationError> {
    fn filled(value: &str) -> bool {
        !value.trim().is_empty()
    }

    let mut errors = Collector::default();
    errors.check(filled(&details.full_name), Field::FullName, "Full name is required");
    if filled(&details.email) {
        errors.check(
            Email::parse(details.email.trim()).is_ok(),
            Field::Email,
            "Email address is not valid",
        );
    } else {
        errors.check(false, Field::Email, "Email is required");
    }
    errors.check(filled(&details.address), Field::Address, "Address is required");
    errors.check(filled(&details.city), Field::City, "City is required");
    errors.check(filled(&details.postal_code), Field::PostalCode, "Postal code is required");
    errors.check(filled(&details.country), Field::Country, "Country is required");
    errors.finish()
}

/// Card network from the leading digits.
#[must_use]
pub fn detect_network(number: &str) -> CardNetwork {
    let digits = digits_of(number);
    let prefix = |n: usize| digits.get(..n).and_then(|p| p.parse::<u32>().ok());

    if digits.starts_with('4') {
        CardNetwork::Visa
    } else if matches!(prefix(2), Some(34 | 37)) {
        CardNetwork::Amex
    } else if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
        CardNetwork::Mastercard
    } else if prefix(4) == Some(6011) || prefix(2) == Some(65) || matches!(prefix(3), Some(644..=649))
    {
        CardNetwork::Discover
    } else {
        CardNetwork::Unknown
    }
}
