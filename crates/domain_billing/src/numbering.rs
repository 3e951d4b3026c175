//! Invoice numbers
//!
//! Numbers are a fixed prefix plus eight uppercase hex digits
//! (`INV-3FA2C91B`). They are assigned once, when the invoice is first
//! stored, and never regenerated. Uniqueness is enforced by the storage
//! port; the billing service retries with a fresh candidate on collision.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::BillingError;

/// Default prefix for generated numbers
pub const DEFAULT_PREFIX: &str = "INV";

/// Default number of candidates tried before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const MAX_LEN: usize = 32;

/// A human-readable invoice number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Generates a candidate number with 32 bits of randomness
    pub fn generate(prefix: &str) -> Self {
        let suffix = Uuid::new_v4().as_u128() as u32;
        Self(format!("{}-{:08X}", prefix, suffix))
    }

    /// Parses an externally supplied number
    ///
    /// Accepts ASCII letters, digits, `-` and `/`, up to 32 characters.
    pub fn parse(value: &str) -> Result<Self, BillingError> {
        let trimmed = value.trim();
        let well_formed = !trimmed.is_empty()
            && trimmed.len() <= MAX_LEN
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/');

        if !well_formed {
            return Err(BillingError::InvalidInvoiceNumber(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> Self {
        number.0
    }
}

/// Settings for generating invoice numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumbering {
    prefix: String,
    max_attempts: u32,
}

impl InvoiceNumbering {
    /// Creates numbering settings
    ///
    /// # Errors
    ///
    /// Returns `InvalidInvoiceNumber` if the prefix would not produce valid numbers
    pub fn new(prefix: impl Into<String>, max_attempts: u32) -> Result<Self, BillingError> {
        let prefix = prefix.into();
        // 9 = separator plus eight hex digits
        if prefix.len() + 9 > MAX_LEN {
            return Err(BillingError::InvalidInvoiceNumber(prefix));
        }
        InvoiceNumber::parse(&format!("{}-00000000", prefix))?;

        Ok(Self {
            prefix,
            max_attempts: max_attempts.max(1),
        })
    }

    /// Returns the prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns how many candidates are tried
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generates a candidate number
    pub fn next_candidate(&self) -> InvoiceNumber {
        InvoiceNumber::generate(&self.prefix)
    }
}

impl Default for InvoiceNumbering {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}
