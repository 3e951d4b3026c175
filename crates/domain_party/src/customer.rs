//! Customer records
//!
//! Customers are referenced (not owned) by invoices. Removing a customer
//! that still has invoices is governed by [`CustomerDeletionPolicy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use core_kernel::CustomerId;

use crate::error::PartyError;

/// A studio client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Postal address, free text
    pub address: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Builds a customer from a validated creation request
    pub fn from_request(request: NewCustomer) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::new_v7(),
            name: request.name.trim().to_string(),
            email: request.email,
            phone: request.phone,
            address: request.address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if `term` occurs in the name, email or phone, ignoring case
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        [Some(&self.name), self.email.as_ref(), self.phone.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Applies a validated update in place
    pub fn apply(&mut self, update: UpdateCustomer) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        if update.address.is_some() {
            self.address = update.address;
        }
        self.updated_at = Utc::now();
    }
}

/// Request for creating a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewCustomer {
    /// Creates a request with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Runs field validation, reporting the first offending field
    pub fn check(&self) -> Result<(), PartyError> {
        if self.name.trim().is_empty() {
            return Err(PartyError::InvalidData {
                field: "name".to_string(),
                message: "name must not be blank".to_string(),
            });
        }
        self.validate().map_err(PartyError::from)
    }
}

/// Request for updating a customer; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateCustomer {
    /// Runs field validation, reporting the first offending field
    pub fn check(&self) -> Result<(), PartyError> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(PartyError::InvalidData {
                field: "name".to_string(),
                message: "name must not be blank".to_string(),
            });
        }
        self.validate().map_err(PartyError::from)
    }
}

/// What happens to a customer's invoices when the customer is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerDeletionPolicy {
    /// Delete the customer's invoices together with the customer
    #[default]
    Cascade,
    /// Refuse to delete a customer that still has invoices
    Restrict,
}

impl fmt::Display for CustomerDeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerDeletionPolicy::Cascade => write!(f, "cascade"),
            CustomerDeletionPolicy::Restrict => write!(f, "restrict"),
        }
    }
}

impl FromStr for CustomerDeletionPolicy {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(CustomerDeletionPolicy::Cascade),
            "restrict" => Ok(CustomerDeletionPolicy::Restrict),
            other => Err(PartyError::UnknownDeletionPolicy(other.to_string())),
        }
    }
}
