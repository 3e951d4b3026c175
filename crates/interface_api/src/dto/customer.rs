//! Customer DTOs
//!
//! Create and update bodies are the domain requests themselves
//! (`NewCustomer`, `UpdateCustomer`), validated by the customer port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_party::Customer;

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.into(),
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

/// Result of removing a customer
#[derive(Debug, Serialize)]
pub struct CustomerRemovedResponse {
    pub id: Uuid,
    pub invoices_removed: usize,
}

/// Query parameters for listing customers
#[derive(Debug, Default, Deserialize)]
pub struct ListCustomersParams {
    /// Matched against name, email and phone
    pub search: Option<String>,
}

impl ListCustomersParams {
    /// The search term, if one was given
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}
