//! Billing domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{MoneyError, PortError};

use crate::line_item::LineItemFault;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// A line item has an out-of-range quantity or price
    #[error("Invalid line item{}: {fault}", position_suffix(.position))]
    InvalidLineItem {
        /// Zero-based position on the invoice, when known
        position: Option<usize>,
        fault: LineItemFault,
    },

    /// Discount or tax percentage outside its allowed range
    #[error("Invalid {field}: {value}")]
    InvalidPercentage {
        field: &'static str,
        value: Decimal,
    },

    /// A monetary field outside its allowed range
    #[error("Invalid {field}: {value}")]
    InvalidAmount {
        field: &'static str,
        value: Decimal,
    },

    /// Invoice submitted without any line items
    #[error("Invoice must contain at least one line item")]
    EmptyInvoice,

    /// Invoice number already in use
    #[error("Duplicate invoice number: {0}")]
    DuplicateInvoiceNumber(String),

    /// Invoice number is malformed
    #[error("Invalid invoice number: {0}")]
    InvalidInvoiceNumber(String),

    /// Attempt to change the number of an existing invoice
    #[error("Invoice number {0} cannot be changed after creation")]
    InvoiceNumberImmutable(String),

    /// Every generated candidate number collided
    #[error("Could not allocate a unique invoice number after {attempts} attempts")]
    NumberingExhausted { attempts: u32 },

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Customer referenced by an invoice does not exist
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Customer removal blocked by the restrict policy
    #[error("Customer {customer} still has {invoices} invoice(s)")]
    CustomerHasInvoices {
        customer: String,
        invoices: usize,
    },

    /// Calculation error (decimal overflow)
    #[error("Calculation error: {0}")]
    CalculationError(String),

    /// Storage failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl BillingError {
    /// Attaches an invoice position to a line item error
    pub fn at_position(self, index: usize) -> Self {
        match self {
            BillingError::InvalidLineItem { fault, .. } => BillingError::InvalidLineItem {
                position: Some(index),
                fault,
            },
            other => other,
        }
    }

    /// Returns the name of the field that failed, for field-level reporting
    pub fn field_name(&self) -> Option<String> {
        match self {
            BillingError::InvalidLineItem { position: Some(p), fault } => {
                Some(format!("items[{}].{}", p, fault.field_name()))
            }
            BillingError::InvalidLineItem { position: None, fault } => {
                Some(fault.field_name().to_string())
            }
            BillingError::InvalidPercentage { field, .. }
            | BillingError::InvalidAmount { field, .. } => Some((*field).to_string()),
            BillingError::EmptyInvoice => Some("items".to_string()),
            BillingError::DuplicateInvoiceNumber(_)
            | BillingError::InvalidInvoiceNumber(_)
            | BillingError::InvoiceNumberImmutable(_) => Some("invoice_number".to_string()),
            BillingError::CustomerNotFound(_) => Some("customer_id".to_string()),
            _ => None,
        }
    }

    /// Returns true for errors caused by the submitted data
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BillingError::InvalidLineItem { .. }
                | BillingError::InvalidPercentage { .. }
                | BillingError::InvalidAmount { .. }
                | BillingError::EmptyInvoice
                | BillingError::InvalidInvoiceNumber(_)
                | BillingError::InvoiceNumberImmutable(_)
                | BillingError::CustomerNotFound(_)
        )
    }
}

fn position_suffix(position: &Option<usize>) -> String {
    match position {
        Some(p) => format!(" #{}", p + 1),
        None => String::new(),
    }
}

impl From<MoneyError> for BillingError {
    fn from(error: MoneyError) -> Self {
        BillingError::CalculationError(error.to_string())
    }
}
