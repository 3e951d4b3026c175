//! Billing Domain - invoices and the ledger engine
//!
//! This crate owns everything with money arithmetic in it:
//!
//! - **Line items**: `quantity × unit_price`, exact fixed-point
//! - **Ledger engine**: subtotal, discount, tax (after discount), total and
//!   the amount still due, all derived on demand and never stored
//! - **Numbering**: prefixed eight-digit hex invoice numbers, unique at the
//!   storage boundary
//! - **Storage port**: atomic invoice-plus-items writes
//! - **Billing service**: the invoice lifecycle over the ports
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{InvoiceDraft, totals};
//!
//! let draft = InvoiceDraft::new(customer_id, issue_date, due_date)
//!     .item("Bridal makeup", 2, Money::new(dec!(50.00)))
//!     .item("Hair styling", 1, Money::new(dec!(25.00)))
//!     .tax(Percentage::new(dec!(18)));
//!
//! let invoice = service.create_invoice(draft).await?;
//! assert_eq!(totals::total(&invoice)?, Money::new(dec!(147.50)));
//! ```

pub mod error;
pub mod invoice;
pub mod line_item;
pub mod numbering;
pub mod ports;
pub mod services;
pub mod totals;

pub use error::BillingError;
pub use invoice::{Invoice, InvoiceDraft, InvoiceQuery, PaymentStatus};
pub use line_item::{line_total, LineItem, LineItemDraft, LineItemFault};
pub use numbering::{InvoiceNumber, InvoiceNumbering};
pub use ports::{CustomerRemoval, InvoicePort};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockInvoicePort;
pub use services::BillingService;
pub use totals::InvoiceTotals;
