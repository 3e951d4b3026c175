//! Repository implementations for domain entities
//!
//! Repositories encapsulate SQL and work in row types; the adapters map
//! rows to domain types.
//!
//! Each repository follows these principles:
//! - An invoice header and its items change in one transaction
//! - Reads that span tables run in a repeatable-read snapshot
//! - Queries are built at runtime with bound parameters

pub mod customer;
pub mod invoice;

pub use customer::{CustomerRepository, CustomerRow};
pub use invoice::{
    CustomerRemovalRows, InvoiceFilter, InvoiceItemRow, InvoiceRepository, InvoiceRow,
    InvoiceWithItems,
};
