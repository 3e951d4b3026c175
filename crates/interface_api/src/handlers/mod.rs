//! Request handlers, one module per resource

pub mod customers;
pub mod health;
pub mod invoices;
pub mod reports;
