//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! studio billing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for customers, line items and dates
//! - `builders`: `InvoiceBuilder` for invoices and drafts
//! - `database`: PostgreSQL testcontainer with the schema applied
//! - `assertions`: Ledger-aware assertion helpers
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
