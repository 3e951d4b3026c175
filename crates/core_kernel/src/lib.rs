//! Core Kernel - Foundational types for the studio back office
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money and percentage types with precise decimal arithmetic
//! - Strongly typed identifiers
//! - Port infrastructure for swappable storage adapters

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, MoneyError, Percentage, MONEY_SCALE, round_money};
pub use identifiers::{CustomerId, InvoiceId, LineItemId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
