//! Party Domain - studio customers
//!
//! Customers are the brides and other clients the studio bills. This crate
//! holds the customer model, its validation rules, the storage port used by
//! the rest of the system, and the policy that decides what happens to a
//! customer's invoices when the customer is removed.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_party::{CustomerPort, NewCustomer};
//!
//! let customer = port
//!     .create_customer(NewCustomer::named("Ayesha").with_email("ayesha@example.com"))
//!     .await?;
//! ```

pub mod customer;
pub mod error;
pub mod ports;

pub use customer::{Customer, CustomerDeletionPolicy, NewCustomer, UpdateCustomer};
pub use error::PartyError;
pub use ports::{CustomerPort, party_to_port_error};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockCustomerPort;
