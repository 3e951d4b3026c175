//! Infrastructure Database Layer
//!
//! PostgreSQL storage for customers and invoices using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: repositories own the SQL,
//! adapters implement the domain ports on top of them. Schema migrations
//! live in the workspace `migrations/` directory and are embedded at build
//! time.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresInvoiceAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/studio")).await?;
//! run_migrations(&pool).await?;
//! let invoices = PostgresInvoiceAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresCustomerAdapter, PostgresInvoiceAdapter};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
