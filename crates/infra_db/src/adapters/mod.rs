//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter:
//! - Implements the domain's port trait
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::{PostgresCustomerAdapter, PostgresInvoiceAdapter};
//! use domain_billing::BillingService;
//! use std::sync::Arc;
//!
//! let service = BillingService::new(
//!     Arc::new(PostgresInvoiceAdapter::new(pool.clone())),
//!     Arc::new(PostgresCustomerAdapter::new(pool)),
//! );
//! ```

pub mod customer;
pub mod invoice;

pub use customer::PostgresCustomerAdapter;
pub use invoice::PostgresInvoiceAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult, PortError};

use crate::error::DatabaseError;

/// Converts a database error to a port error
///
/// Constraint-specific mappings (such as a taken invoice number) are done
/// by the adapter that owns the constraint before falling back to this.
pub(crate) fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
        DatabaseError::DuplicateEntry { message, constraint } => PortError::Conflict {
            message,
            field: constraint,
        },
        DatabaseError::ForeignKeyViolation { message, .. } => PortError::validation(message),
        DatabaseError::ConstraintViolation(message) => PortError::validation(message),
        DatabaseError::ConnectionFailed(message) => PortError::connection(message),
        DatabaseError::PoolExhausted => PortError::connection("connection pool exhausted"),
        other => PortError::internal(other.to_string()),
    }
}

/// Runs `SELECT 1` against the pool and reports latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
