//! PostgreSQL Customer Adapter
//!
//! Implements `CustomerPort` on top of `CustomerRepository`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_party::{party_to_port_error, Customer, CustomerPort, NewCustomer, UpdateCustomer};

use super::{db_to_port_error, ping};
use crate::error::DatabaseError;
use crate::repositories::customer::{CustomerRepository, CustomerRow};

/// PostgreSQL-backed implementation of the CustomerPort trait
///
/// `delete_customer` only succeeds for a customer without invoices; the
/// schema's `ON DELETE RESTRICT` refuses the rest with a `Conflict` on
/// `invoices`. Policy-driven removal lives in
/// [`PostgresInvoiceAdapter`](super::PostgresInvoiceAdapter).
#[derive(Debug, Clone)]
pub struct PostgresCustomerAdapter {
    repository: CustomerRepository,
    pool: PgPool,
}

impl PostgresCustomerAdapter {
    /// Creates a new PostgreSQL customer adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CustomerRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &CustomerRepository {
        &self.repository
    }
}

impl DomainPort for PostgresCustomerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCustomerAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-customer-adapter").await
    }
}

#[async_trait]
impl CustomerPort for PostgresCustomerAdapter {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_customer(&self, request: NewCustomer) -> Result<Customer, PortError> {
        request.check().map_err(party_to_port_error)?;
        let customer = Customer::from_request(request);

        self.repository
            .insert(&customer_to_row(&customer))
            .await
            .map_err(db_to_port_error)?;

        debug!(customer_id = %customer.id, "Customer stored");
        Ok(customer)
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
        let row = self
            .repository
            .get(*id.as_uuid())
            .await
            .map_err(db_to_port_error)?;
        Ok(row_to_customer(row))
    }

    #[instrument(skip(self))]
    async fn list_customers(&self) -> Result<Vec<Customer>, PortError> {
        let rows = self.repository.list().await.map_err(db_to_port_error)?;
        debug!(count = rows.len(), "Listed customers");
        Ok(rows.into_iter().map(row_to_customer).collect())
    }

    #[instrument(skip(self, update), fields(customer_id = %id))]
    async fn update_customer(
        &self,
        id: CustomerId,
        update: UpdateCustomer,
    ) -> Result<Customer, PortError> {
        update.check().map_err(party_to_port_error)?;

        let mut customer = self.get_customer(id).await?;
        customer.apply(update);

        self.repository
            .update(&customer_to_row(&customer))
            .await
            .map_err(db_to_port_error)?;

        debug!("Customer updated");
        Ok(customer)
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn delete_customer(&self, id: CustomerId) -> Result<(), PortError> {
        self.repository
            .delete(*id.as_uuid())
            .await
            .map_err(|e| match e {
                DatabaseError::ForeignKeyViolation { message, .. } => {
                    PortError::conflict(message, "invoices")
                }
                e => db_to_port_error(e),
            })?;
        debug!("Customer deleted");
        Ok(())
    }
}

fn customer_to_row(customer: &Customer) -> CustomerRow {
    CustomerRow {
        customer_id: *customer.id.as_uuid(),
        name: customer.name.clone(),
        email: customer.email.clone(),
        phone: customer.phone.clone(),
        address: customer.address.clone(),
        created_at: customer.created_at,
        updated_at: customer.updated_at,
    }
}

fn row_to_customer(row: CustomerRow) -> Customer {
    Customer {
        id: CustomerId::from_uuid(row.customer_id),
        name: row.name,
        email: row.email,
        phone: row.phone,
        address: row.address,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
