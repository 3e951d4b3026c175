//! Customer Domain Ports
//!
//! The `CustomerPort` trait defines everything the rest of the system needs
//! from customer storage. Adapters:
//!
//! - **Internal Adapter**: PostgreSQL (`infra_db::adapters::PostgresCustomerAdapter`)
//! - **Mock Adapter**: in-memory, for tests and local runs (feature `mock`)

use async_trait::async_trait;

use core_kernel::{CustomerId, DomainPort, HealthCheckable, PortError};

use crate::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::error::PartyError;

/// Converts a party-domain validation failure into a port error
pub fn party_to_port_error(error: PartyError) -> PortError {
    match error {
        PartyError::CustomerNotFound(id) => PortError::not_found("Customer", id),
        PartyError::InvalidData { field, message } => PortError::validation_field(message, field),
        other => PortError::validation(other.to_string()),
    }
}

/// Storage port for customers
#[async_trait]
pub trait CustomerPort: DomainPort + HealthCheckable {
    /// Validates and stores a new customer
    async fn create_customer(&self, request: NewCustomer) -> Result<Customer, PortError>;

    /// Retrieves a customer by ID, or `PortError::NotFound`
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError>;

    /// Lists all customers ordered by name
    async fn list_customers(&self) -> Result<Vec<Customer>, PortError>;

    /// Validates and applies an update
    async fn update_customer(
        &self,
        id: CustomerId,
        update: UpdateCustomer,
    ) -> Result<Customer, PortError>;

    /// Removes a customer record that no invoice references
    ///
    /// Customers with invoices are removed through the invoice storage,
    /// which applies the deletion policy.
    async fn delete_customer(&self, id: CustomerId) -> Result<(), PortError>;

    /// Customers whose name, email or phone contains `term`, ordered by name
    async fn search_customers(&self, term: &str) -> Result<Vec<Customer>, PortError> {
        Ok(self
            .list_customers()
            .await?
            .into_iter()
            .filter(|c| c.matches_search(term))
            .collect())
    }

    /// Checks whether a customer exists
    async fn exists(&self, id: CustomerId) -> Result<bool, PortError> {
        match self.get_customer(id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Mock implementation of CustomerPort for testing
///
/// Stores customers in memory; useful for unit tests and for running the
/// API without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of CustomerPort
    #[derive(Debug, Default, Clone)]
    pub struct MockCustomerPort {
        customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
    }

    impl MockCustomerPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with customers for testing
        pub async fn with_customers(customers: Vec<Customer>) -> Self {
            let port = Self::new();
            {
                let mut map = port.customers.write().await;
                for customer in customers {
                    map.insert(customer.id, customer);
                }
            }
            port
        }
    }

    impl DomainPort for MockCustomerPort {}

    #[async_trait]
    impl HealthCheckable for MockCustomerPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-customer-port")
        }
    }

    #[async_trait]
    impl CustomerPort for MockCustomerPort {
        async fn create_customer(&self, request: NewCustomer) -> Result<Customer, PortError> {
            request.check().map_err(party_to_port_error)?;
            let customer = Customer::from_request(request);
            self.customers.write().await.insert(customer.id, customer.clone());
            Ok(customer)
        }

        async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
            self.customers
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }

        async fn list_customers(&self) -> Result<Vec<Customer>, PortError> {
            let mut customers: Vec<Customer> =
                self.customers.read().await.values().cloned().collect();
            customers.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
            Ok(customers)
        }

        async fn update_customer(
            &self,
            id: CustomerId,
            update: UpdateCustomer,
        ) -> Result<Customer, PortError> {
            update.check().map_err(party_to_port_error)?;
            let mut customers = self.customers.write().await;
            let customer = customers
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Customer", id))?;
            customer.apply(update);
            Ok(customer.clone())
        }

        async fn delete_customer(&self, id: CustomerId) -> Result<(), PortError> {
            self.customers
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Customer", id))
        }
    }
}
