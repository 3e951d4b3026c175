//! Invoice Domain Ports
//!
//! `InvoicePort` is the storage boundary for invoices and their line items.
//! Implementations must store an invoice header and its items as one unit:
//! a reader never sees new items against an old header or the reverse.
//!
//! - **Internal Adapter**: PostgreSQL (`infra_db::adapters::PostgresInvoiceAdapter`)
//! - **Mock Adapter**: in-memory, for tests and local runs (feature `mock`)

use async_trait::async_trait;

use core_kernel::{CustomerId, DomainPort, HealthCheckable, InvoiceId, PortError};
use domain_party::CustomerDeletionPolicy;

use crate::invoice::{Invoice, InvoiceQuery};
use crate::numbering::InvoiceNumber;

/// Field name carried by number-collision conflicts
pub const INVOICE_NUMBER_FIELD: &str = "invoice_number";

/// Outcome of removing a customer under a deletion policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerRemoval {
    /// The customer is gone, together with this many invoices
    Removed { invoices: usize },
    /// The restrict policy kept the customer; this many invoices reference them
    Refused { invoices: usize },
}

/// Storage port for invoices
#[async_trait]
pub trait InvoicePort: DomainPort + HealthCheckable {
    /// Stores a new invoice with all of its items atomically
    ///
    /// Fails with `PortError::Conflict` on field `invoice_number` if the
    /// number is taken. Nothing is stored when any part of the write fails.
    async fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, PortError>;

    /// Replaces an invoice header and its complete item set atomically
    ///
    /// The stored invoice number is kept.
    async fn replace_invoice(&self, invoice: Invoice) -> Result<Invoice, PortError>;

    /// Retrieves an invoice with its items, or `PortError::NotFound`
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Lists matching invoices, newest first, ties broken by number
    async fn find_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, PortError>;

    /// Deletes an invoice and its items
    async fn delete_invoice(&self, id: InvoiceId) -> Result<(), PortError>;

    /// Checks whether a number is already in use
    async fn number_exists(&self, number: &InvoiceNumber) -> Result<bool, PortError>;

    /// Deletes a customer under `policy` as one unit
    ///
    /// `Cascade` removes the customer's invoices along with the record.
    /// `Restrict` keeps everything when any invoice references the customer.
    /// An invoice written concurrently for the same customer is either seen
    /// by the removal or rejected for its missing customer; it is never
    /// dropped silently. Fails with `PortError::NotFound` for an unknown
    /// customer.
    async fn remove_customer(
        &self,
        customer_id: CustomerId,
        policy: CustomerDeletionPolicy,
    ) -> Result<CustomerRemoval, PortError>;
}

/// Mock implementation of InvoicePort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;
    use domain_party::{CustomerPort, MockCustomerPort};

    use crate::invoice::listing_order;

    /// In-memory mock implementation of InvoicePort
    ///
    /// Linked to a [`MockCustomerPort`], it also plays the role of the
    /// customer foreign key: inserts for unknown customers are rejected and
    /// customer removal sees both stores under one lock.
    #[derive(Debug, Default, Clone)]
    pub struct MockInvoicePort {
        invoices: Arc<RwLock<HashMap<InvoiceId, Invoice>>>,
        customers: Option<MockCustomerPort>,
        forced_conflicts: Arc<AtomicU32>,
    }

    impl MockInvoicePort {
        /// Creates a new mock port without a customer store
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock port backed by the given customer store
        pub fn linked(customers: MockCustomerPort) -> Self {
            Self {
                customers: Some(customers),
                ..Self::default()
            }
        }

        /// Pre-populates with invoices for testing
        pub async fn with_invoices(invoices: Vec<Invoice>) -> Self {
            let port = Self::new();
            {
                let mut map = port.invoices.write().await;
                for invoice in invoices {
                    map.insert(invoice.id, invoice);
                }
            }
            port
        }

        /// Makes the next `count` inserts fail with a number conflict
        pub fn force_number_conflicts(&self, count: u32) {
            self.forced_conflicts.store(count, Ordering::SeqCst);
        }

        /// Number of stored invoices
        pub async fn len(&self) -> usize {
            self.invoices.read().await.len()
        }

        /// Returns true if nothing is stored
        pub async fn is_empty(&self) -> bool {
            self.invoices.read().await.is_empty()
        }

        fn customer_store(&self) -> Result<&MockCustomerPort, PortError> {
            self.customers
                .as_ref()
                .ok_or_else(|| PortError::internal("mock invoice port has no customer store"))
        }

        async fn check_customer(&self, customer_id: CustomerId) -> Result<(), PortError> {
            match &self.customers {
                Some(customers) if !customers.exists(customer_id).await? => Err(
                    PortError::validation_field(
                        format!("customer {} does not exist", customer_id),
                        "customer_id",
                    ),
                ),
                _ => Ok(()),
            }
        }

        fn take_forced_conflict(&self) -> bool {
            self.forced_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    fn number_conflict(number: &InvoiceNumber) -> PortError {
        PortError::conflict(
            format!("invoice number {} already exists", number),
            INVOICE_NUMBER_FIELD,
        )
    }

    impl DomainPort for MockInvoicePort {}

    #[async_trait]
    impl HealthCheckable for MockInvoicePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-invoice-port")
        }
    }

    #[async_trait]
    impl InvoicePort for MockInvoicePort {
        async fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, PortError> {
            if invoice.items.is_empty() {
                return Err(PortError::validation_field(
                    "invoice must contain at least one line item",
                    "items",
                ));
            }
            if self.take_forced_conflict() {
                return Err(number_conflict(&invoice.invoice_number));
            }

            let mut invoices = self.invoices.write().await;
            self.check_customer(invoice.customer_id).await?;
            if invoices
                .values()
                .any(|i| i.invoice_number == invoice.invoice_number)
            {
                return Err(number_conflict(&invoice.invoice_number));
            }
            invoices.insert(invoice.id, invoice.clone());
            Ok(invoice)
        }

        async fn replace_invoice(&self, mut invoice: Invoice) -> Result<Invoice, PortError> {
            if invoice.items.is_empty() {
                return Err(PortError::validation_field(
                    "invoice must contain at least one line item",
                    "items",
                ));
            }
            let mut invoices = self.invoices.write().await;
            self.check_customer(invoice.customer_id).await?;
            let stored = invoices
                .get_mut(&invoice.id)
                .ok_or_else(|| PortError::not_found("Invoice", invoice.id))?;
            invoice.invoice_number = stored.invoice_number.clone();
            invoice.created_at = stored.created_at;
            *stored = invoice.clone();
            Ok(invoice)
        }

        async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
            self.invoices
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn find_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
            let mut found: Vec<Invoice> = self
                .invoices
                .read()
                .await
                .values()
                .filter(|i| query.matches(i))
                .cloned()
                .collect();
            found.sort_by(listing_order);
            Ok(found)
        }

        async fn delete_invoice(&self, id: InvoiceId) -> Result<(), PortError> {
            self.invoices
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn number_exists(&self, number: &InvoiceNumber) -> Result<bool, PortError> {
            Ok(self
                .invoices
                .read()
                .await
                .values()
                .any(|i| &i.invoice_number == number))
        }

        async fn remove_customer(
            &self,
            customer_id: CustomerId,
            policy: CustomerDeletionPolicy,
        ) -> Result<CustomerRemoval, PortError> {
            let customers = self.customer_store()?;
            let mut invoices = self.invoices.write().await;
            customers.get_customer(customer_id).await?;

            let count = invoices
                .values()
                .filter(|i| i.customer_id == customer_id)
                .count();
            if policy == CustomerDeletionPolicy::Restrict && count > 0 {
                return Ok(CustomerRemoval::Refused { invoices: count });
            }

            customers.delete_customer(customer_id).await?;
            invoices.retain(|_, i| i.customer_id != customer_id);
            Ok(CustomerRemoval::Removed { invoices: count })
        }
    }
}
