//! PostgreSQL Invoice Adapter
//!
//! Implements `InvoicePort` on top of `InvoiceRepository`. Header and items
//! travel together: every write is one transaction and every read is one
//! snapshot.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    CustomerId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, LineItemId, Money,
    Percentage, PortError,
};
use domain_billing::ports::INVOICE_NUMBER_FIELD;
use domain_billing::{
    CustomerRemoval, Invoice, InvoiceNumber, InvoicePort, InvoiceQuery, LineItem, PaymentStatus,
};
use domain_party::CustomerDeletionPolicy;

use super::{db_to_port_error, ping};
use crate::error::DatabaseError;
use crate::repositories::invoice::{
    CustomerRemovalRows, InvoiceFilter, InvoiceItemRow, InvoiceRepository, InvoiceRow,
    InvoiceWithItems, INVOICE_NUMBER_CONSTRAINT,
};

/// PostgreSQL-backed implementation of the InvoicePort trait
///
/// Error translation:
/// - unique violation on `invoices_invoice_number_key` -> `Conflict` on `invoice_number`
/// - foreign key violation -> `Validation` on `customer_id`
/// - unreadable stored values -> `Internal`
#[derive(Debug, Clone)]
pub struct PostgresInvoiceAdapter {
    repository: InvoiceRepository,
    pool: PgPool,
}

impl PostgresInvoiceAdapter {
    /// Creates a new PostgreSQL invoice adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InvoiceRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &InvoiceRepository {
        &self.repository
    }
}

impl DomainPort for PostgresInvoiceAdapter {}

#[async_trait]
impl HealthCheckable for PostgresInvoiceAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-invoice-adapter").await
    }
}

#[async_trait]
impl InvoicePort for PostgresInvoiceAdapter {
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, invoice_number = %invoice.invoice_number))]
    async fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, PortError> {
        ensure_items(&invoice)?;
        let (header, items) = invoice_to_rows(&invoice)?;

        self.repository
            .insert(&header, &items)
            .await
            .map_err(|e| write_error(e, &invoice.invoice_number))?;

        debug!(items = items.len(), "Invoice stored");
        Ok(invoice)
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn replace_invoice(&self, mut invoice: Invoice) -> Result<Invoice, PortError> {
        ensure_items(&invoice)?;
        let (header, items) = invoice_to_rows(&invoice)?;

        let stored = self
            .repository
            .replace(&header, &items)
            .await
            .map_err(|e| write_error(e, &invoice.invoice_number))?;

        invoice.invoice_number = parse_number(&stored.invoice_number).map_err(db_to_port_error)?;
        invoice.created_at = stored.created_at;

        debug!(items = items.len(), "Invoice replaced");
        Ok(invoice)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        let stored = self
            .repository
            .get(*id.as_uuid())
            .await
            .map_err(db_to_port_error)?;
        rows_to_invoice(stored).map_err(db_to_port_error)
    }

    #[instrument(skip(self, query))]
    async fn find_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        let filter = InvoiceFilter {
            customer_id: query.customer_id.map(|id| *id.as_uuid()),
            payment_status: query.payment_status.map(|s| s.as_str().to_string()),
            year: query.year,
            month: query.month,
            search: query.search_term().map(str::to_string),
        };

        let rows = self.repository.find(&filter).await.map_err(db_to_port_error)?;
        debug!(count = rows.len(), "Listed invoices");

        rows.into_iter()
            .map(rows_to_invoice)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn delete_invoice(&self, id: InvoiceId) -> Result<(), PortError> {
        self.repository
            .delete(*id.as_uuid())
            .await
            .map_err(db_to_port_error)
    }

    async fn number_exists(&self, number: &InvoiceNumber) -> Result<bool, PortError> {
        self.repository
            .number_exists(number.as_str())
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(customer_id = %customer_id, policy = %policy))]
    async fn remove_customer(
        &self,
        customer_id: CustomerId,
        policy: CustomerDeletionPolicy,
    ) -> Result<CustomerRemoval, PortError> {
        let cascade = policy == CustomerDeletionPolicy::Cascade;
        let outcome = self
            .repository
            .remove_customer(*customer_id.as_uuid(), cascade)
            .await
            .map_err(db_to_port_error)?;
        debug!(?outcome, "Customer removal applied");

        Ok(match outcome {
            CustomerRemovalRows::Removed(n) => CustomerRemoval::Removed {
                invoices: usize::try_from(n).unwrap_or(usize::MAX),
            },
            CustomerRemovalRows::Refused(n) => CustomerRemoval::Refused {
                invoices: usize::try_from(n).unwrap_or(0),
            },
        })
    }
}

fn ensure_items(invoice: &Invoice) -> Result<(), PortError> {
    if invoice.items.is_empty() {
        return Err(PortError::validation_field(
            "invoice must contain at least one line item",
            "items",
        ));
    }
    Ok(())
}

fn write_error(e: DatabaseError, number: &InvoiceNumber) -> PortError {
    if e.is_duplicate_on(INVOICE_NUMBER_CONSTRAINT) {
        return PortError::conflict(
            format!("invoice number {} already exists", number),
            INVOICE_NUMBER_FIELD,
        );
    }
    if let DatabaseError::ForeignKeyViolation { message, .. } = &e {
        return PortError::validation_field(message.clone(), "customer_id");
    }
    db_to_port_error(e)
}

fn invoice_to_rows(invoice: &Invoice) -> Result<(InvoiceRow, Vec<InvoiceItemRow>), PortError> {
    let invoice_id = *invoice.id.as_uuid();

    let header = InvoiceRow {
        invoice_id,
        invoice_number: invoice.invoice_number.as_str().to_string(),
        customer_id: *invoice.customer_id.as_uuid(),
        issue_date: invoice.issue_date,
        due_date: invoice.due_date,
        payment_status: invoice.payment_status.as_str().to_string(),
        discount_percentage: invoice.discount_percentage.value(),
        tax_percentage: invoice.tax_percentage.value(),
        advance_amount: invoice.advance_amount.amount(),
        notes: invoice.notes.clone(),
        created_at: invoice.created_at,
        updated_at: invoice.updated_at,
    };

    let items = invoice
        .items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                PortError::validation_field(
                    format!("quantity {} is too large", item.quantity),
                    format!("items[{}].quantity", position),
                )
            })?;
            Ok(InvoiceItemRow {
                item_id: *item.id.as_uuid(),
                invoice_id,
                position: position as i32,
                description: item.description.clone(),
                quantity,
                unit_price: item.unit_price.amount(),
            })
        })
        .collect::<Result<Vec<_>, PortError>>()?;

    Ok((header, items))
}

fn parse_number(value: &str) -> Result<InvoiceNumber, DatabaseError> {
    InvoiceNumber::parse(value).map_err(|e| DatabaseError::decode("invoice_number", e.to_string()))
}

fn rows_to_invoice(stored: InvoiceWithItems) -> Result<Invoice, DatabaseError> {
    let InvoiceWithItems { invoice: row, items } = stored;

    let payment_status: PaymentStatus = row
        .payment_status
        .parse()
        .map_err(|e: String| DatabaseError::decode("payment_status", e))?;

    let items = items
        .into_iter()
        .map(|item| {
            let quantity = u32::try_from(item.quantity).map_err(|_| {
                DatabaseError::decode("quantity", format!("negative quantity {}", item.quantity))
            })?;
            Ok(LineItem {
                id: LineItemId::from_uuid(item.item_id),
                description: item.description,
                quantity,
                unit_price: Money::new(item.unit_price),
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(row.invoice_id),
        invoice_number: parse_number(&row.invoice_number)?,
        customer_id: CustomerId::from_uuid(row.customer_id),
        issue_date: row.issue_date,
        due_date: row.due_date,
        payment_status,
        discount_percentage: Percentage::new(row.discount_percentage),
        tax_percentage: Percentage::new(row.tax_percentage),
        advance_amount: Money::new(row.advance_amount),
        notes: row.notes,
        items,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
