//! Invoice repository implementation
//!
//! An invoice header and its items are always written in one transaction.
//! Edits lock the header row with `SELECT ... FOR UPDATE` so concurrent
//! writers to the same invoice are serialized, and reads run in a
//! repeatable-read snapshot so header and items always match.
//!
//! Customer removal also runs here: the customer row is locked before its
//! invoices are counted, so an invoice insert for the same customer waits on
//! the foreign key check and either lands before the count or fails after
//! the delete.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Unique constraint on `invoices.invoice_number`
pub const INVOICE_NUMBER_CONSTRAINT: &str = "invoices_invoice_number_key";

/// Invoice header row
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_status: String,
    pub discount_percentage: Decimal,
    pub tax_percentage: Decimal,
    pub advance_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invoice line item row
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceItemRow {
    pub item_id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A header together with its items in display order
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    pub invoice: InvoiceRow,
    pub items: Vec<InvoiceItemRow>,
}

/// Stored number and creation time of an invoice being replaced
#[derive(Debug, Clone, FromRow)]
pub struct LockedInvoice {
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
}

/// Listing filter in column terms
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub customer_id: Option<Uuid>,
    pub payment_status: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Matched against the invoice number and the customer's name
    pub search: Option<String>,
}

/// Result of a customer removal in row terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerRemovalRows {
    /// Customer deleted along with this many invoices
    Removed(u64),
    /// Nothing deleted; this many invoices reference the customer
    Refused(i64),
}

const INVOICE_COLUMNS: &str = "invoice_id, invoice_number, customer_id, issue_date, due_date, \
     payment_status, discount_percentage, tax_percentage, advance_amount, notes, \
     created_at, updated_at";

const ITEM_COLUMNS: &str = "item_id, invoice_id, position, description, quantity, unit_price";

/// Repository for invoices and their line items
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a header and all of its items atomically
    ///
    /// Any failure, including a duplicate invoice number or a rejected
    /// item, rolls the whole invoice back.
    pub async fn insert(&self, invoice: &InvoiceRow, items: &[InvoiceItemRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                invoice_id, invoice_number, customer_id, issue_date, due_date,
                payment_status, discount_percentage, tax_percentage, advance_amount,
                notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(invoice.invoice_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.customer_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(&invoice.payment_status)
        .bind(invoice.discount_percentage)
        .bind(invoice.tax_percentage)
        .bind(invoice.advance_amount)
        .bind(&invoice.notes)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Replaces a header and its full item set atomically
    ///
    /// The invoice number and creation time are never overwritten; the
    /// stored values are returned.
    pub async fn replace(
        &self,
        invoice: &InvoiceRow,
        items: &[InvoiceItemRow],
    ) -> Result<LockedInvoice, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_as::<_, LockedInvoice>(
            "SELECT invoice_number, created_at FROM invoices WHERE invoice_id = $1 FOR UPDATE",
        )
        .bind(invoice.invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Invoice", invoice.invoice_id))?;

        sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $2, issue_date = $3, due_date = $4, payment_status = $5,
                discount_percentage = $6, tax_percentage = $7, advance_amount = $8,
                notes = $9, updated_at = $10
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice.invoice_id)
        .bind(invoice.customer_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(&invoice.payment_status)
        .bind(invoice.discount_percentage)
        .bind(invoice.tax_percentage)
        .bind(invoice.advance_amount)
        .bind(&invoice.notes)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice.invoice_id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(locked)
    }

    /// Fetches an invoice with its items
    pub async fn get(&self, invoice_id: Uuid) -> Result<InvoiceWithItems, DatabaseError> {
        let mut tx = begin_snapshot(&self.pool).await?;

        let invoice = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices WHERE invoice_id = $1",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Invoice", invoice_id))?;

        let items = sqlx::query_as::<_, InvoiceItemRow>(&format!(
            "SELECT {} FROM invoice_items WHERE invoice_id = $1 ORDER BY position",
            ITEM_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists invoices matching the filter, newest first then by number
    pub async fn find(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceWithItems>, DatabaseError> {
        let mut tx = begin_snapshot(&self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM invoices WHERE TRUE",
            INVOICE_COLUMNS
        ));
        if let Some(customer_id) = filter.customer_id {
            query.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(status) = &filter.payment_status {
            query.push(" AND payment_status = ").push_bind(status.clone());
        }
        if let Some(year) = filter.year {
            query
                .push(" AND EXTRACT(YEAR FROM issue_date)::INTEGER = ")
                .push_bind(year);
        }
        if let Some(month) = filter.month {
            query
                .push(" AND EXTRACT(MONTH FROM issue_date)::INTEGER = ")
                .push_bind(month as i32);
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            query
                .push(" AND (invoice_number ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_id IN (SELECT customer_id FROM customers WHERE name ILIKE ")
                .push_bind(pattern)
                .push("))");
        }
        query.push(" ORDER BY created_at DESC, invoice_number");

        let invoices: Vec<InvoiceRow> = query.build_query_as().fetch_all(&mut *tx).await?;

        let ids: Vec<Uuid> = invoices.iter().map(|i| i.invoice_id).collect();
        let item_rows = sqlx::query_as::<_, InvoiceItemRow>(&format!(
            "SELECT {} FROM invoice_items WHERE invoice_id = ANY($1) ORDER BY invoice_id, position",
            ITEM_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut items_by_invoice: HashMap<Uuid, Vec<InvoiceItemRow>> = HashMap::new();
        for item in item_rows {
            items_by_invoice.entry(item.invoice_id).or_default().push(item);
        }

        Ok(invoices
            .into_iter()
            .map(|invoice| {
                let items = items_by_invoice.remove(&invoice.invoice_id).unwrap_or_default();
                InvoiceWithItems { invoice, items }
            })
            .collect())
    }

    /// Deletes an invoice; items follow through `ON DELETE CASCADE`
    pub async fn delete(&self, invoice_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM invoices WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Invoice", invoice_id));
        }
        Ok(())
    }

    /// Checks whether an invoice number is taken
    pub async fn number_exists(&self, invoice_number: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM invoices WHERE invoice_number = $1)",
        )
        .bind(invoice_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Deletes a customer in one transaction, with their invoices when `cascade`
    ///
    /// Without `cascade`, a customer that still has invoices is left alone
    /// and the count is returned as `Refused`.
    pub async fn remove_customer(
        &self,
        customer_id: Uuid,
        cascade: bool,
    ) -> Result<CustomerRemovalRows, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, Uuid>(
            "SELECT customer_id FROM customers WHERE customer_id = $1 FOR UPDATE",
        )
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", customer_id))?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invoices WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await?;

        if !cascade && count > 0 {
            tx.rollback().await?;
            return Ok(CustomerRemovalRows::Refused(count));
        }

        let removed = sqlx::query("DELETE FROM invoices WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CustomerRemovalRows::Removed(removed))
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    items: &[InvoiceItemRow],
) -> Result<(), DatabaseError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                item_id, invoice_id, position, description, quantity, unit_price
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.item_id)
        .bind(item.invoice_id)
        .bind(item.position)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn begin_snapshot(pool: &PgPool) -> Result<Transaction<'static, Postgres>, DatabaseError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("glam"), "%glam%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
