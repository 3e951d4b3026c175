//! Customer repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Customer row as stored
#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub customer_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const CUSTOMER_COLUMNS: &str =
    "customer_id, name, email, phone, address, created_at, updated_at";

/// Repository for customer records
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a customer row
    pub async fn insert(&self, row: &CustomerRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                customer_id, name, email, phone, address, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.customer_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.address)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches a customer by ID
    pub async fn get(&self, customer_id: Uuid) -> Result<CustomerRow, DatabaseError> {
        sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE customer_id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", customer_id))
    }

    /// Lists all customers by name
    pub async fn list(&self) -> Result<Vec<CustomerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers ORDER BY name, created_at",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Overwrites the editable columns of a customer
    pub async fn update(&self, row: &CustomerRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, email = $3, phone = $4, address = $5, updated_at = $6
            WHERE customer_id = $1
            "#,
        )
        .bind(row.customer_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.address)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Customer", row.customer_id));
        }
        Ok(())
    }

    /// Deletes a customer record
    ///
    /// Fails with a foreign key violation while invoices reference the
    /// customer; `InvoiceRepository::remove_customer` handles those.
    pub async fn delete(&self, customer_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Customer", customer_id));
        }
        Ok(())
    }
}
