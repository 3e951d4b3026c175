//! Invoice DTOs
//!
//! Invoices are submitted as `InvoiceDraft`. Responses carry the derived
//! totals next to the stored fields; totals are never part of a request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{CustomerId, Money, Percentage};
use domain_billing::{Invoice, InvoiceQuery, InvoiceTotals, LineItem, PaymentStatus};
use domain_reporting::ReportFilter;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<Money>,
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            line_total: item.line_total().ok(),
            id: item.id.into(),
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub discount_percentage: Percentage,
    pub tax_percentage: Percentage,
    pub advance_amount: Money,
    pub notes: Option<String>,
    pub items: Vec<LineItemResponse>,
    /// Absent when the stored values cannot be totalled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<InvoiceTotals>,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceResponse {
    /// Builds the view of an invoice as of `today`
    pub fn new(invoice: Invoice, today: NaiveDate) -> Self {
        let totals = invoice.totals().ok();
        let is_overdue = invoice.is_overdue(today);
        Self {
            id: invoice.id.into(),
            invoice_number: invoice.invoice_number.to_string(),
            customer_id: invoice.customer_id.into(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            payment_status: invoice.payment_status,
            discount_percentage: invoice.discount_percentage,
            tax_percentage: invoice.tax_percentage,
            advance_amount: invoice.advance_amount,
            notes: invoice.notes,
            items: invoice.items.into_iter().map(LineItemResponse::from).collect(),
            totals,
            is_overdue,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// Query string of `GET /invoices`
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesParams {
    pub customer_id: Option<Uuid>,
    pub status: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Fragment of the invoice number or customer name
    pub search: Option<String>,
}

impl ListInvoicesParams {
    /// Validates the parameters into a storage query
    pub fn into_query(self) -> Result<InvoiceQuery, ApiError> {
        let period = ReportFilter::new(self.month, self.year)?;
        let payment_status = self
            .status
            .map(|s| s.parse::<PaymentStatus>())
            .transpose()
            .map_err(|e| ApiError::validation_field(e, "status"))?;

        Ok(InvoiceQuery {
            customer_id: self.customer_id.map(CustomerId::from_uuid),
            payment_status,
            search: self.search,
            ..period.to_query()
        })
    }
}
