//! Invoice handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::InvoiceId;
use domain_billing::InvoiceDraft;

use crate::dto::invoice::*;
use crate::{error::ApiError, extract::ApiJson, AppState};

/// Creates an invoice with its line items
pub async fn create_invoice(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<InvoiceDraft>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let invoice = state.billing.create_invoice(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::new(invoice, Utc::now().date_naive())),
    ))
}

/// Lists invoices, optionally filtered by customer, status and period
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListInvoicesParams>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let query = params.into_query()?;
    let today = Utc::now().date_naive();

    let invoices = state.billing.list_invoices(&query).await?;
    Ok(Json(
        invoices
            .into_iter()
            .map(|invoice| InvoiceResponse::new(invoice, today))
            .collect(),
    ))
}

/// Gets an invoice with its totals
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state.billing.get_invoice(InvoiceId::from_uuid(id)).await?;
    Ok(Json(InvoiceResponse::new(invoice, Utc::now().date_naive())))
}

/// Replaces an invoice's fields and line items
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(draft): ApiJson<InvoiceDraft>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state
        .billing
        .update_invoice(InvoiceId::from_uuid(id), draft)
        .await?;
    Ok(Json(InvoiceResponse::new(invoice, Utc::now().date_naive())))
}

/// Deletes an invoice and its line items
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.billing.delete_invoice(InvoiceId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
