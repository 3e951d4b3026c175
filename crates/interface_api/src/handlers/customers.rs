//! Customer handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::CustomerId;
use domain_billing::BillingError;
use domain_party::{CustomerPort, NewCustomer, UpdateCustomer};

use crate::dto::customer::*;
use crate::{error::ApiError, extract::ApiJson, AppState};

/// Creates a customer
pub async fn create_customer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewCustomer>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let customer = state.billing.customer_port().create_customer(request).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Lists customers by name, optionally narrowed by a search term
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<ListCustomersParams>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let port = state.billing.customer_port();
    let customers = match params.term() {
        Some(term) => port.search_customers(term).await?,
        None => port.list_customers().await?,
    };
    Ok(Json(customers.into_iter().map(CustomerResponse::from).collect()))
}

/// Gets a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state
        .billing
        .customer_port()
        .get_customer(CustomerId::from_uuid(id))
        .await?;
    Ok(Json(customer.into()))
}

/// Updates a customer's contact details
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateCustomer>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state
        .billing
        .customer_port()
        .update_customer(CustomerId::from_uuid(id), request)
        .await?;
    Ok(Json(customer.into()))
}

/// Removes a customer under the configured deletion policy
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerRemovedResponse>, ApiError> {
    let invoices_removed = state
        .billing
        .remove_customer(CustomerId::from_uuid(id))
        .await
        .map_err(|e| match e {
            e @ BillingError::CustomerNotFound(_) => ApiError::NotFound(e.to_string()),
            e => e.into(),
        })?;
    Ok(Json(CustomerRemovedResponse {
        id,
        invoices_removed,
    }))
}
