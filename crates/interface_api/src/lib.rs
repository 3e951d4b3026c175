//! HTTP API Layer
//!
//! This crate provides the REST API for the studio back office using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for customers, invoices, reports and health
//! - **DTOs**: Response views and query parameters
//! - **Error Handling**: Consistent JSON error responses
//! - **Extraction**: JSON bodies decoded with field-level errors
//!
//! Handlers only translate HTTP to calls on [`BillingService`] and the
//! reporting functions; all rules live in the domain crates.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, config::ApiConfig};
//!
//! let state = AppState::in_memory(ApiConfig::default())?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::CoreError;
use domain_billing::{BillingService, InvoicePort, MockInvoicePort};
use domain_party::{CustomerPort, MockCustomerPort};

use crate::config::ApiConfig;
use crate::handlers::{customers, health, invoices, reports};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub billing: BillingService,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the billing service to the given storage adapters
    pub fn new(
        invoices: Arc<dyn InvoicePort>,
        customers: Arc<dyn CustomerPort>,
        config: ApiConfig,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let billing = BillingService::new(invoices, customers)
            .with_numbering(config.numbering()?)
            .with_deletion_policy(config.customer_deletion);
        Ok(Self { billing, config })
    }

    /// State backed by in-process storage
    pub fn in_memory(config: ApiConfig) -> Result<Self, CoreError> {
        let customers = MockCustomerPort::new();
        Self::new(
            Arc::new(MockInvoicePort::linked(customers.clone())),
            Arc::new(customers),
            config,
        )
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let customer_routes = Router::new()
        .route(
            "/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        );

    let invoice_routes = Router::new()
        .route(
            "/",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/:id",
            get(invoices::get_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        );

    let report_routes = Router::new()
        .route("/summary", get(reports::summary))
        .route("/monthly", get(reports::monthly));

    let api_routes = Router::new()
        .nest("/customers", customer_routes)
        .nest("/invoices", invoice_routes)
        .nest("/reports", report_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
