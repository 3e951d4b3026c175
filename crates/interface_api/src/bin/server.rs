//! Studio Ledger - API Server Binary
//!
//! Starts the HTTP API for invoices, customers and reports.
//!
//! # Usage
//!
//! ```bash
//! # Run against PostgreSQL
//! API_DATABASE_URL=postgres://localhost/studio cargo run --bin studio-api
//!
//! # Run with in-process storage
//! API_STORAGE=memory cargo run --bin studio-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` / `DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_STORAGE` - `postgres` or `memory` (default: postgres)
//! * `API_INVOICE_PREFIX` - Prefix of generated invoice numbers (default: INV)
//! * `API_INVOICE_NUMBER_ATTEMPTS` - Candidates tried per new invoice (default: 5)
//! * `API_CUSTOMER_DELETION` - `cascade` or `restrict` (default: cascade)

use interface_api::config::{ApiConfig, StorageBackend};
use interface_api::{create_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PostgresCustomerAdapter, PostgresInvoiceAdapter,
};

/// Main entry point for the API server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - Database connection or migration fails
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    config.validate()?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        customer_deletion = %config.customer_deletion,
        "Starting Studio Ledger API Server"
    );

    let state = build_state(config.clone()).await?;
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Connects the configured storage backend
async fn build_state(config: ApiConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(AppState::in_memory(config)?)
        }
        StorageBackend::Postgres => {
            let pool = create_pool(DatabaseConfig::new(config.database_url.clone())).await?;
            run_migrations(&pool).await?;
            Ok(AppState::new(
                Arc::new(PostgresInvoiceAdapter::new(pool.clone())),
                Arc::new(PostgresCustomerAdapter::new(pool)),
                config,
            )?)
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
