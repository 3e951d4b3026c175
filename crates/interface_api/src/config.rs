//! API configuration

use serde::Deserialize;

use core_kernel::CoreError;
use domain_billing::numbering::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PREFIX};
use domain_billing::InvoiceNumbering;
use domain_party::CustomerDeletionPolicy;

/// Where invoices and customers are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL through `infra_db`
    #[default]
    Postgres,
    /// In-process maps; data is lost on restart
    Memory,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    pub storage: StorageBackend,
    /// Prefix of generated invoice numbers
    pub invoice_prefix: String,
    /// Candidates tried before invoice creation gives up
    pub invoice_number_attempts: u32,
    /// What removing a customer does to their invoices
    pub customer_deletion: CustomerDeletionPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/studio".to_string(),
            log_level: "info".to_string(),
            storage: StorageBackend::default(),
            invoice_prefix: DEFAULT_PREFIX.to_string(),
            invoice_number_attempts: DEFAULT_MAX_ATTEMPTS,
            customer_deletion: CustomerDeletionPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Unset keys keep their defaults. A plain `DATABASE_URL` is used when
    /// `API_DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_default("database_url", url)?;
        }
        builder
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the invoice numbering settings
    pub fn numbering(&self) -> Result<InvoiceNumbering, CoreError> {
        InvoiceNumbering::new(self.invoice_prefix.clone(), self.invoice_number_attempts)
            .map_err(|e| CoreError::configuration(format!("invoice_prefix: {}", e)))
    }

    /// Checks values that deserialization alone cannot
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.port == 0 {
            return Err(CoreError::configuration("port must not be 0"));
        }
        if self.invoice_number_attempts == 0 {
            return Err(CoreError::configuration(
                "invoice_number_attempts must be at least 1",
            ));
        }
        if self.storage == StorageBackend::Postgres && self.database_url.trim().is_empty() {
            return Err(CoreError::configuration(
                "database_url is required for postgres storage",
            ));
        }
        self.numbering().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.customer_deletion, CustomerDeletionPolicy::Cascade);
        assert_eq!(config.numbering().unwrap().prefix(), "INV");
    }

    #[test]
    fn test_bad_prefix_rejected() {
        let config = ApiConfig {
            invoice_prefix: "NOT VALID".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = ApiConfig {
            invoice_number_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_storage_needs_no_database() {
        let config = ApiConfig {
            storage: StorageBackend::Memory,
            database_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ApiConfig = serde_json::from_str(
            r#"{"port": 9090, "storage": "memory", "customer_deletion": "restrict"}"#,
        )
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.customer_deletion, CustomerDeletionPolicy::Restrict);
        assert_eq!(config.invoice_prefix, "INV");
    }
}
