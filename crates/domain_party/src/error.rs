//! Party domain errors

use thiserror::Error;
use validator::ValidationErrors;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Customer with the given ID was not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Customer data failed validation
    #[error("Invalid customer data on '{field}': {message}")]
    InvalidData {
        field: String,
        message: String,
    },

    /// Unknown deletion policy name in configuration
    #[error("Unknown customer deletion policy: {0}")]
    UnknownDeletionPolicy(String),
}

impl PartyError {
    /// Creates a CustomerNotFound error from any ID type
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        PartyError::CustomerNotFound(id.to_string())
    }

    /// Returns the offending field, if any
    pub fn field_name(&self) -> Option<&str> {
        match self {
            PartyError::InvalidData { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for PartyError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();

        PartyError::InvalidData {
            field: fields.into_iter().next().unwrap_or_else(|| "customer".to_string()),
            message: errors.to_string(),
        }
    }
}
