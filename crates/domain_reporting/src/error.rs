//! Reporting domain errors

use thiserror::Error;

/// Errors that can occur when building a report
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Month outside 1-12
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    /// Year outside the supported calendar range
    #[error("Invalid year: {0}")]
    InvalidYear(i32),
}

impl ReportError {
    /// Name of the offending query parameter
    pub fn field_name(&self) -> &'static str {
        match self {
            ReportError::InvalidMonth(_) => "month",
            ReportError::InvalidYear(_) => "year",
        }
    }
}
