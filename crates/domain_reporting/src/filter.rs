//! Report period filter

use serde::Serialize;

use domain_billing::{Invoice, InvoiceQuery};

use crate::error::ReportError;

/// Earliest year accepted in a filter
pub const MIN_YEAR: i32 = 1900;
/// Latest year accepted in a filter
pub const MAX_YEAR: i32 = 9999;

/// Which invoices a report covers, by issue date
///
/// Month and year apply independently:
///
/// | month | year | selects |
/// |---|---|---|
/// | set | set | that exact month |
/// | - | set | the whole year |
/// | set | - | that calendar month in every year |
/// | - | - | everything |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportFilter {
    month: Option<u32>,
    year: Option<i32>,
}

impl ReportFilter {
    /// Creates a validated filter
    pub fn new(month: Option<u32>, year: Option<i32>) -> Result<Self, ReportError> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(ReportError::InvalidMonth(m));
            }
        }
        if let Some(y) = year {
            check_year(y)?;
        }
        Ok(Self { month, year })
    }

    /// Matches every invoice
    pub fn all() -> Self {
        Self::default()
    }

    /// One whole year
    pub fn for_year(year: i32) -> Result<Self, ReportError> {
        Self::new(None, Some(year))
    }

    /// One month of one year
    pub fn for_month(year: i32, month: u32) -> Result<Self, ReportError> {
        Self::new(Some(month), Some(year))
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// Returns true if the invoice's issue date falls inside the filter
    pub fn matches(&self, invoice: &Invoice) -> bool {
        invoice.issued_in(self.year, self.month)
    }

    /// Equivalent storage query, so only relevant invoices are loaded
    pub fn to_query(&self) -> InvoiceQuery {
        InvoiceQuery {
            year: self.year,
            month: self.month,
            ..Default::default()
        }
    }
}

pub(crate) fn check_year(year: i32) -> Result<(), ReportError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(ReportError::InvalidYear(year))
    }
}
