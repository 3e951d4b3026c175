//! Reporting Domain - booking summaries and monthly series
//!
//! Read-only aggregation over already loaded invoices. Every amount comes
//! from the billing ledger engine; nothing here is stored.
//!
//! - [`summarize`]: bookings, revenue, advance and due for a period, with
//!   per-status counts
//! - [`monthly_series`]: twelve zero-filled monthly points for a year
//!
//! Invoices whose totals cannot be computed never abort a report. They are
//! excluded from the sums and returned as [`AggregationSkip`] records.

pub mod error;
pub mod filter;
pub mod series;
pub mod summary;

pub use error::ReportError;
pub use filter::ReportFilter;
pub use series::{monthly_series, MonthPoint, MonthlySeries};
pub use summary::{summarize, AggregationSkip, ReportSummary, StatusCounts};
