//! Monthly revenue series
//!
//! Always twelve points, January to December, so charts get a stable axis
//! even for months without bookings.

use chrono::{Datelike, Utc};
use serde::Serialize;

use core_kernel::Money;
use domain_billing::Invoice;

use crate::error::ReportError;
use crate::filter::check_year;
use crate::summary::{AggregationSkip, Tally};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One month of a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthPoint {
    /// 1-12
    pub month: u32,
    pub label: &'static str,
    pub booking_count: usize,
    pub revenue: Money,
    pub advance_total: Money,
}

/// Twelve monthly points for one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    pub year: i32,
    pub points: Vec<MonthPoint>,
    pub skipped_count: usize,
    pub skipped: Vec<AggregationSkip>,
}

impl MonthlySeries {
    /// Point for a month (1-12)
    pub fn point(&self, month: u32) -> Option<&MonthPoint> {
        self.points.iter().find(|p| p.month == month)
    }

    /// Revenue over the whole year
    pub fn annual_revenue(&self) -> Money {
        self.points.iter().map(|p| p.revenue).sum()
    }
}

/// Builds the series for a year, or the current year when `None`
///
/// Each month applies the same rules as [`summarize`](crate::summarize)
/// with an exact year-and-month filter.
pub fn monthly_series(invoices: &[Invoice], year: Option<i32>) -> Result<MonthlySeries, ReportError> {
    let year = year.unwrap_or_else(|| Utc::now().year());
    check_year(year)?;

    let mut tallies: Vec<Tally> = (0..12).map(|_| Tally::default()).collect();
    for invoice in invoices.iter().filter(|i| i.issue_date.year() == year) {
        // month0() is 0-11
        tallies[invoice.issue_date.month0() as usize].add(invoice);
    }

    let mut skipped = Vec::new();
    let points = tallies
        .into_iter()
        .zip(1u32..)
        .map(|(tally, month)| {
            skipped.extend(tally.skipped);
            MonthPoint {
                month,
                label: MONTH_LABELS[(month - 1) as usize],
                booking_count: tally.bookings,
                revenue: tally.revenue,
                advance_total: tally.advance,
            }
        })
        .collect();

    Ok(MonthlySeries {
        year,
        points,
        skipped_count: skipped.len(),
        skipped,
    })
}
