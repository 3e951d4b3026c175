//! Booking summary
//!
//! Sums the derived totals of every invoice in a period. An invoice whose
//! totals cannot be computed is left out of every sum and count and is
//! reported back as an [`AggregationSkip`] instead of failing the report.

use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::{InvoiceId, Money};
use domain_billing::{BillingError, Invoice, InvoiceNumber, PaymentStatus};

use crate::filter::ReportFilter;

/// An invoice left out of a report because its totals could not be computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSkip {
    pub invoice_id: InvoiceId,
    pub invoice_number: InvoiceNumber,
    pub reason: String,
    /// Offending field, when known
    pub field: Option<String>,
}

impl AggregationSkip {
    fn new(invoice: &Invoice, error: &BillingError) -> Self {
        Self {
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            reason: error.to_string(),
            field: error.field_name(),
        }
    }
}

/// Number of invoices in each payment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub partially_paid: usize,
    pub paid: usize,
    pub overdue: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn get(&self, status: PaymentStatus) -> usize {
        match status {
            PaymentStatus::Pending => self.pending,
            PaymentStatus::PartiallyPaid => self.partially_paid,
            PaymentStatus::Paid => self.paid,
            PaymentStatus::Overdue => self.overdue,
            PaymentStatus::Cancelled => self.cancelled,
        }
    }

    fn increment(&mut self, status: PaymentStatus) {
        let slot = match status {
            PaymentStatus::Pending => &mut self.pending,
            PaymentStatus::PartiallyPaid => &mut self.partially_paid,
            PaymentStatus::Paid => &mut self.paid,
            PaymentStatus::Overdue => &mut self.overdue,
            PaymentStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }

    /// Sum over every status
    pub fn total(&self) -> usize {
        PaymentStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Totals over a set of invoices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub filter: ReportFilter,
    /// Invoices included in the sums
    pub total_bookings: usize,
    pub total_revenue: Money,
    pub total_advance: Money,
    pub total_due: Money,
    pub status_counts: StatusCounts,
    pub skipped_count: usize,
    pub skipped: Vec<AggregationSkip>,
}

/// Running sums shared by the summary and the monthly series
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub bookings: usize,
    pub revenue: Money,
    pub advance: Money,
    pub due: Money,
    pub counts: StatusCounts,
    pub skipped: Vec<AggregationSkip>,
}

impl Tally {
    /// Adds one invoice, or records it as skipped
    pub fn add(&mut self, invoice: &Invoice) {
        match self.sums_with(invoice) {
            Ok((revenue, advance, due)) => {
                self.revenue = revenue;
                self.advance = advance;
                self.due = due;
                self.bookings += 1;
                self.counts.increment(invoice.payment_status);
            }
            Err(error) => {
                warn!(
                    invoice_id = %invoice.id,
                    invoice_number = %invoice.invoice_number,
                    error = %error,
                    "Skipping invoice in report"
                );
                self.skipped.push(AggregationSkip::new(invoice, &error));
            }
        }
    }

    fn sums_with(&self, invoice: &Invoice) -> Result<(Money, Money, Money), BillingError> {
        let totals = invoice.totals()?;
        Ok((
            self.revenue.checked_add(&totals.total)?,
            self.advance.checked_add(&totals.advance)?,
            self.due.checked_add(&totals.due)?,
        ))
    }
}

/// Summarizes every invoice that passes the filter
pub fn summarize(invoices: &[Invoice], filter: &ReportFilter) -> ReportSummary {
    let mut tally = Tally::default();
    for invoice in invoices.iter().filter(|i| filter.matches(i)) {
        tally.add(invoice);
    }

    ReportSummary {
        filter: *filter,
        total_bookings: tally.bookings,
        total_revenue: tally.revenue,
        total_advance: tally.advance,
        total_due: tally.due,
        status_counts: tally.counts,
        skipped_count: tally.skipped.len(),
        skipped: tally.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{CustomerId, Percentage};
    use domain_billing::InvoiceDraft;
    use rust_decimal_macros::dec;

    fn invoice(y: i32, m: u32, price: rust_decimal::Decimal, status: PaymentStatus) -> Invoice {
        let day = NaiveDate::from_ymd_opt(y, m, 15).unwrap();
        let draft = InvoiceDraft::new(CustomerId::new_v7(), day, day)
            .item("Makeup", 1, Money::new(price))
            .status(status);
        Invoice::from_draft(InvoiceNumber::generate("INV"), draft)
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize(&[], &ReportFilter::all());
        assert_eq!(summary.total_bookings, 0);
        assert_eq!(summary.total_revenue, Money::zero());
        assert_eq!(summary.skipped_count, 0);
    }

    #[test]
    fn test_counts_per_status() {
        let invoices = vec![
            invoice(2024, 1, dec!(100), PaymentStatus::Paid),
            invoice(2024, 1, dec!(50), PaymentStatus::Paid),
            invoice(2024, 2, dec!(70), PaymentStatus::Pending),
        ];
        let summary = summarize(&invoices, &ReportFilter::all());
        assert_eq!(summary.status_counts.paid, 2);
        assert_eq!(summary.status_counts.pending, 1);
        assert_eq!(summary.status_counts.total(), summary.total_bookings);
    }

    #[test]
    fn test_corrupted_invoice_is_skipped() {
        let mut bad = invoice(2024, 3, dec!(40), PaymentStatus::Pending);
        bad.tax_percentage = Percentage::new(dec!(-5));
        let good = invoice(2024, 3, dec!(60), PaymentStatus::Pending);

        let summary = summarize(&[bad.clone(), good], &ReportFilter::all());
        assert_eq!(summary.total_bookings, 1);
        assert_eq!(summary.total_revenue.amount(), dec!(60.00));
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.skipped[0].invoice_id, bad.id);
        assert_eq!(summary.skipped[0].field.as_deref(), Some("tax_percentage"));
        assert_eq!(summary.status_counts.pending, 1);
    }
}
