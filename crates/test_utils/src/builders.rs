//! Test Data Builders
//!
//! Provides builder patterns for constructing test invoices with sensible
//! defaults. Tests specify only the fields they care about.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{CustomerId, Money, Percentage};
use domain_billing::{Invoice, InvoiceDraft, InvoiceNumber, LineItemDraft, PaymentStatus};
use rust_decimal::Decimal;

use crate::fixtures::{DateFixtures, IdFixtures, LineItemFixtures};

/// Builder for invoices and invoice drafts
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    customer_id: CustomerId,
    invoice_number: Option<InvoiceNumber>,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    payment_status: PaymentStatus,
    discount: Percentage,
    tax: Percentage,
    advance: Money,
    items: Vec<LineItemDraft>,
    created_at: Option<DateTime<Utc>>,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    /// Creates a builder with the wedding package and no discount, tax or advance
    pub fn new() -> Self {
        Self {
            customer_id: IdFixtures::customer_id(),
            invoice_number: None,
            issue_date: DateFixtures::issue_date(),
            due_date: DateFixtures::due_date(),
            payment_status: PaymentStatus::Pending,
            discount: Percentage::zero(),
            tax: Percentage::zero(),
            advance: Money::zero(),
            items: LineItemFixtures::wedding_package(),
            created_at: None,
        }
    }

    /// Sets the customer ID
    pub fn with_customer(mut self, id: CustomerId) -> Self {
        self.customer_id = id;
        self
    }

    /// Sets an explicit invoice number
    pub fn with_number(mut self, number: &str) -> Self {
        self.invoice_number = InvoiceNumber::parse(number).ok();
        self
    }

    /// Sets the issue date; the due date follows two weeks later
    pub fn issued_on(mut self, date: NaiveDate) -> Self {
        self.issue_date = date;
        self.due_date = date + chrono::Days::new(14);
        self
    }

    /// Sets the issue date from year, month and day
    pub fn issued(self, year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(self.issue_date);
        self.issued_on(date)
    }

    /// Pins the creation time, which decides listing order
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Sets the payment status
    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    /// Sets the discount in percent
    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount = Percentage::new(percent);
        self
    }

    /// Sets the tax in percent
    pub fn with_tax(mut self, percent: Decimal) -> Self {
        self.tax = Percentage::new(percent);
        self
    }

    /// Sets the advance amount
    pub fn with_advance(mut self, amount: Decimal) -> Self {
        self.advance = Money::new(amount);
        self
    }

    /// Removes all line items
    pub fn without_items(mut self) -> Self {
        self.items.clear();
        self
    }

    /// Replaces the line items
    pub fn with_items(mut self, items: Vec<LineItemDraft>) -> Self {
        self.items = items;
        self
    }

    /// Adds a line item
    pub fn item(mut self, description: &str, quantity: u32, unit_price: Decimal) -> Self {
        self.items
            .push(LineItemDraft::new(description, quantity, Money::new(unit_price)));
        self
    }

    /// Builds the draft a client would submit
    pub fn draft(self) -> InvoiceDraft {
        InvoiceDraft {
            customer_id: self.customer_id,
            invoice_number: self.invoice_number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            payment_status: self.payment_status,
            discount_percentage: self.discount,
            tax_percentage: self.tax,
            advance_amount: self.advance,
            notes: None,
            items: self.items,
        }
    }

    /// Builds a stored-looking invoice without validating it
    pub fn build(self) -> Invoice {
        let number = self
            .invoice_number
            .clone()
            .unwrap_or_else(|| InvoiceNumber::generate("INV"));
        let created_at = self.created_at;
        let mut invoice = Invoice::from_draft(number, self.draft());
        if let Some(at) = created_at {
            invoice.created_at = at;
            invoice.updated_at = at;
        }
        invoice
    }
}

/// One invoice per listed month of a year, each with a single line of `price`
pub fn monthly_invoices(year: i32, months: &[u32], price: Decimal) -> Vec<Invoice> {
    months
        .iter()
        .map(|m| {
            InvoiceBuilder::new()
                .issued(year, *m, 10)
                .with_items(Vec::new())
                .item("Session", 1, price)
                .build()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_builds_reference_package() {
        let invoice = InvoiceBuilder::new().with_tax(dec!(18)).with_advance(dec!(50)).build();
        let totals = invoice.totals().unwrap();
        assert_eq!(totals.total.amount(), dec!(147.50));
        assert_eq!(totals.due.amount(), dec!(97.50));
    }

    #[test]
    fn test_draft_validates() {
        assert!(InvoiceBuilder::new().draft().validate().is_ok());
        assert!(InvoiceBuilder::new().without_items().draft().validate().is_err());
    }

    #[test]
    fn test_explicit_number() {
        let invoice = InvoiceBuilder::new().with_number("GLAM-7").build();
        assert_eq!(invoice.invoice_number.as_str(), "GLAM-7");
    }

    #[test]
    fn test_monthly_invoices() {
        let invoices = monthly_invoices(2024, &[1, 3, 3], dec!(10));
        assert_eq!(invoices.len(), 3);
        assert_eq!(invoices[1].issue_date.month(), 3);
        assert_eq!(invoices[1].items.len(), 1);
    }
}
