//! Invoice management
//!
//! An invoice owns its line items and the discount, tax and advance-payment
//! parameters. Totals are never stored on the invoice: they are derived on
//! every read by the [`totals`](crate::totals) engine, so an edit to the
//! items or percentages can never leave a stale total behind.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CustomerId, InvoiceId, Money, Percentage};

use crate::error::BillingError;
use crate::line_item::{LineItem, LineItemDraft};
use crate::numbering::InvoiceNumber;
use crate::totals::{self, InvoiceTotals};

/// Payment status of an invoice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid beyond any advance
    #[default]
    Pending,
    /// Partial payment received
    PartiallyPaid,
    /// Fully paid
    Paid,
    /// Past due date
    Overdue,
    /// Cancelled
    Cancelled,
}

impl PaymentStatus {
    /// Every status, in display order
    pub const ALL: [PaymentStatus; 5] = [
        PaymentStatus::Pending,
        PaymentStatus::PartiallyPaid,
        PaymentStatus::Paid,
        PaymentStatus::Overdue,
        PaymentStatus::Cancelled,
    ];

    /// Storage and wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true if no more money is expected
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Cancelled)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown payment status '{}'", s))
    }
}

/// An invoice issued to a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice number (human-readable, immutable)
    pub invoice_number: InvoiceNumber,
    /// Customer being billed
    pub customer_id: CustomerId,
    /// Issue date
    pub issue_date: NaiveDate,
    /// Due date
    pub due_date: NaiveDate,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Discount, 0 to 100 percent
    pub discount_percentage: Percentage,
    /// Tax on the discounted amount, 0 percent or more
    pub tax_percentage: Percentage,
    /// Advance already received
    pub advance_amount: Money,
    /// Notes
    pub notes: Option<String>,
    /// Line items in creation order
    pub items: Vec<LineItem>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Builds a new invoice from a validated draft and its assigned number
    pub fn from_draft(invoice_number: InvoiceNumber, draft: InvoiceDraft) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            invoice_number,
            customer_id: draft.customer_id,
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            payment_status: draft.payment_status,
            discount_percentage: draft.discount_percentage,
            tax_percentage: draft.tax_percentage,
            advance_amount: draft.advance_amount,
            notes: normalize_notes(draft.notes),
            items: draft.items.into_iter().map(LineItemDraft::into_line_item).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields and the full line-item set
    ///
    /// The id, invoice number and creation time are kept.
    pub fn apply_changes(&mut self, draft: InvoiceDraft) {
        self.customer_id = draft.customer_id;
        self.issue_date = draft.issue_date;
        self.due_date = draft.due_date;
        self.payment_status = draft.payment_status;
        self.discount_percentage = draft.discount_percentage;
        self.tax_percentage = draft.tax_percentage;
        self.advance_amount = draft.advance_amount;
        self.notes = normalize_notes(draft.notes);
        self.items = draft.items.into_iter().map(LineItemDraft::into_line_item).collect();
        self.updated_at = Utc::now();
    }

    /// Derives all totals from the current state
    pub fn totals(&self) -> Result<InvoiceTotals, BillingError> {
        InvoiceTotals::compute(self)
    }

    /// Amount still owed
    pub fn due_amount(&self) -> Result<Money, BillingError> {
        totals::due_amount(self)
    }

    /// Checks if the invoice is past its due date and still unsettled
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date && !self.payment_status.is_settled()
    }

    /// Returns true if the invoice was issued in the given calendar month
    pub fn issued_in(&self, year: Option<i32>, month: Option<u32>) -> bool {
        year.map_or(true, |y| self.issue_date.year() == y)
            && month.map_or(true, |m| self.issue_date.month() == m)
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Values submitted when creating or editing an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// Customer being billed
    pub customer_id: CustomerId,
    /// Externally supplied number; generated when absent
    #[serde(default)]
    pub invoice_number: Option<InvoiceNumber>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub discount_percentage: Percentage,
    #[serde(default)]
    pub tax_percentage: Percentage,
    #[serde(default)]
    pub advance_amount: Money,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<LineItemDraft>,
}

impl InvoiceDraft {
    /// Creates a draft with default percentages and no items
    pub fn new(customer_id: CustomerId, issue_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            customer_id,
            invoice_number: None,
            issue_date,
            due_date,
            payment_status: PaymentStatus::Pending,
            discount_percentage: Percentage::zero(),
            tax_percentage: Percentage::zero(),
            advance_amount: Money::zero(),
            notes: None,
            items: Vec::new(),
        }
    }

    /// Adds a line
    pub fn item(mut self, description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        self.items.push(LineItemDraft::new(description, quantity, unit_price));
        self
    }

    /// Sets the discount percentage
    pub fn discount(mut self, percentage: Percentage) -> Self {
        self.discount_percentage = percentage;
        self
    }

    /// Sets the tax percentage
    pub fn tax(mut self, percentage: Percentage) -> Self {
        self.tax_percentage = percentage;
        self
    }

    /// Sets the advance amount
    pub fn advance(mut self, amount: Money) -> Self {
        self.advance_amount = amount;
        self
    }

    /// Sets the payment status
    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    /// Supplies an invoice number instead of generating one
    pub fn numbered(mut self, number: InvoiceNumber) -> Self {
        self.invoice_number = Some(number);
        self
    }

    /// Checks every invariant an invoice must satisfy before it is stored
    ///
    /// # Errors
    ///
    /// - `InvalidPercentage` for a discount outside `[0, 100]` or a negative tax
    /// - `InvalidAmount` for a negative advance
    /// - `InvalidLineItem` for the first offending line
    /// - `EmptyInvoice` when there are no lines
    pub fn validate(&self) -> Result<(), BillingError> {
        totals::check_discount(self.discount_percentage)?;
        totals::check_tax(self.tax_percentage)?;
        totals::check_advance(self.advance_amount)?;

        for (index, item) in self.items.iter().enumerate() {
            item.check()
                .map_err(|fault| BillingError::from(fault).at_position(index))?;
        }

        if self.items.is_empty() {
            return Err(BillingError::EmptyInvoice);
        }
        Ok(())
    }
}

/// Filter for listing invoices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceQuery {
    pub customer_id: Option<CustomerId>,
    pub payment_status: Option<PaymentStatus>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Case-insensitive fragment of the invoice number or the customer's name
    #[serde(default)]
    pub search: Option<String>,
    /// Customers whose name contains `search`
    ///
    /// Filled in by the billing service before the query reaches storage.
    #[serde(skip)]
    pub search_customers: Vec<CustomerId>,
}

impl InvoiceQuery {
    /// Invoices for one customer
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Invoices whose number or customer name contains `term`
    pub fn searching(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    /// The trimmed search term, if one is set
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Returns true if the invoice passes every set criterion
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.customer_id.map_or(true, |c| invoice.customer_id == c)
            && self.payment_status.map_or(true, |s| invoice.payment_status == s)
            && invoice.issued_in(self.year, self.month)
            && self.search_term().map_or(true, |term| {
                contains_ignore_case(invoice.invoice_number.as_str(), term)
                    || self.search_customers.contains(&invoice.customer_id)
            })
    }
}

/// Case-insensitive substring test used by every search
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Sort order used for every invoice listing: newest first, then number
pub fn listing_order(a: &Invoice, b: &Invoice) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.invoice_number.cmp(&b.invoice_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> InvoiceDraft {
        InvoiceDraft::new(CustomerId::new_v7(), date(2024, 3, 2), date(2024, 3, 16))
            .item("Bridal makeup", 1, Money::new(dec!(250.00)))
    }

    #[test]
    fn test_from_draft_copies_fields() {
        let invoice = Invoice::from_draft(InvoiceNumber::generate("INV"), draft());
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.payment_status, PaymentStatus::Pending);
        assert_eq!(invoice.created_at, invoice.updated_at);
    }

    #[test]
    fn test_apply_changes_keeps_number_and_id() {
        let mut invoice = Invoice::from_draft(InvoiceNumber::generate("INV"), draft());
        let number = invoice.invoice_number.clone();
        let id = invoice.id;

        let changed = draft()
            .item("Trial session", 1, Money::new(dec!(40.00)))
            .numbered(InvoiceNumber::parse("INV-FFFFFFFF").unwrap());
        invoice.apply_changes(changed);

        assert_eq!(invoice.invoice_number, number);
        assert_eq!(invoice.id, id);
        assert_eq!(invoice.items.len(), 2);
    }

    #[test]
    fn test_validate_empty() {
        let empty = InvoiceDraft::new(CustomerId::new_v7(), date(2024, 1, 1), date(2024, 1, 2));
        assert!(matches!(empty.validate(), Err(BillingError::EmptyInvoice)));
    }

    #[test]
    fn test_validate_reports_item_position() {
        let bad = draft().item("Travel", 0, Money::new(dec!(10.00)));
        let err = bad.validate().unwrap_err();
        assert_eq!(err.field_name().as_deref(), Some("items[1].quantity"));
        assert_eq!(err.to_string(), "Invalid line item #2: quantity 0 is below 1");
    }

    #[test]
    fn test_validate_percentages() {
        let over = draft().discount(Percentage::new(dec!(100.5)));
        assert!(matches!(
            over.validate(),
            Err(BillingError::InvalidPercentage { field: "discount_percentage", .. })
        ));

        let negative_tax = draft().tax(Percentage::new(dec!(-1)));
        assert!(matches!(
            negative_tax.validate(),
            Err(BillingError::InvalidPercentage { field: "tax_percentage", .. })
        ));

        let big_tax = draft().tax(Percentage::new(dec!(250)));
        assert!(big_tax.validate().is_ok());
    }

    #[test]
    fn test_validate_advance() {
        let negative = draft().advance(Money::new(dec!(-0.01)));
        assert!(matches!(
            negative.validate(),
            Err(BillingError::InvalidAmount { field: "advance_amount", .. })
        ));
    }

    #[test]
    fn test_overdue() {
        let invoice = Invoice::from_draft(InvoiceNumber::generate("INV"), draft());
        assert!(!invoice.is_overdue(date(2024, 3, 16)));
        assert!(invoice.is_overdue(date(2024, 3, 17)));

        let mut paid = invoice.clone();
        paid.payment_status = PaymentStatus::Paid;
        assert!(!paid.is_overdue(date(2024, 4, 1)));
    }

    #[test]
    fn test_blank_notes_dropped() {
        let mut d = draft();
        d.notes = Some("   ".to_string());
        let invoice = Invoice::from_draft(InvoiceNumber::generate("INV"), d);
        assert_eq!(invoice.notes, None);
    }

    #[test]
    fn test_query_matching() {
        let invoice = Invoice::from_draft(InvoiceNumber::generate("INV"), draft());
        assert!(InvoiceQuery::default().matches(&invoice));
        assert!(InvoiceQuery::for_customer(invoice.customer_id).matches(&invoice));
        assert!(!InvoiceQuery::for_customer(CustomerId::new_v7()).matches(&invoice));

        let march = InvoiceQuery { year: Some(2024), month: Some(3), ..Default::default() };
        assert!(march.matches(&invoice));
        let april = InvoiceQuery { month: Some(4), ..Default::default() };
        assert!(!april.matches(&invoice));
    }

    #[test]
    fn test_search_by_number_or_customer() {
        let invoice = Invoice::from_draft(InvoiceNumber::parse("GLAM-2024-017").unwrap(), draft());

        assert!(InvoiceQuery::searching("glam-2024").matches(&invoice));
        assert!(InvoiceQuery::searching("  017 ").matches(&invoice));
        assert!(!InvoiceQuery::searching("INV-").matches(&invoice));
        assert!(InvoiceQuery::searching("   ").matches(&invoice));

        let mut by_name = InvoiceQuery::searching("farah");
        assert!(!by_name.matches(&invoice));
        by_name.search_customers.push(invoice.customer_id);
        assert!(by_name.matches(&invoice));
    }

    #[test]
    fn test_payment_status_names() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }
}
