//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for money and invoice totals that
//! give more meaningful failure messages than plain `assert_eq!`.

use core_kernel::Money;
use domain_billing::{Invoice, InvoiceTotals};
use rust_decimal::Decimal;

/// Asserts a Money value equals a decimal amount exactly
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts every ledger identity on a set of totals
///
/// - `total = subtotal − discount + tax`
/// - `due = max(total − advance, 0)`
/// - every amount has two decimal places
pub fn assert_totals_consistent(totals: &InvoiceTotals) {
    assert_eq!(
        totals.total,
        totals.subtotal - totals.discount + totals.tax,
        "total {} != subtotal {} - discount {} + tax {}",
        totals.total,
        totals.subtotal,
        totals.discount,
        totals.tax
    );

    let expected_due = (totals.total - totals.advance).floor_at_zero();
    assert_eq!(totals.due, expected_due, "due {} != max(total - advance, 0)", totals.due);

    for amount in [totals.subtotal, totals.discount, totals.tax, totals.total, totals.due] {
        assert_eq!(amount.amount().scale(), 2, "{} is not at two decimal places", amount);
    }
}

/// Asserts an invoice's computed totals
pub fn assert_invoice_totals(invoice: &Invoice, total: Decimal, due: Decimal) {
    let totals = invoice
        .totals()
        .unwrap_or_else(|e| panic!("totals of {} failed: {}", invoice.invoice_number, e));
    assert_totals_consistent(&totals);
    assert_money_eq(&totals.total, total);
    assert_money_eq(&totals.due, due);
}
