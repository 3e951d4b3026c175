//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating invoices and their parts
//! that satisfy the billing invariants.

use chrono::NaiveDate;
use core_kernel::{Money, Percentage};
use domain_billing::{Invoice, LineItemDraft, PaymentStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::InvoiceBuilder;

/// Strategy for valid unit prices (0.01 to 10,000.00)
fn unit_price_strategy() -> impl Strategy<Value = Money> {
    (1i64..=1_000_000i64).prop_map(Money::from_minor)
}

/// Strategy for valid quantities (1 to 50)
fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..=50u32
}

/// Strategy for valid line items
fn line_item_strategy() -> impl Strategy<Value = LineItemDraft> {
    ("[A-Z][a-z]{3,12}", quantity_strategy(), unit_price_strategy())
        .prop_map(|(description, quantity, price)| LineItemDraft::new(description, quantity, price))
}

/// Strategy for discounts (0% to 100%, two decimal places)
fn discount_strategy() -> impl Strategy<Value = Percentage> {
    (0i64..=10_000i64).prop_map(|n| Percentage::new(Decimal::new(n, 2)))
}

/// Strategy for tax rates (0% to 50%, two decimal places)
fn tax_strategy() -> impl Strategy<Value = Percentage> {
    (0i64..=5_000i64).prop_map(|n| Percentage::new(Decimal::new(n, 2)))
}

/// Strategy for advance amounts (0.00 to 20,000.00)
fn advance_strategy() -> impl Strategy<Value = Money> {
    (0i64..=2_000_000i64).prop_map(Money::from_minor)
}

/// Strategy for payment statuses
fn payment_status_strategy() -> impl Strategy<Value = PaymentStatus> {
    prop::sample::select(PaymentStatus::ALL.to_vec())
}

/// Strategy for issue dates within 2023-2025
fn issue_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2023i32..=2025i32, 1u32..=12u32, 1u32..=28u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
}

/// Strategy for valid invoices with one to eight line items
pub fn invoice_strategy() -> impl Strategy<Value = Invoice> {
    (
        prop::collection::vec(line_item_strategy(), 1..=8),
        discount_strategy(),
        tax_strategy(),
        advance_strategy(),
        payment_status_strategy(),
        issue_date_strategy(),
    )
        .prop_map(|(items, discount, tax, advance, status, issued)| {
            InvoiceBuilder::new()
                .with_items(items)
                .with_discount(discount.value())
                .with_tax(tax.value())
                .with_advance(advance.amount())
                .with_status(status)
                .issued_on(issued)
                .build()
        })
}
