//! Invoice ledger engine
//!
//! Every function here is a pure computation over the invoice's current
//! field values. Percentages are applied in full precision and each public
//! function rounds its own result once, half-up to two places:
//!
//! ```text
//! subtotal  = Σ quantity × unit_price
//! discount  = round(subtotal × discount% / 100)
//! tax       = round((subtotal − discount) × tax% / 100)
//! total     = subtotal − discount + tax
//! due       = max(total − advance, 0)
//! ```
//!
//! `total` is composed from the already-rounded components, so the identity
//! `total = subtotal − discount + tax` holds exactly on the returned values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Percentage};

use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::line_item::line_total;

/// Highest discount accepted, in percent
pub const MAX_DISCOUNT: Decimal = dec!(100);

/// Decimal places allowed on a discount or tax rate
pub const PERCENTAGE_SCALE: u32 = 2;

fn too_precise(percentage: Percentage) -> bool {
    percentage.value().normalize().scale() > PERCENTAGE_SCALE
}

/// Checks a discount lies in `[0, 100]` with at most two decimal places
pub fn check_discount(discount: Percentage) -> Result<(), BillingError> {
    if !discount.is_within(Decimal::ZERO, MAX_DISCOUNT) || too_precise(discount) {
        return Err(BillingError::InvalidPercentage {
            field: "discount_percentage",
            value: discount.value(),
        });
    }
    Ok(())
}

/// Checks a tax rate is not negative and has at most two decimal places
pub fn check_tax(tax: Percentage) -> Result<(), BillingError> {
    if tax.value() < Decimal::ZERO || too_precise(tax) {
        return Err(BillingError::InvalidPercentage {
            field: "tax_percentage",
            value: tax.value(),
        });
    }
    Ok(())
}

/// Checks an advance payment is not negative
pub fn check_advance(advance: Money) -> Result<(), BillingError> {
    if advance.is_negative() {
        return Err(BillingError::InvalidAmount {
            field: "advance_amount",
            value: advance.amount(),
        });
    }
    Ok(())
}

/// Sum of every line total; zero for an invoice without items
pub fn subtotal(invoice: &Invoice) -> Result<Money, BillingError> {
    invoice
        .items
        .iter()
        .enumerate()
        .try_fold(Money::zero(), |acc, (index, item)| {
            let line = line_total(item).map_err(|e| e.at_position(index))?;
            Ok(acc.checked_add(&line)?)
        })
}

fn apply(percentage: Percentage, base: Money) -> Result<Money, BillingError> {
    percentage
        .of(base.amount())
        .map(Money::new)
        .ok_or_else(|| BillingError::CalculationError(format!("{} of {} overflows", percentage, base)))
}

fn discount_on(invoice: &Invoice, subtotal: Money) -> Result<Money, BillingError> {
    check_discount(invoice.discount_percentage)?;
    apply(invoice.discount_percentage, subtotal)
}

fn tax_on(invoice: &Invoice, subtotal: Money, discount: Money) -> Result<Money, BillingError> {
    check_tax(invoice.tax_percentage)?;
    apply(invoice.tax_percentage, subtotal.checked_sub(&discount)?)
}

/// `subtotal × discount% / 100`
pub fn discount_amount(invoice: &Invoice) -> Result<Money, BillingError> {
    discount_on(invoice, subtotal(invoice)?)
}

/// `(subtotal − discount) × tax% / 100`
///
/// Tax is levied on the discounted amount, never on the raw subtotal.
pub fn tax_amount(invoice: &Invoice) -> Result<Money, BillingError> {
    let subtotal = subtotal(invoice)?;
    let discount = discount_on(invoice, subtotal)?;
    tax_on(invoice, subtotal, discount)
}

/// `subtotal − discount + tax`
///
/// Does not look at the advance.
pub fn total(invoice: &Invoice) -> Result<Money, BillingError> {
    Ok(Charges::compute(invoice)?.total)
}

/// `max(total − advance, 0)`; an overpaid invoice owes nothing
pub fn due_amount(invoice: &Invoice) -> Result<Money, BillingError> {
    Ok(InvoiceTotals::compute(invoice)?.due)
}

struct Charges {
    subtotal: Money,
    discount: Money,
    tax: Money,
    total: Money,
}

impl Charges {
    fn compute(invoice: &Invoice) -> Result<Self, BillingError> {
        let subtotal = subtotal(invoice)?;
        let discount = discount_on(invoice, subtotal)?;
        let tax = tax_on(invoice, subtotal, discount)?;
        let total = subtotal.checked_sub(&discount)?.checked_add(&tax)?;
        Ok(Self {
            subtotal,
            discount,
            tax,
            total,
        })
    }
}

/// All derived amounts of one invoice, computed together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub advance: Money,
    pub due: Money,
}

impl InvoiceTotals {
    /// Derives every amount from the invoice's current state
    pub fn compute(invoice: &Invoice) -> Result<Self, BillingError> {
        let Charges {
            subtotal,
            discount,
            tax,
            total,
        } = Charges::compute(invoice)?;

        check_advance(invoice.advance_amount)?;
        let due = total.checked_sub(&invoice.advance_amount)?.floor_at_zero();

        Ok(Self {
            subtotal,
            discount,
            tax,
            total,
            advance: invoice.advance_amount,
            due,
        })
    }
}
