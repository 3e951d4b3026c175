//! Line-item valuation
//!
//! A line item is one billable service on an invoice (bridal makeup, trial
//! session, hair styling, travel). Its value is `quantity × unit_price`,
//! computed exactly on the fixed-point amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{LineItemId, Money};

use crate::error::BillingError;

/// Why a line item was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemFault {
    /// Quantity must be at least one
    QuantityBelowOne(u32),
    /// Unit price must be strictly positive
    PriceNotPositive(Money),
    /// Description must not be blank
    BlankDescription,
}

impl LineItemFault {
    /// Name of the field the fault belongs to
    pub fn field_name(&self) -> &'static str {
        match self {
            LineItemFault::QuantityBelowOne(_) => "quantity",
            LineItemFault::PriceNotPositive(_) => "unit_price",
            LineItemFault::BlankDescription => "description",
        }
    }
}

impl fmt::Display for LineItemFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineItemFault::QuantityBelowOne(q) => write!(f, "quantity {} is below 1", q),
            LineItemFault::PriceNotPositive(p) => write!(f, "unit price {} must be at least 0.01", p),
            LineItemFault::BlankDescription => write!(f, "description is blank"),
        }
    }
}

impl From<LineItemFault> for BillingError {
    fn from(fault: LineItemFault) -> Self {
        BillingError::InvalidLineItem {
            position: None,
            fault,
        }
    }
}

/// A line on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item ID
    pub id: LineItemId,
    /// Description of the service
    pub description: String,
    /// Number of units
    pub quantity: u32,
    /// Price per unit
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item with a fresh identifier
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            id: LineItemId::new_v7(),
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// Checks the quantity and price invariants
    pub fn check(&self) -> Result<(), LineItemFault> {
        check_values(&self.description, self.quantity, self.unit_price)
    }

    /// Value of this line: `quantity × unit_price`
    pub fn line_total(&self) -> Result<Money, BillingError> {
        line_total(self)
    }
}

/// Values submitted for a line item before it is stored
///
/// `id` is set when editing an existing line so it keeps its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDraft {
    #[serde(default)]
    pub id: Option<LineItemId>,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItemDraft {
    /// Creates a draft for a new line
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            id: None,
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// Checks the quantity and price invariants
    pub fn check(&self) -> Result<(), LineItemFault> {
        check_values(&self.description, self.quantity, self.unit_price)
    }

    /// Turns the draft into a stored line item
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id.unwrap_or_else(LineItemId::new_v7),
            description: self.description.trim().to_string(),
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

fn check_values(description: &str, quantity: u32, unit_price: Money) -> Result<(), LineItemFault> {
    if description.trim().is_empty() {
        return Err(LineItemFault::BlankDescription);
    }
    if quantity < 1 {
        return Err(LineItemFault::QuantityBelowOne(quantity));
    }
    if !unit_price.is_positive() {
        return Err(LineItemFault::PriceNotPositive(unit_price));
    }
    Ok(())
}

/// Computes the value of a single line
///
/// # Errors
///
/// - `InvalidLineItem` if `quantity < 1` or `unit_price <= 0`
/// - `CalculationError` if the product overflows
pub fn line_total(item: &LineItem) -> Result<Money, BillingError> {
    if item.quantity < 1 {
        return Err(LineItemFault::QuantityBelowOne(item.quantity).into());
    }
    if !item.unit_price.is_positive() {
        return Err(LineItemFault::PriceNotPositive(item.unit_price).into());
    }
    Ok(item.unit_price.checked_mul_quantity(item.quantity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total() {
        let item = LineItem::new("Bridal makeup", 2, Money::new(dec!(50.00)));
        assert_eq!(line_total(&item).unwrap().amount(), dec!(100.00));
        assert_eq!(item.line_total().unwrap().amount(), dec!(100.00));
    }

    #[test]
    fn test_line_total_smallest_price() {
        let item = LineItem::new("Pins", 3, Money::new(dec!(0.01)));
        assert_eq!(line_total(&item).unwrap().amount(), dec!(0.03));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let item = LineItem::new("Trial", 0, Money::new(dec!(50.00)));
        let err = line_total(&item).unwrap_err();
        assert!(matches!(
            err,
            BillingError::InvalidLineItem { fault: LineItemFault::QuantityBelowOne(0), .. }
        ));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        for price in [dec!(0), dec!(-5.00)] {
            let item = LineItem::new("Trial", 1, Money::new(price));
            let err = line_total(&item).unwrap_err();
            assert_eq!(err.field_name().as_deref(), Some("unit_price"));
        }
    }

    #[test]
    fn test_blank_description_only_checked_on_submission() {
        let item = LineItem::new("  ", 1, Money::new(dec!(10.00)));
        assert_eq!(item.check(), Err(LineItemFault::BlankDescription));
        assert!(line_total(&item).is_ok());
    }

    #[test]
    fn test_draft_keeps_existing_id() {
        let id = LineItemId::new_v7();
        let draft = LineItemDraft {
            id: Some(id),
            description: " Hair styling ".to_string(),
            quantity: 1,
            unit_price: Money::new(dec!(30.00)),
        };
        let item = draft.into_line_item();
        assert_eq!(item.id, id);
        assert_eq!(item.description, "Hair styling");
    }

    #[test]
    fn test_fault_display() {
        let fault = LineItemFault::PriceNotPositive(Money::zero());
        assert_eq!(fault.to_string(), "unit price 0.00 must be at least 0.01");
    }
}
