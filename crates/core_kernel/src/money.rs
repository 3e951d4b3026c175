//! Money types with precise decimal arithmetic
//!
//! The studio bills in a single currency, so `Money` is a fixed-point amount
//! with two decimal places backed by rust_decimal. Intermediate calculations
//! are carried out on raw `Decimal` values and only rounded when they are
//! turned into `Money`, using round-half-up (away from zero).
//!
//! Amounts arriving from outside (JSON bodies) are never rounded: a value
//! with more than two decimal places is rejected when it is deserialized.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Number of decimal places kept on every monetary value
pub const MONEY_SCALE: u32 = 2;

/// Rounds a raw decimal to the monetary scale using round-half-up
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount rounded to two decimal places
///
/// Serializes as a decimal string (`"147.50"`), never as a binary float.
/// Deserialization goes through [`Money::exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "Decimal")]
pub struct Money {
    amount: Decimal,
}

impl Money {
    /// Creates a new Money value, rounding half-up to two decimal places
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount: round_money(amount),
        }
    }

    /// Creates Money from an amount that must already fit two decimal places
    ///
    /// Trailing zeros do not count, so `10.500` is accepted and `10.005` is not.
    pub fn exact(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(MoneyError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                amount, MONEY_SCALE
            )));
        }
        Ok(Self::new(amount))
    }

    /// Creates Money from an integer amount in minor units (cents, paise)
    pub fn from_minor(minor_units: i64) -> Self {
        Self::new(Decimal::new(minor_units, MONEY_SCALE))
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self::new(dec!(0))
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns the amount, or zero when it is negative
    pub fn floor_at_zero(&self) -> Self {
        if self.is_negative() {
            Self::zero()
        } else {
            *self
        }
    }

    /// Checked addition that reports overflow instead of panicking
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.amount
            .checked_add(other.amount)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction that reports overflow instead of panicking
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.amount
            .checked_sub(other.amount)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiplies by an integer quantity
    pub fn checked_mul_quantity(&self, quantity: u32) -> Result<Money, MoneyError> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.amount
            .checked_div(divisor)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::exact(amount).map_err(serde::de::Error::custom)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.amount
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.amount + other.amount)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.amount - other.amount)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// A percentage expressed in percent units (18 means 18%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage {
    value: Decimal,
}

impl Percentage {
    /// Creates a percentage from percent units (e.g. 18.0 for 18%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// A zero percentage
    pub fn zero() -> Self {
        Self { value: dec!(0) }
    }

    /// Returns the percent value
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the value lies within `[min, max]`
    pub fn is_within(&self, min: Decimal, max: Decimal) -> bool {
        self.value >= min && self.value <= max
    }

    /// Applies this percentage to a raw amount without rounding
    ///
    /// Returns `None` if the multiplication overflows.
    pub fn of(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.value)
            .and_then(|scaled| scaled.checked_div(dec!(100)))
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Percentage {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.value.normalize())
    }
}
