//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the studio's customers, invoices and
//! line items. Values are fixed so assertions can use exact amounts.

use chrono::NaiveDate;
use core_kernel::{CustomerId, Money};
use domain_billing::LineItemDraft;
use domain_party::NewCustomer;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for line items
pub struct LineItemFixtures;

impl LineItemFixtures {
    /// Two trial sessions at 50.00
    fn two_trials() -> LineItemDraft {
        LineItemDraft::new("Trial session", 2, Money::new(dec!(50.00)))
    }

    /// One hair styling at 25.00
    fn hair_styling() -> LineItemDraft {
        LineItemDraft::new("Hair styling", 1, Money::new(dec!(25.00)))
    }

    /// The reference package: `2 × 50.00 + 1 × 25.00 = 125.00`
    pub fn wedding_package() -> Vec<LineItemDraft> {
        vec![Self::two_trials(), Self::hair_styling()]
    }
}

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// Wedding-season issue date (Nov 5, 2024)
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
    }

    /// Two weeks after the issue date
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 19).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic customer ID for testing
    pub fn customer_id() -> CustomerId {
        CustomerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }
}

/// Fixture for customers
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// Test email address
    fn email() -> &'static str {
        "ayesha.rahman@example.com"
    }

    /// Test phone number
    fn phone() -> &'static str {
        "+91-98765-43210"
    }

    /// A complete, valid customer request
    pub fn bride() -> NewCustomer {
        NewCustomer::named("Ayesha Rahman")
            .with_email(Self::email())
            .with_phone(Self::phone())
    }
}
