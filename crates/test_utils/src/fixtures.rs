//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the claims engine.
//! Fixtures are consistent and predictable for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, Money, PatientId, UserId};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A routine office-visit charge
    pub fn office_visit() -> Money {
        Money::new(dec!(240.00), Currency::USD)
    }

    /// A surgical line charge
    pub fn surgical_charge() -> Money {
        Money::new(dec!(1850.00), Currency::USD)
    }

    /// A typical specialist copay
    pub fn copay() -> Money {
        Money::new(dec!(30.00), Currency::USD)
    }

    /// Remaining deductible partway through a plan year
    pub fn deductible_remaining() -> Money {
        Money::new(dec!(200.00), Currency::USD)
    }

    /// The reconciliation tolerance used in tests
    pub fn one_cent() -> Money {
        Money::new(dec!(0.01), Currency::USD)
    }

    /// A zero USD amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Date the services were rendered
    pub fn service_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    /// Instant the claim was created and submitted
    pub fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    /// Instant the payer responded
    pub fn responded_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap()
    }

    /// Instant the payment landed
    pub fn paid_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, 15, 0, 0).unwrap()
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn payer_name() -> &'static str {
        "Acme Health"
    }

    pub fn member_id() -> &'static str {
        "MBR-1001"
    }

    /// An evaluation-and-management procedure code
    pub fn office_visit_code() -> &'static str {
        "99213"
    }

    /// A debridement code in the surgical category
    pub fn surgical_code() -> &'static str {
        "11042"
    }

    pub fn diagnosis_code() -> &'static str {
        "E11.9"
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn patient_id() -> PatientId {
        PatientId::new_v7()
    }

    pub fn assignee_id() -> UserId {
        UserId::new_v7()
    }
}
