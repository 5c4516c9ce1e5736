//! Property-Based Test Generators
//!
//! Proptest strategies for generating claim data that maintains domain
//! invariants.

use core_kernel::{Currency, Money, Rate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::claim::ClaimLine;
use domain_claims::totals::CoverageTerms;

/// Strategy for valid positive line charges in minor units
pub fn charge_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..5_000_00i64
}

/// Strategy for a single claim line with a routine procedure code
pub fn claim_line_strategy() -> impl Strategy<Value = ClaimLine> {
    (charge_minor_strategy(), 1u32..10u32).prop_map(|(minor, units)| ClaimLine {
        procedure_code: "99213".to_string(),
        description: None,
        units,
        charge: Money::from_minor(minor, Currency::USD),
        modifiers: None,
        diagnosis_pointers: None,
    })
}

/// Strategy for a non-empty set of claim lines
pub fn claim_lines_strategy() -> impl Strategy<Value = Vec<ClaimLine>> {
    prop::collection::vec(claim_line_strategy(), 1..8)
}

/// Strategy for coinsurance rates between 0% and 100%
pub fn coinsurance_strategy() -> impl Strategy<Value = Rate> {
    (0u32..10_000u32).prop_map(|bp| Rate::new(Decimal::new(bp as i64, 4)))
}

/// Strategy for arbitrary coverage terms, including oversized cost shares
pub fn coverage_terms_strategy() -> impl Strategy<Value = CoverageTerms> {
    (
        prop::option::of(0i64..100_000i64),
        prop::option::of(coinsurance_strategy()),
        prop::option::of(0i64..1_000_000i64),
    )
        .prop_map(|(copay, coinsurance, deductible)| CoverageTerms {
            currency: Currency::USD,
            copay: copay.map(|m| Money::from_minor(m, Currency::USD)),
            coinsurance,
            deductible_remaining: deductible.map(|m| Money::from_minor(m, Currency::USD)),
        })
}

/// Strategy for day counts across every aging bucket
pub fn aging_days_strategy() -> impl Strategy<Value = u32> {
    0u32..100u32
}
