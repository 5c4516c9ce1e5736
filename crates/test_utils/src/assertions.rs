//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_claims::totals::ClaimTotals;
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more
/// than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the money splitter's conservation and clamping laws
pub fn assert_split_laws(totals: &ClaimTotals) {
    assert_eq!(
        totals.payer.amount() + totals.patient.amount(),
        totals.gross.amount(),
        "Conservation violated: payer {} + patient {} != gross {}",
        totals.payer.amount(),
        totals.patient.amount(),
        totals.gross.amount()
    );
    assert!(
        !totals.patient.is_negative() && totals.patient.amount() <= totals.gross.amount(),
        "Clamping violated: patient {} outside [0, {}]",
        totals.patient.amount(),
        totals.gross.amount()
    );
    assert!(
        !totals.payer.is_negative(),
        "Payer share went negative: {}",
        totals.payer.amount()
    );
}
