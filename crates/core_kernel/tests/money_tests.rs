//! Unit tests for the Money module
//!
//! Tests cover money creation, arithmetic, installment allocation,
//! currency handling, and the rounding used by the split derivation.

use core_kernel::{Money, Currency, MoneyError, Rate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(250.50), Currency::USD);
        assert_eq!(m.amount(), dec!(250.50));
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_converts_cents_correctly() {
        let m = Money::from_minor(10050, Currency::USD);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::new(dec!(300.00), Currency::USD);
        let b = Money::new(dec!(125.25), Currency::USD);
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(425.25));
    }

    #[test]
    fn test_checked_add_rejects_currency_mismatch() {
        let a = Money::new(dec!(300.00), Currency::USD);
        let b = Money::new(dec!(125.25), Currency::GBP);
        assert!(matches!(
            a.checked_add(&b),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::new(dec!(100.00), Currency::USD);
        let b = Money::new(dec!(150.00), Currency::USD);
        let diff = a.checked_sub(&b).unwrap();
        assert!(diff.is_negative());
        assert_eq!(diff.amount(), dec!(-50.00));
    }

    #[test]
    fn test_multiply_by_rate() {
        let gross = Money::new(dec!(500.00), Currency::USD);
        let rate = Rate::from_percentage(dec!(20));
        assert_eq!(rate.apply(&gross).amount(), dec!(100.00));
    }
}

mod clamping {
    use super::*;

    #[test]
    fn test_clamp_within_bounds_is_identity() {
        let lo = Money::zero(Currency::USD);
        let hi = Money::new(dec!(1000), Currency::USD);
        let m = Money::new(dec!(400), Currency::USD);
        assert_eq!(m.clamp(lo, hi), m);
    }

    #[test]
    fn test_clamp_above_upper_bound() {
        let lo = Money::zero(Currency::USD);
        let hi = Money::new(dec!(1000), Currency::USD);
        let m = Money::new(dec!(4000), Currency::USD);
        assert_eq!(m.clamp(lo, hi), hi);
    }

    #[test]
    fn test_clamp_below_lower_bound() {
        let lo = Money::zero(Currency::USD);
        let hi = Money::new(dec!(1000), Currency::USD);
        let m = Money::new(dec!(-1), Currency::USD);
        assert_eq!(m.clamp(lo, hi), lo);
    }
}

mod installments {
    use super::*;

    #[test]
    fn test_allocate_distributes_remainder_to_first_parts() {
        let financed = Money::new(dec!(100.00), Currency::USD);
        let parts = financed.allocate(3).unwrap();

        assert_eq!(parts[0].amount(), dec!(33.34));
        assert_eq!(parts[1].amount(), dec!(33.33));
        assert_eq!(parts[2].amount(), dec!(33.33));
    }

    #[test]
    fn test_allocate_zero_parts_is_error() {
        let financed = Money::new(dec!(100.00), Currency::USD);
        assert!(matches!(
            financed.allocate(0),
            Err(MoneyError::InvalidAmount(_))
        ));
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_to_currency() {
        let m = Money::new(dec!(99.999), Currency::USD);
        assert_eq!(m.round_to_currency().amount(), dec!(100.00));
    }

    #[test]
    fn test_bankers_rounding_at_whole_units() {
        assert_eq!(
            Money::new(dec!(112.50), Currency::USD).round_bankers(0).amount(),
            dec!(112)
        );
        assert_eq!(
            Money::new(dec!(113.50), Currency::USD).round_bankers(0).amount(),
            dec!(114)
        );
    }
}
