//! Derived financial splits for BNPL financing
//!
//! Turns claim line charges and coverage parameters into the
//! gross / payer / patient / financed split. Pure and deterministic, so
//! the wizard can re-run it on every edit.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError, Rate};

use crate::claim::ClaimLine;

/// Coverage parameters applied when deriving the split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageTerms {
    pub currency: Currency,
    /// Flat copay collected up front
    pub copay: Option<Money>,
    /// Coinsurance share applied to the post-deductible base
    pub coinsurance: Option<Rate>,
    /// Deductible the member has left to meet this plan year
    pub deductible_remaining: Option<Money>,
}

impl CoverageTerms {
    /// Coverage with no member cost share; the payer owes everything
    pub fn none(currency: Currency) -> Self {
        Self {
            currency,
            copay: None,
            coinsurance: None,
            deductible_remaining: None,
        }
    }
}

/// The derived money split for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTotals {
    /// Sum of line charges
    pub gross: Money,
    /// Expected payer responsibility
    pub payer: Money,
    /// Expected patient responsibility, in whole currency units
    pub patient: Money,
    /// Portion financed under BNPL
    pub financed: Money,
}

/// Derives the gross / payer / patient / financed split
///
/// The patient share accumulates, in order: the flat copay; coinsurance
/// applied to the gross net of the remaining deductible (floored at
/// zero); and the deductible itself, capped at gross. The result is
/// clamped into `[0, gross]` and rounded to whole currency units, and the
/// payer share is the remainder, so `payer + patient == gross` always
/// holds and neither side can go negative.
///
/// The entire patient share is treated as financeable under BNPL. A
/// partial-down-payment policy would change only the `financed`
/// expression here.
pub fn derive_totals(lines: &[ClaimLine], coverage: &CoverageTerms) -> Result<ClaimTotals, MoneyError> {
    let currency = coverage.currency;
    let zero = Money::zero(currency);

    let mut gross = zero;
    for line in lines {
        gross = gross.checked_add(&line.charge)?;
    }

    let deductible_remaining = coverage.deductible_remaining.unwrap_or(zero);
    let deductible_applied = deductible_remaining.min(gross).max(zero);
    let coinsurance_base = gross.checked_sub(&deductible_remaining)?.max(zero);

    let mut patient = coverage.copay.unwrap_or(zero);
    if let Some(rate) = coverage.coinsurance {
        patient = patient.checked_add(&rate.apply(&coinsurance_base))?;
    }
    patient = patient.checked_add(&deductible_applied)?;

    // Rounding to whole units can nudge the share past a fractional
    // gross, so the clamp is re-applied after the rounding step.
    let patient = patient.clamp(zero, gross).round_bankers(0).clamp(zero, gross);
    let payer = gross.checked_sub(&patient)?;

    Ok(ClaimTotals {
        gross,
        payer,
        patient,
        financed: patient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(charge: Money) -> ClaimLine {
        ClaimLine {
            procedure_code: "99213".to_string(),
            description: None,
            units: 1,
            charge,
            modifiers: None,
            diagnosis_pointers: None,
        }
    }

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_no_cost_share_goes_entirely_to_payer() {
        let lines = vec![line(usd(dec!(300))), line(usd(dec!(200)))];
        let totals = derive_totals(&lines, &CoverageTerms::none(Currency::USD)).unwrap();

        assert_eq!(totals.gross, usd(dec!(500)));
        assert_eq!(totals.patient, usd(dec!(0)));
        assert_eq!(totals.payer, usd(dec!(500)));
        assert_eq!(totals.financed, usd(dec!(0)));
    }

    #[test]
    fn test_copay_coinsurance_and_deductible_accumulate_in_order() {
        let lines = vec![line(usd(dec!(1000)))];
        let coverage = CoverageTerms {
            currency: Currency::USD,
            copay: Some(usd(dec!(30))),
            coinsurance: Some(Rate::from_percentage(dec!(20))),
            deductible_remaining: Some(usd(dec!(200))),
        };

        let totals = derive_totals(&lines, &coverage).unwrap();

        // 30 copay + 20% of (1000 - 200) + 200 deductible = 390
        assert_eq!(totals.patient, usd(dec!(390)));
        assert_eq!(totals.payer, usd(dec!(610)));
        assert_eq!(totals.financed, totals.patient);
    }

    #[test]
    fn test_deductible_larger_than_gross_is_capped() {
        let lines = vec![line(usd(dec!(150)))];
        let coverage = CoverageTerms {
            currency: Currency::USD,
            copay: None,
            coinsurance: Some(Rate::from_percentage(dec!(20))),
            deductible_remaining: Some(usd(dec!(500))),
        };

        let totals = derive_totals(&lines, &coverage).unwrap();

        // Coinsurance base floors at 0; deductible caps at gross
        assert_eq!(totals.patient, usd(dec!(150)));
        assert_eq!(totals.payer, usd(dec!(0)));
    }

    #[test]
    fn test_oversized_copay_is_clamped_to_gross() {
        let lines = vec![line(usd(dec!(80)))];
        let coverage = CoverageTerms {
            currency: Currency::USD,
            copay: Some(usd(dec!(250))),
            coinsurance: None,
            deductible_remaining: None,
        };

        let totals = derive_totals(&lines, &coverage).unwrap();
        assert_eq!(totals.patient, usd(dec!(80)));
        assert_eq!(totals.payer, usd(dec!(0)));
    }

    #[test]
    fn test_patient_share_rounds_to_whole_units() {
        let lines = vec![line(usd(dec!(333.33)))];
        let coverage = CoverageTerms {
            currency: Currency::USD,
            copay: None,
            coinsurance: Some(Rate::from_percentage(dec!(20))),
            deductible_remaining: None,
        };

        let totals = derive_totals(&lines, &coverage).unwrap();
        assert_eq!(totals.patient, usd(dec!(67)));
        assert_eq!(totals.payer, usd(dec!(266.33)));
    }

    #[test]
    fn test_empty_lines_yield_zero_split() {
        let totals = derive_totals(&[], &CoverageTerms::none(Currency::USD)).unwrap();
        assert!(totals.gross.is_zero());
        assert!(totals.patient.is_zero());
        assert!(totals.payer.is_zero());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn arb_lines() -> impl Strategy<Value = Vec<ClaimLine>> {
        prop::collection::vec(1i64..5_000_00i64, 1..8).prop_map(|charges| {
            charges
                .into_iter()
                .map(|minor| ClaimLine {
                    procedure_code: "99213".to_string(),
                    description: None,
                    units: 1,
                    charge: Money::from_minor(minor, Currency::USD),
                    modifiers: None,
                    diagnosis_pointers: None,
                })
                .collect()
        })
    }

    fn arb_coverage() -> impl Strategy<Value = CoverageTerms> {
        (
            prop::option::of(0i64..100_000i64),
            prop::option::of(0u32..10_000u32),
            prop::option::of(0i64..1_000_000i64),
        )
            .prop_map(|(copay, coinsurance_bp, deductible)| CoverageTerms {
                currency: Currency::USD,
                copay: copay.map(|m| Money::from_minor(m, Currency::USD)),
                coinsurance: coinsurance_bp.map(|bp| Rate::new(Decimal::new(bp as i64, 4))),
                deductible_remaining: deductible.map(|m| Money::from_minor(m, Currency::USD)),
            })
    }

    proptest! {
        #[test]
        fn conservation_law_payer_plus_patient_equals_gross(
            lines in arb_lines(),
            coverage in arb_coverage()
        ) {
            let totals = derive_totals(&lines, &coverage).unwrap();
            prop_assert_eq!(
                totals.payer.amount() + totals.patient.amount(),
                totals.gross.amount()
            );
        }

        #[test]
        fn clamping_law_patient_within_gross(
            lines in arb_lines(),
            coverage in arb_coverage()
        ) {
            let totals = derive_totals(&lines, &coverage).unwrap();
            prop_assert!(!totals.patient.is_negative());
            prop_assert!(totals.patient.amount() <= totals.gross.amount());
            prop_assert!(!totals.payer.is_negative());
        }
    }
}
