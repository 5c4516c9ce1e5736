//! Claim aging
//!
//! Days outstanding since submission, bucketed into the dashboard's fixed
//! severity scale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::whole_days_between;

use crate::claim::Claim;

/// Fixed, non-overlapping aging buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    ZeroToThree,
    FourToSeven,
    EightToFourteen,
    FifteenPlus,
}

impl AgingBucket {
    /// Maps a day count to its bucket
    ///
    /// Total over all of `u32`: every non-negative day count lands in
    /// exactly one bucket.
    pub fn for_days(days: u32) -> Self {
        match days {
            0..=3 => AgingBucket::ZeroToThree,
            4..=7 => AgingBucket::FourToSeven,
            8..=14 => AgingBucket::EightToFourteen,
            _ => AgingBucket::FifteenPlus,
        }
    }

    /// Display label used by the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::ZeroToThree => "0-3",
            AgingBucket::FourToSeven => "4-7",
            AgingBucket::EightToFourteen => "8-14",
            AgingBucket::FifteenPlus => "15+",
        }
    }
}

/// Whole days the claim has been outstanding
///
/// Measured from the submission date, falling back to creation for a
/// claim that was never submitted. Clock skew clamps to zero rather than
/// going negative.
pub fn aging_days(claim: &Claim, now: DateTime<Utc>) -> u32 {
    let reference = claim.submission_date.unwrap_or(claim.created_at);
    whole_days_between(reference, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(AgingBucket::for_days(0), AgingBucket::ZeroToThree);
        assert_eq!(AgingBucket::for_days(3), AgingBucket::ZeroToThree);
        assert_eq!(AgingBucket::for_days(4), AgingBucket::FourToSeven);
        assert_eq!(AgingBucket::for_days(7), AgingBucket::FourToSeven);
        assert_eq!(AgingBucket::for_days(8), AgingBucket::EightToFourteen);
        assert_eq!(AgingBucket::for_days(14), AgingBucket::EightToFourteen);
        assert_eq!(AgingBucket::for_days(15), AgingBucket::FifteenPlus);
        assert_eq!(AgingBucket::for_days(400), AgingBucket::FifteenPlus);
    }

    #[test]
    fn test_labels() {
        assert_eq!(AgingBucket::for_days(2).label(), "0-3");
        assert_eq!(AgingBucket::for_days(15).label(), "15+");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn bucket_assignment_is_total_and_ordered(days in 0u32..100_000u32) {
            // Every day count maps to exactly one bucket, and bucket
            // order follows day order
            let bucket = AgingBucket::for_days(days);
            let expected = if days <= 3 {
                AgingBucket::ZeroToThree
            } else if days <= 7 {
                AgingBucket::FourToSeven
            } else if days <= 14 {
                AgingBucket::EightToFourteen
            } else {
                AgingBucket::FifteenPlus
            };
            prop_assert_eq!(bucket, expected);
        }
    }
}
