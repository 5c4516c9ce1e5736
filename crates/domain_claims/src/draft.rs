//! Claim drafts and wizard autosave
//!
//! A draft is the pre-submission working copy of a claim: same shape minus
//! the server-assigned identity and lifecycle timestamps, plus transient
//! notes. Drafts only become claims through the submission validator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use core_kernel::{BnplPlanId, ClinicId, DraftId, Money, PatientId, PayerId, PlanId, UserId};

use crate::claim::{Attachment, ClaimLine, Priority};
use crate::error::ClaimError;
use crate::totals::CoverageTerms;

/// Mutable pre-submission working copy of a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDraft {
    pub patient_id: PatientId,
    pub clinic_id: Option<ClinicId>,
    pub payer_name: String,
    pub payer_id: Option<PayerId>,
    pub member_id: String,
    pub plan_id: Option<PlanId>,
    pub date_of_service_from: Option<NaiveDate>,
    pub date_of_service_to: Option<NaiveDate>,
    pub diagnosis_codes: Vec<String>,
    pub lines: Vec<ClaimLine>,
    pub attachments: Vec<Attachment>,
    pub bnpl_plan_id: Option<BnplPlanId>,
    /// Coverage parameters captured in the wizard; drives the expected
    /// BNPL split at submission time
    pub coverage: Option<CoverageTerms>,
    pub assignee_id: Option<UserId>,
    pub priority: Priority,
    /// Transient working notes, not carried onto the claim
    pub notes: Option<String>,
}

impl ClaimDraft {
    /// Sum of line charges (charges are already-extended totals)
    pub fn gross_amount(&self) -> Money {
        let currency = self
            .lines
            .first()
            .map(|l| l.charge.currency())
            .unwrap_or(core_kernel::Currency::USD);
        self.lines
            .iter()
            .fold(Money::zero(currency), |acc, line| acc + line.charge)
    }
}

/// Supersession guard for draft autosave
///
/// The wizard autosaves each open draft as a debounced background write
/// with at most one save in flight per draft. The guard hands out
/// monotonically increasing sequence numbers; an older in-flight save
/// whose sequence is no longer current must not be written.
#[derive(Debug, Default)]
pub struct AutosaveGuard {
    latest: Mutex<HashMap<DraftId, u64>>,
}

impl AutosaveGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new autosave attempt and returns its sequence number
    pub fn begin(&self, draft_id: DraftId) -> u64 {
        let mut latest = self.latest.lock().expect("autosave guard poisoned");
        let seq = latest.get(&draft_id).copied().unwrap_or(0) + 1;
        latest.insert(draft_id, seq);
        seq
    }

    /// Checks that `seq` is still the newest attempt for the draft
    ///
    /// Returns `Superseded` if a later autosave began in the meantime;
    /// the caller must drop its write.
    pub fn check_current(&self, draft_id: DraftId, seq: u64) -> Result<(), ClaimError> {
        let latest = self.latest.lock().expect("autosave guard poisoned");
        match latest.get(&draft_id) {
            Some(&current) if current == seq => Ok(()),
            _ => Err(ClaimError::Superseded(draft_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_monotonic_per_draft() {
        let guard = AutosaveGuard::new();
        let a = DraftId::new();
        let b = DraftId::new();

        assert_eq!(guard.begin(a), 1);
        assert_eq!(guard.begin(a), 2);
        assert_eq!(guard.begin(b), 1);
    }

    #[test]
    fn test_older_save_is_superseded() {
        let guard = AutosaveGuard::new();
        let draft_id = DraftId::new();

        let first = guard.begin(draft_id);
        let second = guard.begin(draft_id);

        assert!(matches!(
            guard.check_current(draft_id, first),
            Err(ClaimError::Superseded(_))
        ));
        assert!(guard.check_current(draft_id, second).is_ok());
    }
}
