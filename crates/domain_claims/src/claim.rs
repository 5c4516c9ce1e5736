//! Claim aggregate and status state machine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    AttachmentId, BnplPlanId, ClaimId, ClinicId, Money, PatientId, PayerId, PlanId, UserId,
};

use crate::audit::{AuditAction, AuditEntry};
use crate::draft::ClaimDraft;
use crate::error::ClaimError;
use crate::reconcile::PayoutInfo;
use crate::totals::derive_totals;

/// Claim lifecycle status
///
/// The draft stage is implicit: a [`ClaimDraft`] only becomes a `Claim`
/// through submission, so a stored claim is never in a draft state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Submitted to the payer, awaiting adjudication
    Submitted,
    /// Payer requested more information
    Pending,
    /// Adjudicated in the member's favor
    Accepted,
    /// Adjudicated against the member
    Denied,
    /// Rejected before adjudication (e.g. malformed)
    Rejected,
    /// Payment received from the payer
    Paid,
    /// Terminal compliance state; claims are never hard-deleted
    Retired,
}

/// Work queue priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    Urgent,
}

/// Attachment classification used by the submission rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Clinical,
    Authorization,
    Other,
}

/// Attachment metadata; binary storage is an external collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    pub kind: AttachmentKind,
    /// Opaque reference into the external attachment store
    pub storage_ref: Option<String>,
}

/// A single service line on a claim
///
/// `charge` is the already-extended line total, not a per-unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimLine {
    pub procedure_code: String,
    pub description: Option<String>,
    pub units: u32,
    pub charge: Money,
    pub modifiers: Option<Vec<String>>,
    pub diagnosis_pointers: Option<Vec<u8>>,
}

/// The durable record of a submitted insurance claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Human-readable claim number, immutable once assigned
    pub claim_number: String,
    /// Patient the services were rendered to
    pub patient_id: PatientId,
    /// Rendering clinic
    pub clinic_id: Option<ClinicId>,
    /// Payer display name
    pub payer_name: String,
    /// Payer directory id
    pub payer_id: Option<PayerId>,
    /// Member id on the payer's plan
    pub member_id: String,
    /// Plan directory id
    pub plan_id: Option<PlanId>,
    /// Start of the service window
    pub date_of_service_from: NaiveDate,
    /// End of the service window
    pub date_of_service_to: Option<NaiveDate>,
    /// Ordered diagnosis codes
    pub diagnosis_codes: Vec<String>,
    /// Ordered service lines
    pub lines: Vec<ClaimLine>,
    /// Gross billed amount
    pub total_amount: Money,
    /// Payer-approved amount, set on adjudication response
    pub allowed_amount: Option<Money>,
    /// Total received from the payer
    pub paid_amount: Money,
    /// Post-adjudication patient share
    pub patient_responsibility: Option<Money>,
    /// Status
    pub status: ClaimStatus,
    /// Lifecycle timestamps
    pub created_at: DateTime<Utc>,
    pub submission_date: Option<DateTime<Utc>>,
    pub response_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// BNPL linkage; expected/derived values, distinct from the
    /// adjudicated actuals above
    pub bnpl_plan_id: Option<BnplPlanId>,
    pub expected_payer_responsibility: Option<Money>,
    pub expected_patient_responsibility: Option<Money>,
    pub financed_portion: Option<Money>,
    /// Attachment metadata
    pub attachments: Vec<Attachment>,
    /// Work assignment
    pub assignee_id: Option<UserId>,
    pub priority: Priority,
    /// Linked payout, present once reconciliation has been attempted
    pub payout: Option<PayoutInfo>,
    /// Optimistic-concurrency version, bumped on every write
    pub version: u64,
}

impl Claim {
    /// Promotes a validated draft into a submitted claim
    ///
    /// Callers must run [`crate::validation::validate_for_submit`] first;
    /// this constructor assumes the draft is structurally sound. Returns
    /// the claim together with the audit entries the promotion produced
    /// (`Created` followed by `Submitted`).
    pub fn from_draft(draft: ClaimDraft, actor: &str, now: DateTime<Utc>) -> (Self, Vec<AuditEntry>) {
        let id = ClaimId::new_v7();
        let total_amount = draft.gross_amount();

        let (expected_payer, expected_patient, financed) = match draft.coverage.as_ref() {
            Some(coverage) => match derive_totals(&draft.lines, coverage) {
                Ok(totals) => (Some(totals.payer), Some(totals.patient), Some(totals.financed)),
                Err(_) => (None, None, None),
            },
            None => (None, None, None),
        };

        let claim = Self {
            id,
            claim_number: generate_claim_number(),
            patient_id: draft.patient_id,
            clinic_id: draft.clinic_id,
            payer_name: draft.payer_name,
            payer_id: draft.payer_id,
            member_id: draft.member_id,
            plan_id: draft.plan_id,
            date_of_service_from: draft.date_of_service_from.expect("validated draft has a service date"),
            date_of_service_to: draft.date_of_service_to,
            diagnosis_codes: draft.diagnosis_codes,
            lines: draft.lines,
            total_amount,
            allowed_amount: None,
            paid_amount: Money::zero(total_amount.currency()),
            patient_responsibility: None,
            status: ClaimStatus::Submitted,
            created_at: now,
            submission_date: Some(now),
            response_date: None,
            payment_date: None,
            updated_at: now,
            bnpl_plan_id: draft.bnpl_plan_id,
            expected_payer_responsibility: expected_payer,
            expected_patient_responsibility: expected_patient,
            financed_portion: financed,
            attachments: draft.attachments,
            assignee_id: draft.assignee_id,
            priority: draft.priority,
            payout: None,
            version: 1,
        };

        let entries = vec![
            AuditEntry::lifecycle(id, AuditAction::Created, actor, now),
            AuditEntry::lifecycle(id, AuditAction::Submitted, actor, now),
        ];

        (claim, entries)
    }

    /// Applies a lifecycle transition
    ///
    /// On success the status changes, `updated_at` and the relevant date
    /// field are stamped, the version is bumped, and the audit entry to
    /// append is returned. Illegal transitions leave the claim untouched.
    pub fn transition_to(
        &mut self,
        to: ClaimStatus,
        actor: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, ClaimError> {
        if !self.can_transition_to(to) {
            return Err(ClaimError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", to),
            });
        }

        let from = self.status;
        let action = match to {
            ClaimStatus::Submitted if matches!(from, ClaimStatus::Denied | ClaimStatus::Rejected) => {
                AuditAction::Resubmitted
            }
            ClaimStatus::Submitted => AuditAction::Submitted,
            _ => AuditAction::Updated,
        };

        match to {
            ClaimStatus::Submitted => self.submission_date = Some(now),
            ClaimStatus::Accepted | ClaimStatus::Denied | ClaimStatus::Rejected => {
                self.response_date = Some(now);
            }
            ClaimStatus::Paid => self.payment_date = Some(now),
            ClaimStatus::Pending | ClaimStatus::Retired => {}
        }

        self.status = to;
        self.updated_at = now;
        self.version += 1;

        tracing::info!(
            claim_id = %self.id,
            from = ?from,
            to = ?to,
            "claim status transition"
        );

        let mut entry = AuditEntry::lifecycle(self.id, action, actor, now)
            .with_field("status", format!("{:?}", from), format!("{:?}", to));
        entry.origin = reason;
        Ok(entry)
    }

    /// Records the payer's adjudication amounts
    ///
    /// Enforces `allowed_amount <= total_amount`. Emits one `Updated`
    /// audit entry per changed field.
    pub fn record_adjudication(
        &mut self,
        allowed_amount: Option<Money>,
        patient_responsibility: Option<Money>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AuditEntry>, ClaimError> {
        let mut entries = Vec::new();

        if let Some(allowed) = allowed_amount {
            if allowed.amount() > self.total_amount.amount() {
                return Err(ClaimError::AmountInvariant(format!(
                    "allowed {} exceeds billed total {}",
                    allowed, self.total_amount
                )));
            }
            entries.push(self.edit_field(
                "allowed_amount",
                self.allowed_amount.map(|m| m.to_string()),
                allowed.to_string(),
                actor,
                now,
            ));
            self.allowed_amount = Some(allowed);
        }

        if let Some(patient) = patient_responsibility {
            entries.push(self.edit_field(
                "patient_responsibility",
                self.patient_responsibility.map(|m| m.to_string()),
                patient.to_string(),
                actor,
                now,
            ));
            self.patient_responsibility = Some(patient);
        }

        Ok(entries)
    }

    /// Records the payer remittance amount
    ///
    /// Enforces `paid_amount <= allowed_amount` when an allowed amount is
    /// known.
    pub fn record_payment(
        &mut self,
        amount: Money,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, ClaimError> {
        if let Some(allowed) = self.allowed_amount {
            if amount.amount() > allowed.amount() {
                return Err(ClaimError::AmountInvariant(format!(
                    "payment {} exceeds allowed amount {}",
                    amount, allowed
                )));
            }
        }

        let entry = self.edit_field(
            "paid_amount",
            Some(self.paid_amount.to_string()),
            amount.to_string(),
            actor,
            now,
        );
        self.paid_amount = amount;
        Ok(entry)
    }

    /// Checks if a transition is in the lifecycle table
    ///
    /// `Retired` is reachable from every non-retired state; hard deletion
    /// is not offered anywhere.
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Submitted, Pending) |
            (Submitted, Accepted) |
            (Submitted, Denied) |
            (Submitted, Rejected) |
            (Pending, Submitted) |
            (Pending, Accepted) |
            (Pending, Denied) |
            (Accepted, Paid) |
            (Denied, Submitted) |
            (Rejected, Submitted)
        ) || (target == Retired && self.status != Retired)
    }

    /// Emits a field-level edit entry and bumps the write version
    fn edit_field(
        &mut self,
        field: &str,
        old_value: Option<String>,
        new_value: String,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AuditEntry {
        self.updated_at = now;
        self.version += 1;
        let mut entry = AuditEntry::lifecycle(self.id, AuditAction::Updated, actor, now);
        entry.field = Some(field.to_string());
        entry.old_value = old_value;
        entry.new_value = Some(new_value);
        entry
    }
}

fn generate_claim_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("CLM-{}", duration.as_millis() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn base_claim() -> Claim {
        let draft = crate::draft::ClaimDraft {
            patient_id: PatientId::new_v7(),
            clinic_id: None,
            payer_name: "Acme Health".to_string(),
            payer_id: None,
            member_id: "MBR-1001".to_string(),
            plan_id: None,
            date_of_service_from: Some(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()),
            date_of_service_to: None,
            diagnosis_codes: vec!["E11.9".to_string()],
            lines: vec![ClaimLine {
                procedure_code: "99213".to_string(),
                description: None,
                units: 1,
                charge: Money::new(dec!(240), Currency::USD),
                modifiers: None,
                diagnosis_pointers: None,
            }],
            attachments: Vec::new(),
            bnpl_plan_id: None,
            coverage: None,
            assignee_id: None,
            priority: Priority::Normal,
            notes: None,
        };
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        Claim::from_draft(draft, "tester", now).0
    }

    #[test]
    fn test_from_draft_submits_and_stamps() {
        let claim = base_claim();
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert!(claim.claim_number.starts_with("CLM-"));
        assert_eq!(claim.submission_date, Some(claim.created_at));
        assert_eq!(claim.total_amount.amount(), dec!(240));
        assert_eq!(claim.version, 1);
    }

    #[test]
    fn test_valid_response_transition_stamps_response_date() {
        let mut claim = base_claim();
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();

        let entry = claim
            .transition_to(ClaimStatus::Denied, "payer-feed", None, now)
            .unwrap();

        assert_eq!(claim.status, ClaimStatus::Denied);
        assert_eq!(claim.response_date, Some(now));
        assert_eq!(entry.action, AuditAction::Updated);
        assert_eq!(claim.version, 2);
    }

    #[test]
    fn test_resubmit_emits_resubmitted_action() {
        let mut claim = base_claim();
        let t1 = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();

        claim.transition_to(ClaimStatus::Denied, "payer-feed", None, t1).unwrap();
        let entry = claim
            .transition_to(ClaimStatus::Submitted, "biller", None, t2)
            .unwrap();

        assert_eq!(entry.action, AuditAction::Resubmitted);
        assert_eq!(claim.submission_date, Some(t2));
    }

    #[test]
    fn test_paid_to_submitted_is_rejected() {
        let mut claim = base_claim();
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();

        claim.transition_to(ClaimStatus::Accepted, "payer-feed", None, now).unwrap();
        claim.transition_to(ClaimStatus::Paid, "payer-feed", None, now).unwrap();

        let result = claim.transition_to(ClaimStatus::Submitted, "biller", None, now);
        assert!(matches!(result, Err(ClaimError::InvalidTransition { .. })));
        assert_eq!(claim.status, ClaimStatus::Paid);
    }

    #[test]
    fn test_any_active_status_can_retire() {
        let mut claim = base_claim();
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        assert!(claim.transition_to(ClaimStatus::Retired, "admin", None, now).is_ok());
        assert!(claim
            .transition_to(ClaimStatus::Retired, "admin", None, now)
            .is_err());
    }

    #[test]
    fn test_adjudication_rejects_allowed_above_total() {
        let mut claim = base_claim();
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();

        let result = claim.record_adjudication(
            Some(Money::new(dec!(500), Currency::USD)),
            None,
            "payer-feed",
            now,
        );
        assert!(matches!(result, Err(ClaimError::AmountInvariant(_))));
    }

    #[test]
    fn test_payment_capped_by_allowed() {
        let mut claim = base_claim();
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();

        claim
            .record_adjudication(Some(Money::new(dec!(200), Currency::USD)), None, "payer-feed", now)
            .unwrap();
        let result = claim.record_payment(Money::new(dec!(210), Currency::USD), "payer-feed", now);
        assert!(matches!(result, Err(ClaimError::AmountInvariant(_))));

        assert!(claim
            .record_payment(Money::new(dec!(200), Currency::USD), "payer-feed", now)
            .is_ok());
        assert_eq!(claim.paid_amount.amount(), dec!(200));
    }
}
