//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, Money, PatientId, Rate, UserId};
use rust_decimal::Decimal;

use domain_claims::claim::{Attachment, AttachmentKind, ClaimLine, Priority};
use domain_claims::draft::ClaimDraft;
use domain_claims::reconcile::{PayoutInfo, PayoutStatus};
use domain_claims::totals::CoverageTerms;

use crate::fixtures::{MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for claim drafts
pub struct ClaimDraftBuilder {
    draft: ClaimDraft,
}

impl Default for ClaimDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimDraftBuilder {
    /// Creates a builder for a routine, submittable office-visit draft
    pub fn new() -> Self {
        Self {
            draft: ClaimDraft {
                patient_id: PatientId::new_v7(),
                clinic_id: None,
                payer_name: StringFixtures::payer_name().to_string(),
                payer_id: None,
                member_id: StringFixtures::member_id().to_string(),
                plan_id: None,
                date_of_service_from: Some(TemporalFixtures::service_date()),
                date_of_service_to: None,
                diagnosis_codes: vec![StringFixtures::diagnosis_code().to_string()],
                lines: vec![ClaimLine {
                    procedure_code: StringFixtures::office_visit_code().to_string(),
                    description: Some("Office visit, established patient".to_string()),
                    units: 1,
                    charge: MoneyFixtures::office_visit(),
                    modifiers: None,
                    diagnosis_pointers: Some(vec![0]),
                }],
                attachments: Vec::new(),
                bnpl_plan_id: None,
                coverage: None,
                assignee_id: None,
                priority: Priority::Normal,
                notes: None,
            },
        }
    }

    pub fn with_patient(mut self, patient_id: PatientId) -> Self {
        self.draft.patient_id = patient_id;
        self
    }

    pub fn with_payer_name(mut self, name: impl Into<String>) -> Self {
        self.draft.payer_name = name.into();
        self
    }

    pub fn with_member_id(mut self, member_id: impl Into<String>) -> Self {
        self.draft.member_id = member_id.into();
        self
    }

    /// Replaces the line items
    pub fn with_lines(mut self, lines: Vec<ClaimLine>) -> Self {
        self.draft.lines = lines;
        self
    }

    /// Adds a single line with the given code and charge
    pub fn with_line(mut self, procedure_code: &str, charge: Money) -> Self {
        self.draft.lines.push(ClaimLine {
            procedure_code: procedure_code.to_string(),
            description: None,
            units: 1,
            charge,
            modifiers: None,
            diagnosis_pointers: None,
        });
        self
    }

    /// Swaps the draft to a single surgical line (needs clinical doc)
    pub fn surgical(mut self) -> Self {
        self.draft.lines = vec![ClaimLine {
            procedure_code: StringFixtures::surgical_code().to_string(),
            description: Some("Debridement".to_string()),
            units: 1,
            charge: MoneyFixtures::surgical_charge(),
            modifiers: None,
            diagnosis_pointers: Some(vec![0]),
        }];
        self
    }

    pub fn with_clinical_attachment(mut self) -> Self {
        self.draft.attachments.push(Attachment {
            id: core_kernel::AttachmentId::new(),
            name: "op-note.pdf".to_string(),
            kind: AttachmentKind::Clinical,
            storage_ref: Some("attachments/op-note.pdf".to_string()),
        });
        self
    }

    pub fn with_coverage(mut self, coverage: CoverageTerms) -> Self {
        self.draft.coverage = Some(coverage);
        self
    }

    pub fn with_assignee(mut self, assignee: UserId) -> Self {
        self.draft.assignee_id = Some(assignee);
        self
    }

    pub fn build(self) -> ClaimDraft {
        self.draft
    }
}

/// Builder for coverage terms
pub struct CoverageTermsBuilder {
    terms: CoverageTerms,
}

impl Default for CoverageTermsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageTermsBuilder {
    pub fn new() -> Self {
        Self {
            terms: CoverageTerms::none(Currency::USD),
        }
    }

    pub fn with_copay(mut self, copay: Money) -> Self {
        self.terms.copay = Some(copay);
        self
    }

    pub fn with_coinsurance_percent(mut self, percent: Decimal) -> Self {
        self.terms.coinsurance = Some(Rate::from_percentage(percent));
        self
    }

    pub fn with_deductible_remaining(mut self, deductible: Money) -> Self {
        self.terms.deductible_remaining = Some(deductible);
        self
    }

    pub fn build(self) -> CoverageTerms {
        self.terms
    }
}

/// Builder for payout records
pub struct PayoutBuilder {
    payout: PayoutInfo,
}

impl PayoutBuilder {
    /// Creates a settled payout for the given amount
    pub fn settled(amount: Money) -> Self {
        Self {
            payout: PayoutInfo {
                remittance_id: "RA-20250309-001".to_string(),
                bank_ref_masked: "****4821".to_string(),
                amount,
                initiated_at: Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap(),
                settled_at: Some(TemporalFixtures::paid_at()),
                status: PayoutStatus::Settled,
                reconciled: false,
            },
        }
    }

    pub fn with_status(mut self, status: PayoutStatus) -> Self {
        self.payout.status = status;
        if status != PayoutStatus::Settled {
            self.payout.settled_at = None;
        }
        self
    }

    pub fn with_remittance_id(mut self, id: impl Into<String>) -> Self {
        self.payout.remittance_id = id.into();
        self
    }

    pub fn initiated_at(mut self, at: DateTime<Utc>) -> Self {
        self.payout.initiated_at = at;
        self
    }

    pub fn build(self) -> PayoutInfo {
        self.payout
    }
}
