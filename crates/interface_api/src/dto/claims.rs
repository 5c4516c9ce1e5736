//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{
    AttachmentId, BnplPlanId, ClinicId, Currency, Money, PatientId, PayerId, PlanId, Rate, UserId,
};
use domain_claims::aging::{aging_days, AgingBucket};
use domain_claims::audit::TimelineEvent;
use domain_claims::claim::{Attachment, AttachmentKind, Claim, ClaimLine, ClaimStatus, Priority};
use domain_claims::draft::ClaimDraft;
use domain_claims::reconcile::{PayoutInfo, PayoutStatus};
use domain_claims::tasks::Task;
use domain_claims::totals::{ClaimTotals, CoverageTerms};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ClaimLineRequest {
    pub procedure_code: String,
    pub description: Option<String>,
    pub units: u32,
    pub charge: Decimal,
    pub modifiers: Option<Vec<String>>,
    pub diagnosis_pointers: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentRequest {
    pub name: String,
    pub kind: String,
    pub storage_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverageRequest {
    pub copay: Option<Decimal>,
    pub coinsurance_percent: Option<Decimal>,
    pub deductible_remaining: Option<Decimal>,
}

/// Draft payload accepted by create and autosave
#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub patient_id: Uuid,
    pub clinic_id: Option<Uuid>,
    pub payer_name: String,
    pub payer_id: Option<Uuid>,
    pub member_id: String,
    pub plan_id: Option<Uuid>,
    pub date_of_service_from: Option<NaiveDate>,
    pub date_of_service_to: Option<NaiveDate>,
    #[serde(default)]
    pub diagnosis_codes: Vec<String>,
    #[serde(default)]
    pub lines: Vec<ClaimLineRequest>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRequest>,
    pub bnpl_plan_id: Option<Uuid>,
    pub coverage: Option<CoverageRequest>,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<String>,
    pub notes: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClaimRequest {
    #[serde(flatten)]
    pub draft: DraftRequest,
    /// Stored draft to consume once the claim exists
    pub draft_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub to: String,
    pub reason: Option<String>,
    pub expected_version: Option<u64>,
    pub allowed_amount: Option<Decimal>,
    pub patient_responsibility: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct PayoutRequest {
    pub remittance_id: String,
    pub bank_ref_masked: String,
    pub amount: Decimal,
    pub initiated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub payout: PayoutRequest,
}

/// Coverage overrides for the totals endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TotalsQuery {
    pub copay: Option<Decimal>,
    pub coinsurance_percent: Option<Decimal>,
    pub deductible_remaining: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub claim_number: String,
    pub patient_id: Uuid,
    pub payer_name: String,
    pub member_id: String,
    pub status: String,
    pub priority: String,
    pub date_of_service_from: NaiveDate,
    pub currency: String,
    pub total_amount: Decimal,
    pub allowed_amount: Option<Decimal>,
    pub paid_amount: Decimal,
    pub patient_responsibility: Option<Decimal>,
    pub expected_payer_responsibility: Option<Decimal>,
    pub expected_patient_responsibility: Option<Decimal>,
    pub financed_portion: Option<Decimal>,
    pub aging_days: u32,
    pub aging_bucket: String,
    pub created_at: DateTime<Utc>,
    pub submission_date: Option<DateTime<Utc>>,
    pub response_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_required: bool,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TimelineEventResponse {
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimelineDayResponse {
    pub date: NaiveDate,
    pub events: Vec<TimelineEventResponse>,
}

#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub remittance_id: String,
    pub bank_ref_masked: String,
    pub amount: Decimal,
    pub status: String,
    pub initiated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub reconciled: bool,
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub currency: String,
    pub gross: Decimal,
    pub payer: Decimal,
    pub patient: Decimal,
    pub financed: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AutosaveResponse {
    pub draft_id: Uuid,
    pub sequence: u64,
}

pub fn parse_status(value: &str) -> Result<ClaimStatus, ApiError> {
    match value {
        "submitted" => Ok(ClaimStatus::Submitted),
        "pending" => Ok(ClaimStatus::Pending),
        "accepted" => Ok(ClaimStatus::Accepted),
        "denied" => Ok(ClaimStatus::Denied),
        "rejected" => Ok(ClaimStatus::Rejected),
        "paid" => Ok(ClaimStatus::Paid),
        "retired" => Ok(ClaimStatus::Retired),
        other => Err(ApiError::BadRequest(format!("Unknown status: {}", other))),
    }
}

pub fn status_str(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Submitted => "submitted",
        ClaimStatus::Pending => "pending",
        ClaimStatus::Accepted => "accepted",
        ClaimStatus::Denied => "denied",
        ClaimStatus::Rejected => "rejected",
        ClaimStatus::Paid => "paid",
        ClaimStatus::Retired => "retired",
    }
}

fn parse_currency(value: Option<&str>) -> Result<Currency, ApiError> {
    match value.unwrap_or("USD") {
        "USD" => Ok(Currency::USD),
        "CAD" => Ok(Currency::CAD),
        "EUR" => Ok(Currency::EUR),
        "GBP" => Ok(Currency::GBP),
        other => Err(ApiError::BadRequest(format!("Unknown currency: {}", other))),
    }
}

fn parse_priority(value: Option<&str>) -> Result<Priority, ApiError> {
    match value.unwrap_or("normal") {
        "low" => Ok(Priority::Low),
        "normal" => Ok(Priority::Normal),
        "urgent" => Ok(Priority::Urgent),
        other => Err(ApiError::BadRequest(format!("Unknown priority: {}", other))),
    }
}

fn parse_attachment_kind(value: &str) -> Result<AttachmentKind, ApiError> {
    match value {
        "clinical" => Ok(AttachmentKind::Clinical),
        "authorization" => Ok(AttachmentKind::Authorization),
        "other" => Ok(AttachmentKind::Other),
        other => Err(ApiError::BadRequest(format!(
            "Unknown attachment kind: {}",
            other
        ))),
    }
}

fn parse_payout_status(value: &str) -> Result<PayoutStatus, ApiError> {
    match value {
        "pending" => Ok(PayoutStatus::Pending),
        "processing" => Ok(PayoutStatus::Processing),
        "settled" => Ok(PayoutStatus::Settled),
        "failed" => Ok(PayoutStatus::Failed),
        other => Err(ApiError::BadRequest(format!(
            "Unknown payout status: {}",
            other
        ))),
    }
}

pub fn coverage_terms(
    currency: Currency,
    copay: Option<Decimal>,
    coinsurance_percent: Option<Decimal>,
    deductible_remaining: Option<Decimal>,
) -> CoverageTerms {
    CoverageTerms {
        currency,
        copay: copay.map(|c| Money::new(c, currency)),
        coinsurance: coinsurance_percent.map(Rate::from_percentage),
        deductible_remaining: deductible_remaining.map(|d| Money::new(d, currency)),
    }
}

impl DraftRequest {
    /// Maps the wire payload into the domain draft
    pub fn into_draft(self) -> Result<ClaimDraft, ApiError> {
        let currency = parse_currency(self.currency.as_deref())?;

        let lines = self
            .lines
            .into_iter()
            .map(|l| ClaimLine {
                procedure_code: l.procedure_code,
                description: l.description,
                units: l.units,
                charge: Money::new(l.charge, currency),
                modifiers: l.modifiers,
                diagnosis_pointers: l.diagnosis_pointers,
            })
            .collect();

        let attachments = self
            .attachments
            .into_iter()
            .map(|a| {
                Ok(Attachment {
                    id: AttachmentId::new(),
                    name: a.name,
                    kind: parse_attachment_kind(&a.kind)?,
                    storage_ref: a.storage_ref,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        let coverage = self
            .coverage
            .map(|c| coverage_terms(currency, c.copay, c.coinsurance_percent, c.deductible_remaining));

        Ok(ClaimDraft {
            patient_id: PatientId::from(self.patient_id),
            clinic_id: self.clinic_id.map(ClinicId::from),
            payer_name: self.payer_name,
            payer_id: self.payer_id.map(PayerId::from),
            member_id: self.member_id,
            plan_id: self.plan_id.map(PlanId::from),
            date_of_service_from: self.date_of_service_from,
            date_of_service_to: self.date_of_service_to,
            diagnosis_codes: self.diagnosis_codes,
            lines,
            attachments,
            bnpl_plan_id: self.bnpl_plan_id.map(BnplPlanId::from),
            coverage,
            assignee_id: self.assignee_id.map(UserId::from),
            priority: parse_priority(self.priority.as_deref())?,
            notes: self.notes,
        })
    }
}

impl PayoutRequest {
    pub fn into_payout(self, currency: Currency) -> Result<PayoutInfo, ApiError> {
        Ok(PayoutInfo {
            remittance_id: self.remittance_id,
            bank_ref_masked: self.bank_ref_masked,
            amount: Money::new(self.amount, currency),
            initiated_at: self.initiated_at,
            settled_at: self.settled_at,
            status: parse_payout_status(&self.status)?,
            reconciled: false,
        })
    }
}

impl ClaimResponse {
    pub fn from_claim(claim: &Claim, now: DateTime<Utc>) -> Self {
        let days = aging_days(claim, now);
        Self {
            id: *claim.id.as_uuid(),
            claim_number: claim.claim_number.clone(),
            patient_id: *claim.patient_id.as_uuid(),
            payer_name: claim.payer_name.clone(),
            member_id: claim.member_id.clone(),
            status: status_str(claim.status).to_string(),
            priority: format!("{:?}", claim.priority).to_lowercase(),
            date_of_service_from: claim.date_of_service_from,
            currency: claim.total_amount.currency().code().to_string(),
            total_amount: claim.total_amount.amount(),
            allowed_amount: claim.allowed_amount.map(|m| m.amount()),
            paid_amount: claim.paid_amount.amount(),
            patient_responsibility: claim.patient_responsibility.map(|m| m.amount()),
            expected_payer_responsibility: claim.expected_payer_responsibility.map(|m| m.amount()),
            expected_patient_responsibility: claim
                .expected_patient_responsibility
                .map(|m| m.amount()),
            financed_portion: claim.financed_portion.map(|m| m.amount()),
            aging_days: days,
            aging_bucket: AgingBucket::for_days(days).label().to_string(),
            created_at: claim.created_at,
            submission_date: claim.submission_date,
            response_date: claim.response_date,
            payment_date: claim.payment_date,
            updated_at: claim.updated_at,
            version: claim.version,
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            is_required: task.is_required,
            is_completed: task.is_completed,
            due_date: task.due_date,
            assigned_to: task.assigned_to.map(|u| *u.as_uuid()),
            completed_by: task.completed_by,
            completed_at: task.completed_at,
        }
    }
}

impl From<&TimelineEvent> for TimelineEventResponse {
    fn from(event: &TimelineEvent) -> Self {
        match event {
            TimelineEvent::Milestone { milestone, timestamp } => Self {
                timestamp: *timestamp,
                kind: "milestone".to_string(),
                summary: format!("{:?}", milestone),
                actor: None,
                field: None,
            },
            TimelineEvent::Audit { entry } => Self {
                timestamp: entry.timestamp,
                kind: "audit".to_string(),
                summary: format!("{:?}", entry.action),
                actor: Some(entry.actor.clone()),
                field: entry.field.clone(),
            },
        }
    }
}

impl From<PayoutInfo> for PayoutResponse {
    fn from(payout: PayoutInfo) -> Self {
        Self {
            remittance_id: payout.remittance_id,
            bank_ref_masked: payout.bank_ref_masked,
            amount: payout.amount.amount(),
            status: format!("{:?}", payout.status).to_lowercase(),
            initiated_at: payout.initiated_at,
            settled_at: payout.settled_at,
            reconciled: payout.reconciled,
        }
    }
}

impl From<ClaimTotals> for TotalsResponse {
    fn from(totals: ClaimTotals) -> Self {
        Self {
            currency: totals.gross.currency().code().to_string(),
            gross: totals.gross.amount(),
            payer: totals.payer.amount(),
            patient: totals.patient.amount(),
            financed: totals.financed.amount(),
        }
    }
}
