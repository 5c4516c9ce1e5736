//! Submission validation rules
//!
//! A draft must pass these checks before it can become a claim:
//!
//! - patient, service date, payer name, and member id are present
//! - at least one diagnosis code and one service line
//! - each line has a >=4 character procedure code, positive units, and a
//!   non-negative charge
//! - lines whose procedure code begins with `1` or `2` (surgical category
//!   convention) require at least one clinical attachment
//!
//! Issues are collected, not short-circuited: the caller gets every
//! problem in one pass so the wizard can route the user to all offending
//! steps at once. Field identifiers are stable and map to input
//! locations; how they are displayed is the consumer's concern.

use serde::{Deserialize, Serialize};

use crate::claim::AttachmentKind;
use crate::draft::ClaimDraft;

/// A single validation finding on a draft field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionIssue {
    /// Stable field identifier, e.g. `lines[2].units`
    pub field: String,
    pub message: String,
}

impl SubmissionIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Procedure codes in the surgical categories require clinical evidence
fn is_surgical_code(procedure_code: &str) -> bool {
    procedure_code.starts_with('1') || procedure_code.starts_with('2')
}

/// Validates a draft for submission
///
/// An empty result means the draft is submittable.
pub fn validate_for_submit(draft: &ClaimDraft) -> Vec<SubmissionIssue> {
    let mut issues = Vec::new();

    if draft.patient_id.as_uuid().is_nil() {
        issues.push(SubmissionIssue::new("patient_id", "A patient is required"));
    }

    if draft.date_of_service_from.is_none() {
        issues.push(SubmissionIssue::new(
            "date_of_service_from",
            "A service start date is required",
        ));
    }

    if draft.payer_name.trim().is_empty() {
        issues.push(SubmissionIssue::new("payer_name", "A payer name is required"));
    }

    if draft.member_id.trim().is_empty() {
        issues.push(SubmissionIssue::new("member_id", "A member id is required"));
    }

    if draft.diagnosis_codes.is_empty() {
        issues.push(SubmissionIssue::new(
            "diagnosis_codes",
            "At least one diagnosis code is required",
        ));
    }

    if draft.lines.is_empty() {
        issues.push(SubmissionIssue::new(
            "lines",
            "At least one service line is required",
        ));
    }

    for (i, line) in draft.lines.iter().enumerate() {
        if line.procedure_code.trim().len() < 4 {
            issues.push(SubmissionIssue::new(
                format!("lines[{}].procedure_code", i),
                "Procedure code must be at least 4 characters",
            ));
        }
        if line.units == 0 {
            issues.push(SubmissionIssue::new(
                format!("lines[{}].units", i),
                "Units must be a positive integer",
            ));
        }
        if line.charge.is_negative() {
            issues.push(SubmissionIssue::new(
                format!("lines[{}].charge", i),
                "Charge cannot be negative",
            ));
        }
    }

    let needs_clinical_doc = draft.lines.iter().any(|l| is_surgical_code(&l.procedure_code));
    let has_clinical_doc = draft
        .attachments
        .iter()
        .any(|a| a.kind == AttachmentKind::Clinical);

    if needs_clinical_doc && !has_clinical_doc {
        issues.push(SubmissionIssue::new(
            "attachments",
            "Surgical procedure codes require a clinical attachment",
        ));
    }

    issues
}
