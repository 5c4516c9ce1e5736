//! Follow-up task generation
//!
//! The checklist for a claim is a pure function of its status, regenerated
//! on every view. Task ids are stable strings so completion state, which
//! lives in a separate store, can be merged back in by id after any
//! regeneration.

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::UserId;

use crate::claim::{Claim, ClaimStatus};

/// Stable task ids
pub const REVIEW_DENIAL: &str = "review-denial";
pub const GATHER_DOCS: &str = "gather-docs";
pub const CORRECT_CODES: &str = "correct-codes";
pub const PROVIDE_INFO: &str = "provide-info";

/// A derived checklist item for a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Stable id, identical across regenerations for the same status
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_required: bool,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<UserId>,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Persisted completion state, keyed by stable task id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub task_id: String,
    pub completed_by: String,
    pub completed_at: DateTime<Utc>,
}

impl Task {
    fn new(id: &str, title: &str, description: &str, is_required: bool, claim: &Claim) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            is_required,
            is_completed: false,
            due_date: None,
            assigned_to: claim.assignee_id,
            completed_by: None,
            completed_at: None,
        }
    }

    fn due_in(mut self, anchor: DateTime<Utc>, days: u64) -> Self {
        self.due_date = anchor.checked_add_days(Days::new(days));
        self
    }
}

/// Generates the outstanding checklist for a claim's current status
///
/// Due dates are anchored to the claim's response date (falling back to
/// its last update), not to wall-clock time, so regeneration on an
/// unchanged claim is idempotent: same ids, flags, descriptions, and due
/// dates every call. Only merged-in completion state can differ.
pub fn tasks_for(claim: &Claim) -> Vec<Task> {
    let anchor = claim.response_date.unwrap_or(claim.updated_at);

    match claim.status {
        ClaimStatus::Denied | ClaimStatus::Rejected => vec![
            Task::new(
                REVIEW_DENIAL,
                "Review denial reason",
                "Read the payer's adjudication response and identify the denial reason codes",
                true,
                claim,
            )
            .due_in(anchor, 2),
            Task::new(
                GATHER_DOCS,
                "Gather supporting documents",
                "Collect the clinical documentation the payer needs for a resubmission",
                true,
                claim,
            )
            .due_in(anchor, 3),
            Task::new(
                CORRECT_CODES,
                "Correct procedure and diagnosis codes",
                "Check the coded procedures and diagnoses against the documentation",
                false,
                claim,
            ),
        ],
        ClaimStatus::Pending => vec![Task::new(
            PROVIDE_INFO,
            "Provide requested information",
            "Send the payer the additional information they asked for",
            true,
            claim,
        )
        .due_in(anchor, 5)],
        _ => Vec::new(),
    }
}

/// Merges persisted completion state into a freshly generated checklist
pub fn merge_completions(tasks: &mut [Task], completions: &HashMap<String, TaskCompletion>) {
    for task in tasks.iter_mut() {
        if let Some(completion) = completions.get(&task.id) {
            task.is_completed = true;
            task.completed_by = Some(completion.completed_by.clone());
            task.completed_at = Some(completion.completed_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use core_kernel::{Currency, Money, PatientId};
    use rust_decimal_macros::dec;

    use crate::claim::{ClaimLine, Priority};
    use crate::draft::ClaimDraft;

    fn claim_in(status: ClaimStatus) -> Claim {
        let draft = ClaimDraft {
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
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let (mut claim, _) = Claim::from_draft(draft, "tester", t0);
        if status != ClaimStatus::Submitted {
            let t1 = Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap();
            claim.transition_to(status, "payer-feed", None, t1).unwrap();
        }
        claim
    }

    #[test]
    fn test_denied_claim_checklist() {
        let claim = claim_in(ClaimStatus::Denied);
        let tasks = tasks_for(&claim);

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![REVIEW_DENIAL, GATHER_DOCS, CORRECT_CODES]);

        let review = &tasks[0];
        assert!(review.is_required);
        assert_eq!(
            review.due_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap())
        );
        assert_eq!(
            tasks[1].due_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 6, 12, 0, 0).unwrap())
        );
        assert!(!tasks[2].is_required);
        assert!(tasks[2].due_date.is_none());
    }

    #[test]
    fn test_pending_claim_gets_provide_info() {
        let claim = claim_in(ClaimStatus::Pending);
        let tasks = tasks_for(&claim);

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, PROVIDE_INFO);
        assert!(tasks[0].is_required);
    }

    #[test]
    fn test_accepted_claim_has_no_tasks() {
        let claim = claim_in(ClaimStatus::Accepted);
        assert!(tasks_for(&claim).is_empty());
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let claim = claim_in(ClaimStatus::Denied);
        let first = tasks_for(&claim);
        let second = tasks_for(&claim);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.is_required, b.is_required);
            assert_eq!(a.description, b.description);
            assert_eq!(a.due_date, b.due_date);
        }
    }

    #[test]
    fn test_completion_merges_by_id_across_regeneration() {
        let claim = claim_in(ClaimStatus::Denied);

        let mut completions = HashMap::new();
        completions.insert(
            REVIEW_DENIAL.to_string(),
            TaskCompletion {
                task_id: REVIEW_DENIAL.to_string(),
                completed_by: "biller".to_string(),
                completed_at: Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap(),
            },
        );

        let mut tasks = tasks_for(&claim);
        merge_completions(&mut tasks, &completions);

        assert!(tasks[0].is_completed);
        assert_eq!(tasks[0].completed_by.as_deref(), Some("biller"));
        assert!(!tasks[1].is_completed);
    }
}
