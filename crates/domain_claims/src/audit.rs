//! Audit trail and timeline projection
//!
//! Audit entries are append-only: they are never edited or deleted, and
//! the timeline builder only reads them. The timeline merges structural
//! lifecycle milestones, derived straight from the claim's timestamp
//! fields, with the free-form audit records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AuditEntryId, ClaimId, Timezone};

use crate::claim::Claim;

/// Action recorded by an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Viewed,
    Submitted,
    Resubmitted,
}

/// An immutable audit record for one claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub claim_id: ClaimId,
    pub action: AuditAction,
    /// Field identifier for field-level edits
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form origin metadata, e.g. a transition reason
    pub origin: Option<String>,
}

impl AuditEntry {
    /// Creates a lifecycle entry with no field detail
    pub fn lifecycle(
        claim_id: ClaimId,
        action: AuditAction,
        actor: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditEntryId::new_v7(),
            claim_id,
            action,
            field: None,
            old_value: None,
            new_value: None,
            actor: actor.to_string(),
            timestamp,
            origin: None,
        }
    }

    /// Attaches field-level edit detail
    pub fn with_field(
        mut self,
        field: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        self.field = Some(field.into());
        self.old_value = Some(old_value.into());
        self.new_value = Some(new_value.into());
        self
    }
}

/// Structural lifecycle milestones derived from claim timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Created,
    Submitted,
    ResponseReceived,
    Paid,
}

/// One event on the claim timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// Derived from the claim's own timestamp fields
    Milestone {
        milestone: Milestone,
        timestamp: DateTime<Utc>,
    },
    /// A recorded audit entry
    Audit { entry: AuditEntry },
}

impl TimelineEvent {
    /// Returns the instant this event occurred
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineEvent::Milestone { timestamp, .. } => *timestamp,
            TimelineEvent::Audit { entry } => entry.timestamp,
        }
    }
}

/// Timeline events for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub events: Vec<TimelineEvent>,
}

/// Builds the ordered timeline for a claim
///
/// Merges structural milestones with the audit log, ascending by
/// timestamp. Read-only: neither input is mutated.
pub fn timeline(claim: &Claim, audit_log: &[AuditEntry]) -> Vec<TimelineEvent> {
    let mut events = Vec::with_capacity(audit_log.len() + 4);

    events.push(TimelineEvent::Milestone {
        milestone: Milestone::Created,
        timestamp: claim.created_at,
    });
    if let Some(submitted) = claim.submission_date {
        events.push(TimelineEvent::Milestone {
            milestone: Milestone::Submitted,
            timestamp: submitted,
        });
    }
    if let Some(responded) = claim.response_date {
        events.push(TimelineEvent::Milestone {
            milestone: Milestone::ResponseReceived,
            timestamp: responded,
        });
    }
    if let Some(paid) = claim.payment_date {
        events.push(TimelineEvent::Milestone {
            milestone: Milestone::Paid,
            timestamp: paid,
        });
    }

    events.extend(audit_log.iter().cloned().map(|entry| TimelineEvent::Audit { entry }));

    events.sort_by_key(|e| e.timestamp());
    events
}

/// Groups an ordered timeline by calendar date in the display timezone
pub fn group_by_date(events: &[TimelineEvent], tz: Timezone) -> Vec<TimelineDay> {
    let mut days: Vec<TimelineDay> = Vec::new();

    for event in events {
        let date = tz.calendar_date(event.timestamp());
        match days.last_mut() {
            Some(day) if day.date == date => day.events.push(event.clone()),
            _ => days.push(TimelineDay {
                date,
                events: vec![event.clone()],
            }),
        }
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::{Currency, Money, PatientId};
    use rust_decimal_macros::dec;

    use crate::claim::{ClaimLine, ClaimStatus, Priority};
    use crate::draft::ClaimDraft;

    fn paid_claim() -> Claim {
        let draft = ClaimDraft {
            patient_id: PatientId::new_v7(),
            clinic_id: None,
            payer_name: "Acme Health".to_string(),
            payer_id: None,
            member_id: "MBR-1001".to_string(),
            plan_id: None,
            date_of_service_from: Some(chrono::NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()),
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

        let t1 = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        claim.transition_to(ClaimStatus::Accepted, "payer-feed", None, t1).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 3, 9, 15, 0, 0).unwrap();
        claim.transition_to(ClaimStatus::Paid, "payer-feed", None, t2).unwrap();

        claim
    }

    #[test]
    fn test_structural_milestones_in_ascending_order() {
        let claim = paid_claim();
        let events = timeline(&claim, &[]);

        let milestones: Vec<Milestone> = events
            .iter()
            .filter_map(|e| match e {
                TimelineEvent::Milestone { milestone, .. } => Some(*milestone),
                _ => None,
            })
            .collect();

        assert_eq!(
            milestones,
            vec![
                Milestone::Created,
                Milestone::Submitted,
                Milestone::ResponseReceived,
                Milestone::Paid
            ]
        );

        let timestamps: Vec<_> = events.iter().map(|e| e.timestamp()).collect();
        let mut sorted = timestamps.clone();
        sorted.sort();
        assert_eq!(timestamps, sorted);
    }

    #[test]
    fn test_three_stamped_dates_yield_exactly_three_events() {
        let mut claim = paid_claim();
        claim.response_date = None;
        claim.submission_date = Some(Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap());

        let events = timeline(&claim, &[]);
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| w[0].timestamp() < w[1].timestamp()));
    }

    #[test]
    fn test_audit_entries_interleave_by_timestamp() {
        let claim = paid_claim();
        let note = AuditEntry::lifecycle(
            claim.id,
            AuditAction::Viewed,
            "auditor",
            Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap(),
        );

        let events = timeline(&claim, &[note]);

        // Viewed lands between the response (Mar 4) and the payment (Mar 9)
        let position = events
            .iter()
            .position(|e| matches!(e, TimelineEvent::Audit { .. }))
            .unwrap();
        assert_eq!(position, 3);
    }

    #[test]
    fn test_group_by_date_respects_display_timezone() {
        let claim = paid_claim();
        let events = timeline(&claim, &[]);

        let utc_days = group_by_date(&events, Timezone::default());
        assert_eq!(utc_days.len(), 3);
        assert_eq!(
            utc_days[0].date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        // Created and Submitted share the first day
        assert_eq!(utc_days[0].events.len(), 2);
    }

    #[test]
    fn test_timeline_does_not_mutate_inputs() {
        let claim = paid_claim();
        let log = vec![AuditEntry::lifecycle(
            claim.id,
            AuditAction::Viewed,
            "auditor",
            Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap(),
        )];

        let before = serde_json::to_string(&log).unwrap();
        let _ = timeline(&claim, &log);
        let after = serde_json::to_string(&log).unwrap();
        assert_eq!(before, after);
    }
}
