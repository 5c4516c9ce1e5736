//! Claims application service
//!
//! Orchestrates the pure engine functions over the domain ports. Every
//! method is request-scoped: a failed operation leaves the store and the
//! audit log untouched.

use chrono::Utc;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{ClaimId, DraftId, Money, Timezone};

use crate::audit::{timeline, group_by_date, AuditAction, AuditEntry, TimelineDay};
use crate::claim::{Claim, ClaimStatus};
use crate::draft::{AutosaveGuard, ClaimDraft};
use crate::error::ClaimError;
use crate::ports::{AuditLog, ClaimStore, DraftStore, NotificationIntent, Notifier, TaskCompletionStore};
use crate::reconcile::{mark_reconciled, reconcile, PayoutInfo};
use crate::tasks::{merge_completions, tasks_for, Task, TaskCompletion};
use crate::totals::{derive_totals, ClaimTotals, CoverageTerms};
use crate::validation::validate_for_submit;

/// A requested lifecycle transition
///
/// `expected_version` is the claim version the caller last read; when
/// present, a mismatch with the stored claim is reported as `StaleWrite`
/// before anything is applied. The optional amounts carry the payer's
/// adjudication and remittance figures alongside the status change.
#[derive(Debug, Clone)]
pub struct TransitionCommand {
    pub to: ClaimStatus,
    pub reason: Option<String>,
    pub expected_version: Option<u64>,
    pub allowed_amount: Option<Money>,
    pub patient_responsibility: Option<Money>,
    pub paid_amount: Option<Money>,
}

impl TransitionCommand {
    /// A bare status change with no accompanying amounts
    pub fn to_status(to: ClaimStatus) -> Self {
        Self {
            to,
            reason: None,
            expected_version: None,
            allowed_amount: None,
            patient_responsibility: None,
            paid_amount: None,
        }
    }
}

/// Application service over the claims ports
pub struct ClaimsService {
    claims: Arc<dyn ClaimStore>,
    drafts: Arc<dyn DraftStore>,
    completions: Arc<dyn TaskCompletionStore>,
    audit: Arc<dyn AuditLog>,
    notifier: Arc<dyn Notifier>,
    autosave: AutosaveGuard,
}

impl ClaimsService {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        drafts: Arc<dyn DraftStore>,
        completions: Arc<dyn TaskCompletionStore>,
        audit: Arc<dyn AuditLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            claims,
            drafts,
            completions,
            audit,
            notifier,
            autosave: AutosaveGuard::new(),
        }
    }

    /// Validates a draft and creates the claim
    ///
    /// A draft that fails validation produces zero side effects: no store
    /// write and no audit entries. `draft_id` is removed from the draft
    /// store once the claim exists.
    pub async fn submit_draft(
        &self,
        draft: ClaimDraft,
        draft_id: Option<DraftId>,
        actor: &str,
    ) -> Result<Claim, ClaimError> {
        let issues = validate_for_submit(&draft);
        if !issues.is_empty() {
            return Err(ClaimError::ValidationFailed(issues));
        }

        let (claim, entries) = Claim::from_draft(draft, actor, Utc::now());
        self.claims.insert(claim.clone()).await?;
        for entry in entries {
            self.audit.append(entry).await?;
        }

        if let Some(id) = draft_id {
            match self.drafts.remove(id).await {
                Ok(()) | Err(ClaimError::DraftNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::info!(claim_id = %claim.id, claim_number = %claim.claim_number, "claim created from draft");
        Ok(claim)
    }

    /// Autosaves an open draft, newer save wins
    ///
    /// Returns the autosave sequence number on success. An autosave that
    /// was superseded by a newer one for the same draft is dropped and
    /// reported as `Superseded`.
    pub async fn autosave_draft(&self, id: DraftId, draft: ClaimDraft) -> Result<u64, ClaimError> {
        let seq = self.autosave.begin(id);
        self.drafts.upsert(id, draft).await?;
        // A newer save that began mid-flight supersedes this one; its
        // own write carries the newer payload.
        self.autosave.check_current(id, seq)?;
        Ok(seq)
    }

    pub async fn claim(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.claims.get(id).await
    }

    pub async fn claims(&self) -> Result<Vec<Claim>, ClaimError> {
        self.claims.list().await
    }

    /// Records a compliance view of the claim (PHI access logging)
    pub async fn record_view(&self, id: ClaimId, actor: &str) -> Result<(), ClaimError> {
        let claim = self.claims.get(id).await?;
        self.audit
            .append(AuditEntry::lifecycle(claim.id, AuditAction::Viewed, actor, Utc::now()))
            .await
    }

    /// Applies a lifecycle transition with optimistic concurrency
    ///
    /// The transition is applied to a fresh read; a caller whose
    /// `expected_version` no longer matches gets `StaleWrite` and must
    /// re-fetch and retry.
    pub async fn transition(
        &self,
        id: ClaimId,
        command: TransitionCommand,
        actor: &str,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.claims.get(id).await?;
        let read_version = claim.version;

        if let Some(expected) = command.expected_version {
            if expected != read_version {
                return Err(ClaimError::StaleWrite {
                    claim_id: id,
                    expected,
                    actual: read_version,
                });
            }
        }

        let now = Utc::now();
        let from = claim.status;
        let mut entries = Vec::new();

        entries.extend(claim.record_adjudication(
            command.allowed_amount,
            command.patient_responsibility,
            actor,
            now,
        )?);
        if let Some(paid) = command.paid_amount {
            entries.push(claim.record_payment(paid, actor, now)?);
        }
        entries.push(claim.transition_to(command.to, actor, command.reason, now)?);

        let claim = self.claims.update(claim, read_version).await?;
        for entry in entries {
            self.audit.append(entry).await?;
        }

        self.notifier
            .notify(NotificationIntent::StatusChanged {
                claim_id: claim.id,
                from,
                to: claim.status,
            })
            .await;

        if let Some(assignee) = claim.assignee_id {
            for task in tasks_for(&claim) {
                self.notifier
                    .notify(NotificationIntent::TaskAssigned {
                        claim_id: claim.id,
                        task_id: task.id,
                        assignee,
                    })
                    .await;
            }
        }

        Ok(claim)
    }

    /// The claim's current checklist with completion state merged in
    pub async fn tasks(&self, id: ClaimId) -> Result<Vec<Task>, ClaimError> {
        let claim = self.claims.get(id).await?;
        let mut tasks = tasks_for(&claim);
        let completions = self.completions.completions_for(id).await?;
        merge_completions(&mut tasks, &completions);
        Ok(tasks)
    }

    /// Marks a checklist task complete
    pub async fn complete_task(
        &self,
        id: ClaimId,
        task_id: &str,
        actor: &str,
    ) -> Result<Task, ClaimError> {
        let claim = self.claims.get(id).await?;
        let mut tasks = tasks_for(&claim);

        if !tasks.iter().any(|t| t.id == task_id) {
            return Err(ClaimError::UnknownTask {
                claim_id: id,
                task_id: task_id.to_string(),
            });
        }

        let now = Utc::now();
        let completion = TaskCompletion {
            task_id: task_id.to_string(),
            completed_by: actor.to_string(),
            completed_at: now,
        };
        self.completions.record(id, completion.clone()).await?;
        self.audit
            .append(
                AuditEntry::lifecycle(id, AuditAction::Updated, actor, now).with_field(
                    format!("tasks.{}", task_id),
                    "open",
                    "completed",
                ),
            )
            .await?;

        let mut merged = std::collections::HashMap::new();
        merged.insert(task_id.to_string(), completion);
        merge_completions(&mut tasks, &merged);
        let task = tasks.into_iter().find(|t| t.id == task_id).expect("task exists");
        Ok(task)
    }

    /// The claim's full timeline, grouped by calendar date for display
    pub async fn timeline(&self, id: ClaimId, tz: Timezone) -> Result<Vec<TimelineDay>, ClaimError> {
        let claim = self.claims.get(id).await?;
        let log = self.audit.entries_for(id).await?;
        let events = timeline(&claim, &log);
        Ok(group_by_date(&events, tz))
    }

    /// Reconciles a payout against a paid claim, idempotently
    pub async fn reconcile(
        &self,
        id: ClaimId,
        payout: PayoutInfo,
        actor: &str,
    ) -> Result<PayoutInfo, ClaimError> {
        let mut claim = self.claims.get(id).await?;
        let read_version = claim.version;

        let tolerance = Money::new(dec!(0.01), claim.paid_amount.currency());
        let result = reconcile(&claim, &payout, tolerance)?;

        let entry = mark_reconciled(&mut claim, result.clone(), actor, Utc::now())?;
        let claim = self.claims.update(claim, read_version).await?;
        if let Some(entry) = entry {
            self.audit.append(entry).await?;
        }

        Ok(claim.payout.unwrap_or(result))
    }

    /// Re-runs the money splitter over the claim's lines
    ///
    /// Coverage overrides let the dashboard preview a split under
    /// different plan parameters without touching the claim.
    pub async fn totals(
        &self,
        id: ClaimId,
        coverage: Option<CoverageTerms>,
    ) -> Result<ClaimTotals, ClaimError> {
        let claim = self.claims.get(id).await?;
        let coverage = coverage
            .unwrap_or_else(|| CoverageTerms::none(claim.total_amount.currency()));
        Ok(derive_totals(&claim.lines, &coverage)?)
    }
}
