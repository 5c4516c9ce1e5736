//! Claims domain errors
//!
//! Every failure here is local to one claim or request; nothing is fatal to
//! the process. Callers receive one of these named conditions, never a
//! panic across the domain boundary.

use thiserror::Error;

use core_kernel::{ClaimId, DraftId, MoneyError};
use crate::validation::SubmissionIssue;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The draft failed submission validation; no state was changed
    #[error("Submission validation failed with {} issue(s)", .0.len())]
    ValidationFailed(Vec<SubmissionIssue>),

    /// The attempted transition is not in the lifecycle table
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Optimistic-concurrency conflict; caller must re-fetch and retry
    #[error("Stale write on claim {claim_id}: expected version {expected}, found {actual}")]
    StaleWrite {
        claim_id: ClaimId,
        expected: u64,
        actual: u64,
    },

    /// Reconciliation attempted on a claim that has not been paid
    #[error("Claim is not reconcilable in status {status}")]
    NotReconcilable { status: String },

    /// A newer autosave superseded this one for the same draft
    #[error("Autosave superseded for draft {0}")]
    Superseded(DraftId),

    #[error("Claim not found: {0}")]
    ClaimNotFound(ClaimId),

    #[error("Draft not found: {0}")]
    DraftNotFound(DraftId),

    #[error("Unknown task {task_id} for claim {claim_id}")]
    UnknownTask { claim_id: ClaimId, task_id: String },

    /// Money invariant violation, e.g. paid exceeding allowed
    #[error("Amount invariant violated: {0}")]
    AmountInvariant(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}
