//! Claims Lifecycle Domain
//!
//! This crate implements the claims lifecycle for the BNPL administration
//! platform: submission validation, status transitions, derived financial
//! splits, aging, follow-up tasks, payout reconciliation, and the audit
//! timeline.
//!
//! # Claim Lifecycle
//!
//! ```text
//! (draft) -> Submitted -> Pending -> Submitted
//!                      -> Accepted -> Paid
//!                      -> Denied/Rejected -> Submitted (resubmit)
//! ```
//!
//! Everything here is a synchronous computation over explicit inputs; the
//! only shared state is the claim record behind the [`ports::ClaimStore`]
//! port, written with optimistic concurrency.

pub mod claim;
pub mod draft;
pub mod validation;
pub mod totals;
pub mod aging;
pub mod tasks;
pub mod reconcile;
pub mod audit;
pub mod ports;
pub mod memory;
pub mod service;
pub mod error;

pub use claim::{Claim, ClaimStatus, ClaimLine, Attachment, AttachmentKind, Priority};
pub use draft::{ClaimDraft, AutosaveGuard};
pub use validation::{SubmissionIssue, validate_for_submit};
pub use totals::{ClaimTotals, CoverageTerms, derive_totals};
pub use aging::{AgingBucket, aging_days};
pub use tasks::{Task, TaskCompletion, tasks_for, merge_completions};
pub use reconcile::{PayoutInfo, PayoutStatus, reconcile};
pub use audit::{AuditAction, AuditEntry, TimelineEvent, TimelineDay, timeline, group_by_date};
pub use ports::{AuditLog, ClaimStore, DraftStore, Notifier, NotificationIntent, TaskCompletionStore};
pub use memory::{
    InMemoryAuditLog, InMemoryClaimStore, InMemoryCompletionStore, InMemoryDraftStore,
    RecordingNotifier,
};
pub use service::{ClaimsService, TransitionCommand};
pub use error::ClaimError;
