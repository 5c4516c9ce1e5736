//! Claims domain ports
//!
//! The engine is a stateless computation library; everything durable or
//! outward-facing sits behind one of these traits so the engine can run
//! against a database-backed adapter in production and an in-memory
//! adapter in tests, unchanged.
//!
//! # Optimistic concurrency
//!
//! `ClaimStore::update` takes the version the caller read. An adapter
//! must reject the write with [`ClaimError::StaleWrite`] when the stored
//! version no longer matches, so a conflicting concurrent transition is
//! reported instead of silently overwritten.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{ClaimId, DraftId, UserId};

use crate::audit::AuditEntry;
use crate::claim::{Claim, ClaimStatus};
use crate::draft::ClaimDraft;
use crate::error::ClaimError;
use crate::tasks::TaskCompletion;

/// Durable storage for claims
#[async_trait]
pub trait ClaimStore: Send + Sync {
    async fn get(&self, id: ClaimId) -> Result<Claim, ClaimError>;

    async fn list(&self) -> Result<Vec<Claim>, ClaimError>;

    /// Inserts a newly created claim
    async fn insert(&self, claim: Claim) -> Result<(), ClaimError>;

    /// Writes an updated claim, guarded by the version the caller read
    async fn update(&self, claim: Claim, read_version: u64) -> Result<Claim, ClaimError>;
}

/// Durable storage for open drafts (wizard autosave)
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get(&self, id: DraftId) -> Result<ClaimDraft, ClaimError>;

    async fn upsert(&self, id: DraftId, draft: ClaimDraft) -> Result<(), ClaimError>;

    /// Removes a draft once it has been promoted to a claim
    async fn remove(&self, id: DraftId) -> Result<(), ClaimError>;
}

/// Persisted task completion state, keyed by stable task id
#[async_trait]
pub trait TaskCompletionStore: Send + Sync {
    async fn completions_for(
        &self,
        claim_id: ClaimId,
    ) -> Result<HashMap<String, TaskCompletion>, ClaimError>;

    async fn record(&self, claim_id: ClaimId, completion: TaskCompletion)
        -> Result<(), ClaimError>;
}

/// Append-only audit log
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), ClaimError>;

    async fn entries_for(&self, claim_id: ClaimId) -> Result<Vec<AuditEntry>, ClaimError>;
}

/// Notification intent emitted by the engine
///
/// Delivery (email/SMS/push) belongs to a collaborator; the engine only
/// states what should be communicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationIntent {
    TaskAssigned {
        claim_id: ClaimId,
        task_id: String,
        assignee: UserId,
    },
    StatusChanged {
        claim_id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
    },
}

/// Outbound notification port
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, intent: NotificationIntent);
}
