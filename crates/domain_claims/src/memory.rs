//! In-memory port adapters
//!
//! Persistence technology is an external collaborator; these adapters
//! back the ports with process-local maps so the engine can run as a
//! standalone service and so tests need no infrastructure. The claim
//! store enforces the same optimistic-concurrency contract a database
//! adapter must.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use core_kernel::{ClaimId, DraftId};

use crate::audit::AuditEntry;
use crate::claim::Claim;
use crate::draft::ClaimDraft;
use crate::error::ClaimError;
use crate::ports::{AuditLog, ClaimStore, DraftStore, NotificationIntent, Notifier, TaskCompletionStore};
use crate::tasks::TaskCompletion;

/// Process-local claim store with version checking
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    claims: Mutex<HashMap<ClaimId, Claim>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn get(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        let claims = self.claims.lock().expect("claim store poisoned");
        claims.get(&id).cloned().ok_or(ClaimError::ClaimNotFound(id))
    }

    async fn list(&self) -> Result<Vec<Claim>, ClaimError> {
        let claims = self.claims.lock().expect("claim store poisoned");
        let mut all: Vec<Claim> = claims.values().cloned().collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn insert(&self, claim: Claim) -> Result<(), ClaimError> {
        let mut claims = self.claims.lock().expect("claim store poisoned");
        claims.insert(claim.id, claim);
        Ok(())
    }

    async fn update(&self, claim: Claim, read_version: u64) -> Result<Claim, ClaimError> {
        let mut claims = self.claims.lock().expect("claim store poisoned");
        let stored = claims
            .get(&claim.id)
            .ok_or(ClaimError::ClaimNotFound(claim.id))?;

        if stored.version != read_version {
            return Err(ClaimError::StaleWrite {
                claim_id: claim.id,
                expected: read_version,
                actual: stored.version,
            });
        }

        claims.insert(claim.id, claim.clone());
        Ok(claim)
    }
}

/// Process-local draft store
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: Mutex<HashMap<DraftId, ClaimDraft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn get(&self, id: DraftId) -> Result<ClaimDraft, ClaimError> {
        let drafts = self.drafts.lock().expect("draft store poisoned");
        drafts.get(&id).cloned().ok_or(ClaimError::DraftNotFound(id))
    }

    async fn upsert(&self, id: DraftId, draft: ClaimDraft) -> Result<(), ClaimError> {
        let mut drafts = self.drafts.lock().expect("draft store poisoned");
        drafts.insert(id, draft);
        Ok(())
    }

    async fn remove(&self, id: DraftId) -> Result<(), ClaimError> {
        let mut drafts = self.drafts.lock().expect("draft store poisoned");
        drafts
            .remove(&id)
            .map(|_| ())
            .ok_or(ClaimError::DraftNotFound(id))
    }
}

/// Process-local task completion store
#[derive(Debug, Default)]
pub struct InMemoryCompletionStore {
    completions: Mutex<HashMap<ClaimId, HashMap<String, TaskCompletion>>>,
}

impl InMemoryCompletionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskCompletionStore for InMemoryCompletionStore {
    async fn completions_for(
        &self,
        claim_id: ClaimId,
    ) -> Result<HashMap<String, TaskCompletion>, ClaimError> {
        let completions = self.completions.lock().expect("completion store poisoned");
        Ok(completions.get(&claim_id).cloned().unwrap_or_default())
    }

    async fn record(
        &self,
        claim_id: ClaimId,
        completion: TaskCompletion,
    ) -> Result<(), ClaimError> {
        let mut completions = self.completions.lock().expect("completion store poisoned");
        completions
            .entry(claim_id)
            .or_default()
            .insert(completion.task_id.clone(), completion);
        Ok(())
    }
}

/// Process-local append-only audit log
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), ClaimError> {
        let mut entries = self.entries.lock().expect("audit log poisoned");
        entries.push(entry);
        Ok(())
    }

    async fn entries_for(&self, claim_id: ClaimId) -> Result<Vec<AuditEntry>, ClaimError> {
        let entries = self.entries.lock().expect("audit log poisoned");
        Ok(entries
            .iter()
            .filter(|e| e.claim_id == claim_id)
            .cloned()
            .collect())
    }
}

/// Notifier that records intents and logs them
///
/// Delivery is external; recording the intents keeps them assertable in
/// tests and visible in the log stream.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    intents: Mutex<Vec<NotificationIntent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intents(&self) -> Vec<NotificationIntent> {
        self.intents.lock().expect("notifier poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, intent: NotificationIntent) {
        tracing::info!(?intent, "notification intent emitted");
        let mut intents = self.intents.lock().expect("notifier poisoned");
        intents.push(intent);
    }
}
