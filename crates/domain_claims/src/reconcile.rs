//! Payout reconciliation
//!
//! Links a paid claim to its remittance and flags whether the ledger
//! matches. A claim that has not reached `Paid` has no reconciliation
//! state at all, which is distinct from "unreconciled".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::audit::{AuditAction, AuditEntry};
use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;

/// Remittance processing status reported by the payout rail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Settled,
    Failed,
}

/// A payout record linked to a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutInfo {
    /// Remittance advice identifier from the payout rail
    pub remittance_id: String,
    /// Masked bank identifier for display, e.g. `****4821`
    pub bank_ref_masked: String,
    /// Remittance amount
    pub amount: Money,
    pub initiated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub status: PayoutStatus,
    pub reconciled: bool,
}

/// Computes the reconciliation state for a paid claim
///
/// The payout is reconciled when it has settled and its amount matches
/// the claim's paid amount within `tolerance`. Attempting to reconcile a
/// claim that is not `Paid` is `NotReconcilable`.
pub fn reconcile(
    claim: &Claim,
    payout: &PayoutInfo,
    tolerance: Money,
) -> Result<PayoutInfo, ClaimError> {
    if claim.status != ClaimStatus::Paid {
        return Err(ClaimError::NotReconcilable {
            status: format!("{:?}", claim.status),
        });
    }

    let amounts_match = payout
        .amount
        .checked_sub(&claim.paid_amount)?
        .abs()
        .amount()
        <= tolerance.amount();

    let mut result = payout.clone();
    result.reconciled = payout.status == PayoutStatus::Settled && amounts_match;
    Ok(result)
}

/// Attaches a reconciled payout to the claim, idempotently
///
/// The first call that flips the claim's payout to reconciled yields the
/// audit entry to append; repeat calls with the same settled payout are
/// no-ops and yield nothing, so exactly one entry is ever written.
pub fn mark_reconciled(
    claim: &mut Claim,
    payout: PayoutInfo,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Option<AuditEntry>, ClaimError> {
    let already_reconciled = claim
        .payout
        .as_ref()
        .map(|p| p.reconciled && p.remittance_id == payout.remittance_id)
        .unwrap_or(false);

    let newly_reconciled = payout.reconciled && !already_reconciled;

    claim.payout = Some(payout);
    claim.updated_at = now;
    claim.version += 1;

    if newly_reconciled {
        tracing::info!(claim_id = %claim.id, "claim payout reconciled");
        let entry = AuditEntry::lifecycle(claim.id, AuditAction::Updated, actor, now)
            .with_field("payout.reconciled", "false", "true");
        Ok(Some(entry))
    } else {
        Ok(None)
    }
}
