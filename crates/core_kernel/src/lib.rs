//! Core Kernel - Foundational types for the claims engine
//!
//! This crate provides the fundamental building blocks used by the claims
//! domain and the API layer:
//! - Money types with precise decimal arithmetic
//! - Temporal helpers for aging and calendar-date grouping
//! - Strongly-typed identifiers

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Timezone, whole_days_between};
pub use identifiers::{
    ClaimId, DraftId, PatientId, ClinicId, PayerId, PlanId,
    BnplPlanId, AttachmentId, AuditEntryId, UserId,
};
pub use error::CoreError;
