//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::{ClaimId, DraftId};
use domain_claims::service::TransitionCommand;

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Actor identity forwarded by the gateway; session handling is external
fn actor(headers: &HeaderMap) -> String {
    headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("system")
        .to_string()
}

/// Validates a draft and creates the claim
pub async fn create_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let draft = request.draft.into_draft()?;
    let draft_id = request.draft_id.map(DraftId::from);

    let claim = state
        .service
        .submit_draft(draft, draft_id, &actor(&headers))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ClaimResponse::from_claim(&claim, Utc::now())),
    ))
}

/// Lists claims
pub async fn list_claims(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let now = Utc::now();
    let claims = state.service.claims().await?;
    Ok(Json(
        claims
            .iter()
            .map(|c| ClaimResponse::from_claim(c, now))
            .collect(),
    ))
}

/// Gets a claim by ID, recording the compliance view
pub async fn get_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id = ClaimId::from(id);
    state.service.record_view(id, &actor(&headers)).await?;
    let claim = state.service.claim(id).await?;
    Ok(Json(ClaimResponse::from_claim(&claim, Utc::now())))
}

/// Applies a lifecycle transition
pub async fn transition(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id = ClaimId::from(id);
    let to = parse_status(&request.to)?;

    // Amounts arrive as bare decimals in the claim's own currency
    let currency = state.service.claim(id).await?.total_amount.currency();
    let to_money = |d: rust_decimal::Decimal| core_kernel::Money::new(d, currency);

    let command = TransitionCommand {
        to,
        reason: request.reason,
        expected_version: request.expected_version,
        allowed_amount: request.allowed_amount.map(to_money),
        patient_responsibility: request.patient_responsibility.map(to_money),
        paid_amount: request.paid_amount.map(to_money),
    };

    let claim = state.service.transition(id, command, &actor(&headers)).await?;
    Ok(Json(ClaimResponse::from_claim(&claim, Utc::now())))
}

/// The claim's current checklist
pub async fn get_tasks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.service.tasks(ClaimId::from(id)).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Marks a checklist task complete
pub async fn complete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, task_id)): Path<(Uuid, String)>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .service
        .complete_task(ClaimId::from(id), &task_id, &actor(&headers))
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

/// The claim's timeline, grouped by calendar date
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimelineDayResponse>>, ApiError> {
    let days = state
        .service
        .timeline(ClaimId::from(id), state.display_tz)
        .await?;

    Ok(Json(
        days.into_iter()
            .map(|day| TimelineDayResponse {
                date: day.date,
                events: day.events.iter().map(TimelineEventResponse::from).collect(),
            })
            .collect(),
    ))
}

/// Reconciles a payout against the claim
pub async fn reconcile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<ReconcileRequest>,
) -> Result<Json<PayoutResponse>, ApiError> {
    let id = ClaimId::from(id);
    let currency = state.service.claim(id).await?.total_amount.currency();
    let payout = request.payout.into_payout(currency)?;

    let result = state.service.reconcile(id, payout, &actor(&headers)).await?;
    Ok(Json(PayoutResponse::from(result)))
}

/// Re-runs the money splitter with coverage overrides
pub async fn get_totals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TotalsQuery>,
) -> Result<Json<TotalsResponse>, ApiError> {
    let id = ClaimId::from(id);

    let coverage = if query.copay.is_some()
        || query.coinsurance_percent.is_some()
        || query.deductible_remaining.is_some()
    {
        let currency = state.service.claim(id).await?.total_amount.currency();
        Some(coverage_terms(
            currency,
            query.copay,
            query.coinsurance_percent,
            query.deductible_remaining,
        ))
    } else {
        None
    };

    let totals = state.service.totals(id, coverage).await?;
    Ok(Json(TotalsResponse::from(totals)))
}

/// Autosaves an open draft; newer saves supersede older ones
pub async fn autosave_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<AutosaveResponse>, ApiError> {
    let draft_id = DraftId::from(id);
    let draft = request.into_draft()?;

    let sequence = state.service.autosave_draft(draft_id, draft).await?;
    Ok(Json(AutosaveResponse {
        draft_id: id,
        sequence,
    }))
}
