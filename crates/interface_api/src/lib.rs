//! HTTP API Layer
//!
//! This crate provides the REST API for the claims engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for claims, tasks, timeline, payouts
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses; domain conditions map
//!   to 422 (validation) and 409 (invalid transition / stale write)
//!
//! The engine sits behind its port traits; this crate wires the bundled
//! in-memory adapters so the service runs standalone. A deployment with
//! durable storage swaps the adapters without touching the handlers.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, config::ApiConfig};
//!
//! let app = create_router(AppState::new(ApiConfig::default()));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod dto;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use core_kernel::Timezone;
use domain_claims::memory::{
    InMemoryAuditLog, InMemoryClaimStore, InMemoryCompletionStore, InMemoryDraftStore,
    RecordingNotifier,
};
use domain_claims::service::ClaimsService;

use crate::config::ApiConfig;
use crate::handlers::{claims, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimsService>,
    pub config: ApiConfig,
    pub display_tz: Timezone,
}

impl AppState {
    /// Builds the state over the in-memory port adapters
    pub fn new(config: ApiConfig) -> Self {
        let service = ClaimsService::new(
            Arc::new(InMemoryClaimStore::new()),
            Arc::new(InMemoryDraftStore::new()),
            Arc::new(InMemoryCompletionStore::new()),
            Arc::new(InMemoryAuditLog::new()),
            Arc::new(RecordingNotifier::new()),
        );

        let display_tz = Timezone::parse(&config.display_timezone).unwrap_or_default();

        Self {
            service: Arc::new(service),
            config,
            display_tz,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Application state carrying the claims service
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no gateway forwarding required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Claims routes
    let claims_routes = Router::new()
        .route("/", post(claims::create_claim))
        .route("/", get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/transition", post(claims::transition))
        .route("/:id/tasks", get(claims::get_tasks))
        .route("/:id/tasks/:task_id/complete", post(claims::complete_task))
        .route("/:id/timeline", get(claims::get_timeline))
        .route("/:id/reconcile", post(claims::reconcile))
        .route("/:id/totals", get(claims::get_totals));

    // Draft routes (wizard autosave)
    let draft_routes = Router::new().route("/:id/autosave", put(claims::autosave_draft));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/drafts", draft_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
