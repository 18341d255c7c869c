use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::db::Database;
use crate::errors::{is_connectivity_error, AppError};
use crate::models::{Lead, LeadCreate};
use crate::services::LeadService;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lead orchestration service.
    pub service: LeadService,
    /// Database handle, used by the store reachability probe.
    pub db: Database,
}

/// Lead routes, kept separate from the health endpoints so the binary can
/// wrap them in rate limiting and body-size middleware.
pub fn lead_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/leads/", post(create_lead).get(list_leads))
        .route("/leads/:id", get(get_lead))
}

/// POST /leads/
///
/// Validates the payload, creates the lead (with best-effort birth date
/// enrichment) and returns the stored document.
#[utoipa::path(
    post,
    path = "/leads/",
    tag = "leads",
    request_body = LeadCreate,
    responses(
        (status = 201, description = "Lead created", body = Lead),
        (status = 422, description = "Payload failed schema validation"),
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(lead_in): Json<LeadCreate>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    lead_in.validate()?;

    let lead = state.service.create_new_lead(lead_in).await?;
    tracing::info!("Created lead {}", lead.id);

    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /leads/
///
/// Lists stored leads, capped at 1000 records.
#[utoipa::path(
    get,
    path = "/leads/",
    tag = "leads",
    responses(
        (status = 200, description = "All stored leads, capped at 1000", body = [Lead]),
    )
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Lead>>, AppError> {
    let leads = state.service.get_all_leads().await?;
    Ok(Json(leads))
}

/// GET /leads/{id}
///
/// Fetches one lead. A malformed identifier and a well-formed identifier with
/// no matching record produce the same 404.
#[utoipa::path(
    get,
    path = "/leads/{id}",
    tag = "leads",
    params(("id" = String, Path, description = "Store-generated lead identifier")),
    responses(
        (status = 200, description = "Lead found", body = Lead),
        (status = 404, description = "Lead absent or identifier malformed"),
    )
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<Lead>, AppError> {
    let lead = state
        .service
        .get_lead_details(&lead_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead não encontrado".to_string()))?;

    Ok(Json(lead))
}

/// GET /
///
/// Liveness probe; does not touch any dependency.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "rust-leads-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /pinga
///
/// Round-trips a ping against the document store.
#[utoipa::path(
    get,
    path = "/pinga",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 503, description = "Store unreachable"),
        (status = 500, description = "Unexpected driver error"),
    )
)]
pub async fn ping(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, AppError> {
    match state.db.ping().await {
        Ok(()) => {
            tracing::info!("Database ping successful");
            Ok(Json(json!({
                "status": "ok",
                "message": "Ping no MongoDB ok"
            })))
        }
        Err(e) if is_connectivity_error(&e) => {
            tracing::warn!("Database ping failed: {}", e);
            Err(AppError::ServiceUnavailable("Database unavailable".to_string()))
        }
        Err(e) => {
            tracing::error!("Unexpected error during ping: {}", e);
            Err(AppError::InternalError(e.to_string()))
        }
    }
}
