//! REST endpoints for the results screen.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::{HandoffStore, PlanStore, handoff_keys};

/// Shared state for results routes.
#[derive(Clone)]
pub struct ResultsState {
    pub handoff: Arc<dyn HandoffStore>,
    pub plans: Arc<dyn PlanStore>,
}

/// What the last submission left for the results screen.
#[derive(Debug, Default, Serialize)]
pub struct TripResult {
    pub summary: Option<String>,
    pub error: Option<String>,
    pub plan_id: Option<String>,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "trail-planner"
    }))
}

async fn read_result(handoff: &dyn HandoffStore) -> Result<TripResult, DatabaseError> {
    Ok(TripResult {
        summary: handoff.get(handoff_keys::TRIP_SUMMARY).await?,
        error: handoff.get(handoff_keys::TRIP_ERROR).await?,
        plan_id: handoff.get(handoff_keys::LAST_PLAN_ID).await?,
    })
}

/// GET /api/trip/result
async fn get_result(State(state): State<ResultsState>) -> impl IntoResponse {
    match read_result(state.handoff.as_ref()).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read trip result");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to read trip result"})),
            )
                .into_response()
        }
    }
}

/// GET /api/trip/plans/{id}
///
/// Returns the saved plan, or 404 if there is none with that id.
async fn get_plan(State(state): State<ResultsState>, Path(id): Path<String>) -> impl IntoResponse {
    let Ok(id) = Uuid::parse_str(&id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid plan ID"})),
        )
            .into_response();
    };
    match state.plans.get_plan(id).await {
        Ok(Some(plan)) => Json(plan).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Plan not found"})),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(plan_id = %id, error = %e, "Failed to load plan");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to load plan"})),
            )
                .into_response()
        }
    }
}

/// Build the results REST routes.
pub fn results_routes(state: ResultsState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health))
        .route("/api/trip/result", get(get_result))
        .route("/api/trip/plans/{id}", get(get_plan))
        .layer(cors)
        .with_state(state)
}
