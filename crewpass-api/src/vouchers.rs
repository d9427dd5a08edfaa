use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;
use crewpass_core::voucher::AssignmentRequest;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(rename = "flightNumber", default)]
    pub flight_number: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub seats: Vec<String>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/check", post(check_voucher))
        .route("/api/generate", post(generate_voucher))
        .route("/api/health", get(health))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/check
/// Report whether vouchers already exist for a flight/date
async fn check_voucher(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::BadRequest("Invalid JSON format".to_string()))?;

    let exists = state
        .engine
        .check_exists(&req.flight_number, &req.date)
        .await?;

    Ok(Json(CheckResponse { exists }))
}

/// POST /api/generate
/// Issue a voucher, or regenerate selected seats of an existing one
async fn generate_voucher(
    State(state): State<AppState>,
    payload: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::BadRequest("Invalid JSON format".to_string()))?;

    let seats = state.engine.generate(&req).await?;

    Ok(Json(GenerateResponse {
        success: true,
        seats: seats.to_vec(),
    }))
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
