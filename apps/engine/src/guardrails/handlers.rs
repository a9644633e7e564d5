//! Axum route handlers for tenant guardrails.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::guardrails::{GuardrailsConfig, ScoringWeights};
use crate::modes::SystemMode;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailsResponse {
    pub tenant_id: String,
    pub system_mode: SystemMode,
    pub guardrails: GuardrailsConfig,
    /// Weights after strategy and normalization, as the match engine uses them.
    pub effective_weights: ScoringWeights,
}

/// GET /api/v1/tenants/:tenant_id/guardrails
pub async fn handle_get_guardrails(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<GuardrailsResponse>, AppError> {
    let guardrails = state.guardrails.resolve(&tenant_id).await?;
    let system_mode = state.modes.mode(&tenant_id).await?;
    Ok(Json(GuardrailsResponse {
        effective_weights: guardrails.effective_weights(),
        tenant_id,
        system_mode,
        guardrails,
    }))
}
