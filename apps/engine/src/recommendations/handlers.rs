//! Axum route handlers for guardrail recommendations.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::recommendations::{Recommendation, RecommendationStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

/// GET /api/v1/tenants/:tenant_id/guardrails/recommendations
pub async fn handle_list_recommendations(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let recommendations = state.recommendations.generate(&tenant_id).await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// PATCH /api/v1/tenants/:tenant_id/guardrails/recommendations/:id
pub async fn handle_update_recommendation(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, String)>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let status: RecommendationStatus = request.status.parse().map_err(AppError::Validation)?;
    let recommendations = state
        .recommendations
        .update_status(&tenant_id, &id, status)
        .await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}
