//! Axum route handlers for the Explanations API.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::confidence::job_risk::classify_match;
use crate::confidence::ConfidenceResult;
use crate::errors::AppError;
use crate::explain::{
    build_explanation, build_justification, maybe_polish_explanation, Explanation,
    ExplanationInput, Justification, JustificationInput, PolishOptions,
};
use crate::matching::{score_candidate, skill_overlap, MatchResult};
use crate::models::{Candidate, Job};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExplanationRequest {
    pub job: Job,
    pub candidate: Candidate,
    /// Display overrides when the records themselves carry no name/title.
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExplanationResponse {
    #[serde(rename = "match")]
    pub match_result: MatchResult,
    pub confidence: ConfidenceResult,
    pub explanation: Explanation,
    pub justification: Justification,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tenants/:tenant_id/explanations
///
/// Scores a single candidate (threshold not applied), classifies it, and
/// returns the explanation plus a recruiter-facing justification.
pub async fn handle_explain(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<ExplanationRequest>,
) -> Result<Json<ExplanationResponse>, AppError> {
    if request.candidate.id.trim().is_empty() {
        return Err(AppError::Validation("candidate.id cannot be empty".to_string()));
    }

    let ExplanationRequest {
        mut job,
        mut candidate,
        candidate_name,
        job_title,
        notes,
    } = request;
    if candidate.name.is_none() {
        candidate.name = candidate_name;
    }
    if job.title.is_none() {
        job.title = job_title;
    }

    let config = state.guardrails.resolve(&tenant_id).await?;
    let mode = state.modes.mode(&tenant_id).await?;

    let match_result = score_candidate(&job, &candidate, &config);
    let missing = skill_overlap(&job, &candidate).missing_must_have;
    let confidence = classify_match(
        &match_result,
        &missing,
        &notes,
        &config,
        !mode.is_fire_drill(),
    );

    let explain = config.explain();
    let explanation = build_explanation(&ExplanationInput {
        job: &job,
        candidate: &candidate,
        match_result: &match_result,
        confidence: Some(&confidence),
        explain: explain.clone(),
        weights: Some(config.effective_weights()),
    });

    let mut options = PolishOptions::new(explain, mode)
        .with_timeout(Duration::from_millis(state.config.llm_polish_timeout_ms));
    if let Some(llm) = state.llm.as_deref() {
        options = options.with_llm(llm);
    }
    let explanation = maybe_polish_explanation(explanation, options).await;

    let justification = build_justification(&JustificationInput {
        candidate: &candidate,
        job: &job,
        match_result: &match_result,
        confidence: Some(&confidence),
        explanation: &explanation,
    });

    info!(
        "Explained candidate {} for job {} (tenant {tenant_id}, score {}, band {})",
        candidate.id, job.id, match_result.score, confidence.band
    );

    Ok(Json(ExplanationResponse {
        match_result,
        confidence,
        explanation,
        justification,
    }))
}
