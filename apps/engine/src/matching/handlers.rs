//! Axum route handlers for the Matches API.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::confidence::{
    classify_matches, classify_signal_bag, ConfidenceResult, ConfidenceVariant, SignalBagInput,
    SignalBagOptions,
};
use crate::errors::AppError;
use crate::guardrails::{GuardrailsConfig, ShortlistStrategy};
use crate::matching::{run_match, skill_overlap, MatchInput, MatchResult};
use crate::models::{Candidate, Job};
use crate::modes::SystemMode;
use crate::shortlist::{annotate, build_shortlist, ShortlistInput};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job: Job,
    pub candidates: Vec<Candidate>,
    /// Recruiter / ATS notes keyed by candidate id.
    #[serde(default)]
    pub notes: HashMap<String, Vec<String>>,
    /// Overrides the tenant's shortlist strategy for this run.
    #[serde(default)]
    pub strategy: Option<ShortlistStrategy>,
    #[serde(default)]
    pub confidence_variant: ConfidenceVariant,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub job_id: String,
    pub matches: Vec<MatchResult>,
    pub confidence: Vec<ConfidenceResult>,
    pub shortlist: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// Signal-bag classification over the match signals. Tenant bands apply when
/// the tenant set them; otherwise the variant's own defaults.
fn classify_as_signal_bag(
    job: &Job,
    candidates: &[Candidate],
    matches: &[MatchResult],
    config: &GuardrailsConfig,
    mode: &SystemMode,
) -> Vec<ConfidenceResult> {
    let options = SignalBagOptions {
        bands: config
            .safety
            .confidence_bands
            .unwrap_or_else(|| ConfidenceVariant::SignalBag.default_bands()),
        narrate: !mode.is_fire_drill(),
    };

    matches
        .iter()
        .map(|m| {
            let missing_must_have = candidates
                .iter()
                .find(|c| c.id == m.candidate_id)
                .map(|c| skill_overlap(job, c).missing_must_have)
                .unwrap_or_default();
            let signals: BTreeMap<String, f64> = [
                ("mustHaveSkillsCoverage", m.signals.must_have_skills_coverage),
                ("niceToHaveSkillsCoverage", m.signals.nice_to_have_skills_coverage),
                ("experienceAlignment", m.signals.experience_alignment),
                ("locationAlignment", m.signals.location_alignment),
            ]
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
            classify_signal_bag(
                &SignalBagInput {
                    candidate_id: m.candidate_id.clone(),
                    score: Some(m.fraction()),
                    signals,
                    missing_must_have,
                },
                &options,
            )
        })
        .collect()
}

/// POST /api/v1/tenants/:tenant_id/matches
///
/// Full pipeline: guardrails → match → confidence → shortlist.
/// Candidates below the match threshold are absent from every list.
pub async fn handle_run_match(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    if request.job.id.trim().is_empty() {
        return Err(AppError::Validation("job.id cannot be empty".to_string()));
    }

    let config = state.guardrails.resolve(&tenant_id).await?;
    let mode = state.modes.mode(&tenant_id).await?;

    let matches = run_match(&MatchInput {
        job: &request.job,
        candidates: &request.candidates,
        config: &config,
    });

    let confidence = match request.confidence_variant {
        ConfidenceVariant::JobRisk => classify_matches(
            &request.job,
            &request.candidates,
            &matches,
            &request.notes,
            &config,
            &mode,
        ),
        ConfidenceVariant::SignalBag => {
            classify_as_signal_bag(&request.job, &request.candidates, &matches, &config, &mode)
        }
    };

    let annotated = annotate(&matches, &confidence);
    let shortlist = build_shortlist(&ShortlistInput {
        matches: &annotated,
        config: &config,
        strategy: request.strategy,
    });

    info!(
        "Tenant {tenant_id} job {}: {} candidates, {} matched, {} shortlisted",
        request.job.id,
        request.candidates.len(),
        matches.len(),
        shortlist.len()
    );

    Ok(Json(MatchResponse {
        job_id: request.job.id,
        matches,
        confidence,
        shortlist,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::ConfidenceBand;
    use crate::matching::MatchSignals;

    fn result(id: &str, score: u32) -> MatchResult {
        MatchResult {
            candidate_id: id.to_string(),
            score,
            signals: MatchSignals {
                must_have_skills_coverage: 1.0,
                nice_to_have_skills_coverage: 1.0,
                experience_alignment: 1.0,
                location_alignment: 1.0,
            },
        }
    }

    #[test]
    fn test_signal_bag_reads_match_score_as_percent() {
        let job = Job::default();
        let matches = vec![result("one", 1), result("two", 2), result("top", 100)];
        let classified = classify_as_signal_bag(
            &job,
            &[],
            &matches,
            &GuardrailsConfig::default(),
            &SystemMode::Production,
        );

        assert_eq!(classified[0].band, ConfidenceBand::Low);
        assert_eq!(classified[0].score, 0.01);
        assert_eq!(classified[1].band, ConfidenceBand::Low);
        assert_eq!(classified[2].band, ConfidenceBand::High);
    }
}
