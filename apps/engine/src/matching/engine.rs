use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::guardrails::GuardrailsConfig;
use crate::matching::signals::{compute_signals, MatchSignals};
use crate::models::{Candidate, Job};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MatchInput<'a> {
    pub job: &'a Job,
    pub candidates: &'a [Candidate],
    pub config: &'a GuardrailsConfig,
}

/// Score of one candidate against one job. Created once per run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    /// 0 – 100
    pub score: u32,
    pub signals: MatchSignals,
}

impl MatchResult {
    /// Score as a 0–1 fraction. `score` is always a percentage, so this
    /// never goes through the fraction-or-percentage guess.
    pub fn fraction(&self) -> f64 {
        f64::from(self.score.min(100)) / 100.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores a single candidate, applying must-have gating but not the
/// `minMatchScore` threshold.
///
/// With `requireMustHaves` set, any missing must-have forces the score to 0.
pub fn score_candidate(job: &Job, candidate: &Candidate, config: &GuardrailsConfig) -> MatchResult {
    let signals = compute_signals(job, candidate);
    let weights = config.effective_weights();

    let blended = weights.must_have_skills * signals.must_have_skills_coverage
        + weights.nice_to_have_skills * signals.nice_to_have_skills_coverage
        + weights.experience * signals.experience_alignment
        + weights.location * signals.location_alignment;

    let gated = config.safety.require_must_haves && signals.must_have_skills_coverage < 1.0;
    let score = if gated {
        0
    } else {
        (blended * 100.0).round().clamp(0.0, 100.0) as u32
    };

    MatchResult {
        candidate_id: candidate.id.clone(),
        score,
        signals,
    }
}

/// Scores every candidate, drops those below `minMatchScore`, and returns the
/// rest sorted by score descending. Ties keep input order.
pub fn run_match(input: &MatchInput<'_>) -> Vec<MatchResult> {
    let threshold = input.config.min_match_score();

    let mut results: Vec<MatchResult> = input
        .candidates
        .iter()
        .map(|candidate| score_candidate(input.job, candidate, input.config))
        .filter(|result| f64::from(result.score) >= threshold)
        .collect();

    // Vec::sort_by is stable.
    results.sort_by(|a, b| b.score.cmp(&a.score));

    debug!(
        "Match run for job {}: {}/{} candidates at or above {threshold}",
        input.job.id,
        results.len(),
        input.candidates.len()
    );

    results
}
