//! Job-aware confidence: match signals + skill gaps + recruiter/ATS notes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::confidence::narration::{narrate, NamedSignal};
use crate::confidence::{
    get_confidence_band, normalize_score, ConfidenceBand, ConfidenceResult, RecruiterAction,
    RiskFlag,
};
use crate::guardrails::{GuardrailsConfig, GuardrailsError, GuardrailsResolver};
use crate::matching::{skill_overlap, MatchResult, MatchSignals};
use crate::models::{Candidate, Job};
use crate::modes::{ModeError, SystemMode, SystemModeReader};

/// A signal at or above this is "high" when checking for divergence.
const DIVERGENCE_HIGH: f64 = 0.8;
/// A signal at or below this is "low" when checking for divergence.
const DIVERGENCE_LOW: f64 = 0.4;

const STALE_SYNC_MARKERS: &[&str] = &[
    "stale",
    "out of sync",
    "sync failed",
    "sync delayed",
    "not synced",
    "sync lag",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidenceAgentInput {
    pub tenant_id: String,
    pub job: Job,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub matches: Vec<MatchResult>,
    /// Free-text behavioral / ATS notes keyed by candidate id.
    #[serde(default)]
    pub notes: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRun {
    pub job_id: String,
    pub results: Vec<ConfidenceResult>,
}

/// Loaders consulted by `run_confidence_agent`.
pub struct ConfidenceDeps<'a> {
    pub guardrails: &'a dyn GuardrailsResolver,
    pub modes: &'a dyn SystemModeReader,
}

#[derive(Debug, Error)]
pub enum ConfidenceError {
    #[error(transparent)]
    Guardrails(#[from] GuardrailsError),

    #[error(transparent)]
    Mode(#[from] ModeError),
}

fn named_signals(signals: &MatchSignals) -> Vec<NamedSignal> {
    let keys = [
        "must_have_skills_coverage",
        "nice_to_have_skills_coverage",
        "experience_alignment",
        "location_alignment",
    ];
    keys.iter()
        .zip(signals.named())
        .filter(|(_, (_, value))| value.is_finite())
        .map(|(key, (label, value))| NamedSignal::new(*key, label, normalize_score(value)))
        .collect()
}

fn notes_signal_stale_sync(notes: &[String]) -> bool {
    notes.iter().any(|note| {
        let lower = note.to_lowercase();
        STALE_SYNC_MARKERS.iter().any(|marker| lower.contains(marker))
    })
}

fn signals_conflict(signals: &MatchSignals) -> bool {
    let must = signals.must_have_skills_coverage;
    let experience = signals.experience_alignment;
    (must >= DIVERGENCE_HIGH && experience <= DIVERGENCE_LOW)
        || (experience >= DIVERGENCE_HIGH && must <= DIVERGENCE_LOW)
}

pub fn risk_flags(signals: &MatchSignals, missing: &[String], notes: &[String]) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    if !missing.is_empty() {
        flags.push(RiskFlag::MissingData);
    }
    if notes_signal_stale_sync(notes) {
        flags.push(RiskFlag::StaleAtsSync);
    }
    if signals_conflict(signals) {
        flags.push(RiskFlag::ConflictingSignals);
    }
    flags
}

pub fn recommended_action(band: ConfidenceBand, flags: &[RiskFlag]) -> RecruiterAction {
    match (band, flags.is_empty()) {
        (ConfidenceBand::High, true) => RecruiterAction::Push,
        (ConfidenceBand::Low | ConfidenceBand::Medium, false) => RecruiterAction::Escalate,
        _ => RecruiterAction::Review,
    }
}

/// Classifies one match. With `narrate_enabled` false the band is still
/// assigned but reasons, risk flags, and action are left empty.
pub fn classify_match(
    result: &MatchResult,
    missing_must_have: &[String],
    notes: &[String],
    config: &GuardrailsConfig,
    narrate_enabled: bool,
) -> ConfidenceResult {
    let score = result.fraction();
    let band = get_confidence_band(score, config);

    if !narrate_enabled {
        return ConfidenceResult {
            candidate_id: result.candidate_id.clone(),
            band,
            score,
            reasons: Vec::new(),
            risk_flags: Vec::new(),
            recommended_action: None,
        };
    }

    let flags = risk_flags(&result.signals, missing_must_have, notes);
    ConfidenceResult {
        candidate_id: result.candidate_id.clone(),
        band,
        score,
        reasons: narrate(band, &named_signals(&result.signals), missing_must_have),
        recommended_action: Some(recommended_action(band, &flags)),
        risk_flags: flags,
    }
}

/// Pure batch classification. Candidates missing from `candidates` are
/// classified without skill-gap detail.
pub fn classify_matches(
    job: &Job,
    candidates: &[Candidate],
    matches: &[MatchResult],
    notes: &HashMap<String, Vec<String>>,
    config: &GuardrailsConfig,
    mode: &SystemMode,
) -> Vec<ConfidenceResult> {
    let by_id: HashMap<&str, &Candidate> =
        candidates.iter().map(|c| (c.id.as_str(), c)).collect();
    let narrate_enabled = !mode.is_fire_drill();

    matches
        .iter()
        .map(|result| {
            let missing = by_id
                .get(result.candidate_id.as_str())
                .map(|candidate| skill_overlap(job, candidate).missing_must_have)
                .unwrap_or_default();
            let candidate_notes = notes
                .get(&result.candidate_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            classify_match(result, &missing, candidate_notes, config, narrate_enabled)
        })
        .collect()
}

/// Loads the tenant's guardrails and mode, then classifies every match.
/// Without `deps` the default guardrails and production mode apply.
pub async fn run_confidence_agent(
    input: &ConfidenceAgentInput,
    deps: Option<&ConfidenceDeps<'_>>,
) -> Result<ConfidenceRun, ConfidenceError> {
    let (config, mode) = match deps {
        Some(deps) => (
            deps.guardrails.resolve(&input.tenant_id).await?,
            deps.modes.mode(&input.tenant_id).await?,
        ),
        None => (GuardrailsConfig::default(), SystemMode::Production),
    };

    let results = classify_matches(
        &input.job,
        &input.candidates,
        &input.matches,
        &input.notes,
        &config,
        &mode,
    );

    debug!(
        "Confidence run for job {} (tenant {}, mode {mode}): {} results",
        input.job.id,
        input.tenant_id,
        results.len()
    );

    Ok(ConfidenceRun {
        job_id: input.job.id.clone(),
        results,
    })
}
