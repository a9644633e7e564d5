//! The rule set. Rules are independent and may all fire together.

use chrono::{DateTime, Utc};

use crate::guardrails::GuardrailsConfig;
use crate::modes::SystemMode;

use super::telemetry::TelemetrySnapshot;
use super::{
    GuardrailField, Recommendation, RecommendationConfidence, RecommendationStatus,
    ThresholdChange,
};

pub const RAISE_MIN_MATCH_SCORE_ID: &str = "raise-min-match-score";
pub const TIGHTEN_SHORTLIST_ID: &str = "tighten-shortlist-cap";
pub const RAISE_CONFIDENCE_BANDS_ID: &str = "raise-confidence-bands";
pub const NO_ACTION_ID: &str = "no-action";

const FALSE_POSITIVE_TRIGGER: f64 = 0.25;
const FALSE_POSITIVE_HIGH: f64 = 0.35;
const MQI_DROP_TRIGGER: f64 = -5.0;
const MIN_MATCH_SCORE_STEP: f64 = 5.0;
const MIN_MATCH_SCORE_CAP: f64 = 95.0;

const PRESSURE_TRIGGER: f64 = 0.6;
const PRESSURE_HIGH: f64 = 0.8;
const AVG_SCORE_TRIGGER: f64 = 60.0;
const SHORTLIST_FLOOR: u32 = 3;

const LOW_SHARE_TRIGGER: f64 = 0.35;
const MEDIUM_BAND_STEP: f64 = 0.05;
const MEDIUM_BAND_CAP: f64 = 0.9;
const HIGH_BAND_STEP: f64 = 0.03;
const HIGH_BAND_CAP: f64 = 0.95;

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Keeps band arithmetic free of float noise (0.55 + 0.05 = 0.6).
fn round_band(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

struct Draft {
    id: &'static str,
    title: String,
    summary: String,
    rationale: String,
    suggested_change: Vec<ThresholdChange>,
    confidence: RecommendationConfidence,
    signals: Vec<String>,
}

fn raise_min_match_score(telemetry: &TelemetrySnapshot, config: &GuardrailsConfig) -> Option<Draft> {
    let fp_rate = telemetry.feedback.false_positive_rate;
    if fp_rate <= FALSE_POSITIVE_TRIGGER && telemetry.mqi_trend >= MQI_DROP_TRIGGER {
        return None;
    }

    let from = config.min_match_score();
    let to = (from + MIN_MATCH_SCORE_STEP).min(MIN_MATCH_SCORE_CAP);
    Some(Draft {
        id: RAISE_MIN_MATCH_SCORE_ID,
        title: "Raise minimum match score".to_string(),
        summary: format!("Raise minMatchScore from {from:.0} to {to:.0}."),
        rationale: "Recruiters are rejecting surfaced matches or match quality is \
                    trending down; a higher floor removes marginal candidates."
            .to_string(),
        suggested_change: vec![ThresholdChange {
            field: GuardrailField::MinMatchScore,
            from,
            to,
        }],
        confidence: if fp_rate > FALSE_POSITIVE_HIGH {
            RecommendationConfidence::High
        } else {
            RecommendationConfidence::Medium
        },
        signals: vec![
            format!("False-positive rate {}", percent(fp_rate)),
            format!("MQI trend {:+.1}", telemetry.mqi_trend),
        ],
    })
}

fn tighten_shortlist(telemetry: &TelemetrySnapshot, config: &GuardrailsConfig) -> Option<Draft> {
    let pressure = telemetry.feedback.shortlist_pressure;
    let avg_score = telemetry.feedback.avg_match_score;
    if pressure <= PRESSURE_TRIGGER && avg_score >= AVG_SCORE_TRIGGER {
        return None;
    }

    let from = config.shortlist_max_candidates();
    let step = if pressure > PRESSURE_HIGH { 3 } else { 2 };
    let to = from.saturating_sub(step).max(SHORTLIST_FLOOR).min(from);
    Some(Draft {
        id: TIGHTEN_SHORTLIST_ID,
        title: "Tighten shortlist size".to_string(),
        summary: format!("Reduce shortlistMaxCandidates from {from} to {to}."),
        rationale: "Shortlists are crowded or average match quality is low; fewer \
                    slots keep recruiter attention on the strongest candidates."
            .to_string(),
        suggested_change: vec![ThresholdChange {
            field: GuardrailField::ShortlistMaxCandidates,
            from: f64::from(from),
            to: f64::from(to),
        }],
        confidence: RecommendationConfidence::Medium,
        signals: vec![
            format!("Shortlist pressure {}", percent(pressure)),
            format!("Average match score {avg_score:.1}"),
        ],
    })
}

fn raise_confidence_bands(
    telemetry: &TelemetrySnapshot,
    config: &GuardrailsConfig,
) -> Option<Draft> {
    let low_share = telemetry.feedback.distribution.low;
    if low_share <= LOW_SHARE_TRIGGER {
        return None;
    }

    let bands = config.confidence_bands();
    let medium_to = round_band((bands.medium + MEDIUM_BAND_STEP).min(MEDIUM_BAND_CAP));
    let high_to = round_band((bands.high + HIGH_BAND_STEP).min(HIGH_BAND_CAP));
    Some(Draft {
        id: RAISE_CONFIDENCE_BANDS_ID,
        title: "Raise confidence band cutoffs".to_string(),
        summary: format!(
            "Raise confidence bands to medium {medium_to:.2} and high {high_to:.2}."
        ),
        rationale: "A large share of feedback lands on low-confidence matches; \
                    stricter bands keep uncertain matches out of the top tier."
            .to_string(),
        suggested_change: vec![
            ThresholdChange {
                field: GuardrailField::ConfidenceBandMedium,
                from: bands.medium,
                to: medium_to,
            },
            ThresholdChange {
                field: GuardrailField::ConfidenceBandHigh,
                from: bands.high,
                to: high_to,
            },
        ],
        confidence: RecommendationConfidence::High,
        signals: vec![format!("Low-confidence share {}", percent(low_share))],
    })
}

fn no_action(telemetry: &TelemetrySnapshot) -> Draft {
    Draft {
        id: NO_ACTION_ID,
        title: "No guardrail changes needed".to_string(),
        summary: "Current guardrails are performing within expected ranges.".to_string(),
        rationale: "No telemetry signal crossed a tuning threshold.".to_string(),
        suggested_change: Vec::new(),
        confidence: RecommendationConfidence::Low,
        signals: vec![
            format!(
                "False-positive rate {}",
                percent(telemetry.feedback.false_positive_rate)
            ),
            format!("MQI trend {:+.1}", telemetry.mqi_trend),
        ],
    }
}

/// Evaluates every rule against the tenant's telemetry and current config.
/// Pilot tenants get every recommendation at low confidence. Statuses start
/// pending; carrying them forward is the engine's job.
pub fn evaluate_rules(
    telemetry: &TelemetrySnapshot,
    config: &GuardrailsConfig,
    mode: &SystemMode,
    generated_at: DateTime<Utc>,
) -> Vec<Recommendation> {
    let mut drafts: Vec<Draft> = [
        raise_min_match_score(telemetry, config),
        tighten_shortlist(telemetry, config),
        raise_confidence_bands(telemetry, config),
    ]
    .into_iter()
    .flatten()
    .collect();

    if drafts.is_empty() {
        drafts.push(no_action(telemetry));
    }

    drafts
        .into_iter()
        .map(|draft| Recommendation {
            id: draft.id.to_string(),
            title: draft.title,
            summary: draft.summary,
            rationale: draft.rationale,
            suggested_change: draft.suggested_change,
            confidence: if mode.is_pilot() {
                RecommendationConfidence::Low
            } else {
                draft.confidence
            },
            signals: draft.signals,
            status: RecommendationStatus::Pending,
            system_mode: mode.clone(),
            generated_at,
        })
        .collect()
}
