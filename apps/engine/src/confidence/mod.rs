//! Confidence Engine — classifies how trustworthy a match score is.
//!
//! Two variants share one contract (normalize → classify → explain):
//! - `job_risk`: consumes `MatchResult` signals plus recruiter/ATS notes and
//!   emits risk flags and a recommended action. System of record.
//! - `signal_bag`: driven by an arbitrary bag of named signals.
//!
//! Classification and narration are independent: with narration off (fire
//! drill) a band is still assigned but `reasons` is empty.

pub mod job_risk;
pub mod narration;
pub mod signal_bag;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::guardrails::{ConfidenceBands, GuardrailsConfig};

pub use job_risk::{
    classify_matches, run_confidence_agent, ConfidenceAgentInput, ConfidenceDeps,
    ConfidenceError, ConfidenceRun,
};
pub use signal_bag::{classify_signal_bag, SignalBagInput, SignalBagOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// Ordering rank: HIGH > MEDIUM > LOW.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    MissingData,
    StaleAtsSync,
    ConflictingSignals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecruiterAction {
    Push,
    Escalate,
    Review,
}

/// Which confidence engine produced (or should produce) a classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceVariant {
    #[default]
    JobRisk,
    SignalBag,
}

impl ConfidenceVariant {
    pub fn default_bands(&self) -> ConfidenceBands {
        match self {
            Self::JobRisk => ConfidenceBands::default(),
            Self::SignalBag => ConfidenceBands {
                high: 0.75,
                medium: 0.60,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub candidate_id: String,
    pub band: ConfidenceBand,
    /// Normalized 0–1.
    pub score: f64,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<RecruiterAction>,
}

/// Accepts a 0–1 fraction or a 0–100 percentage; returns 0–1.
pub fn normalize_score(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = if value > 1.0 { value / 100.0 } else { value };
    scaled.clamp(0.0, 1.0)
}

pub fn classify(score: f64, bands: ConfidenceBands) -> ConfidenceBand {
    let score = normalize_score(score);
    if score >= bands.high {
        ConfidenceBand::High
    } else if score >= bands.medium {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

/// Band for `score` under the tenant's configured cutoffs.
pub fn get_confidence_band(score: f64, config: &GuardrailsConfig) -> ConfidenceBand {
    classify(score, config.confidence_bands())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_band_boundaries() {
        let config = GuardrailsConfig::default();
        assert_eq!(get_confidence_band(0.75, &config), ConfidenceBand::High);
        assert_eq!(get_confidence_band(0.74, &config), ConfidenceBand::Medium);
        assert_eq!(get_confidence_band(0.55, &config), ConfidenceBand::Medium);
        assert_eq!(get_confidence_band(0.549, &config), ConfidenceBand::Low);
    }

    #[test]
    fn test_percentages_are_normalized() {
        let config = GuardrailsConfig::default();
        assert_eq!(get_confidence_band(82.0, &config), ConfidenceBand::High);
        assert_eq!(get_confidence_band(60.0, &config), ConfidenceBand::Medium);
        assert_eq!(get_confidence_band(12.0, &config), ConfidenceBand::Low);
        assert_eq!(normalize_score(f64::NAN), 0.0);
        assert_eq!(normalize_score(250.0), 1.0);
    }

    #[test]
    fn test_classification_is_monotonic() {
        let bands = [
            ConfidenceBands::default(),
            ConfidenceVariant::SignalBag.default_bands(),
            ConfidenceBands {
                high: 0.5,
                medium: 0.7,
            },
        ];
        for bands in bands {
            let mut previous = ConfidenceBand::Low;
            for step in 0..=100 {
                let band = classify(step as f64 / 100.0, bands);
                assert!(band.rank() >= previous.rank(), "band dropped at {step}");
                previous = band;
            }
        }
    }

    #[test]
    fn test_variants_have_distinct_medium_cutoffs() {
        assert_eq!(ConfidenceVariant::JobRisk.default_bands().medium, 0.55);
        assert_eq!(ConfidenceVariant::SignalBag.default_bands().medium, 0.60);
    }
}
