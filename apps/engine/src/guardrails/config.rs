use serde::{Deserialize, Serialize};

use crate::guardrails::presets::GuardrailsPreset;

/// Default confidence band cutoffs when a tenant declares none.
pub const DEFAULT_HIGH_BAND: f64 = 0.75;
pub const DEFAULT_MEDIUM_BAND: f64 = 0.55;

/// Shortlist cap used when neither thresholds nor the shortlist section set one.
pub const DEFAULT_SHORTLIST_MAX_CANDIDATES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Skills only: experience and location weights are forced to zero.
    Simple,
    /// Blend of all four signals.
    Weighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub must_have_skills: f64,
    pub nice_to_have_skills: f64,
    pub experience: f64,
    pub location: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.must_have_skills + self.nice_to_have_skills + self.experience + self.location
    }

    fn clamp_negative(self) -> Self {
        Self {
            must_have_skills: self.must_have_skills.max(0.0),
            nice_to_have_skills: self.nice_to_have_skills.max(0.0),
            experience: self.experience.max(0.0),
            location: self.location.max(0.0),
        }
    }

    fn scaled(self, total: f64) -> Self {
        Self {
            must_have_skills: self.must_have_skills / total,
            nice_to_have_skills: self.nice_to_have_skills / total,
            experience: self.experience / total,
            location: self.location / total,
        }
    }

    /// Clamps negatives to zero and scales the components to sum to 1.
    /// Falls back to `fallback` (itself normalized) when the raw sum is ≤ 0.
    pub fn normalized(self, fallback: ScoringWeights) -> Self {
        let clamped = self.clamp_negative();
        let total = clamped.sum();
        if total > 0.0 && total.is_finite() {
            return clamped.scaled(total);
        }
        let fallback = fallback.clamp_negative();
        let fallback_total = fallback.sum();
        if fallback_total > 0.0 {
            fallback.scaled(fallback_total)
        } else {
            Self {
                must_have_skills: 0.25,
                nice_to_have_skills: 0.25,
                experience: 0.25,
                location: 0.25,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringThresholds {
    /// Either a 0–1 fraction or a 0–100 score.
    pub min_match_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortlist_min_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortlist_max_candidates: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub strategy: ScoringStrategy,
    pub weights: ScoringWeights,
    pub thresholds: ScoringThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBands {
    pub high: f64,
    pub medium: f64,
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_BAND,
            medium: DEFAULT_MEDIUM_BAND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyConfig {
    pub require_must_haves: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_bands: Option<ConfidenceBands>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortlistStrategy {
    #[default]
    Quality,
    Fast,
    Strict,
    Diversity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortlistConfig {
    pub strategy: ShortlistStrategy,
    pub max_candidates: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainLevel {
    Compact,
    #[default]
    Standard,
    Detailed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainConfig {
    pub level: ExplainLevel,
    pub include_weights: bool,
}

/// Immutable, tenant-resolved guardrails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailsConfig {
    /// Preset this config was derived from; supplies fallback weights.
    pub preset: GuardrailsPreset,
    pub scoring: ScoringConfig,
    pub safety: SafetyConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortlist: Option<ShortlistConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<ExplainConfig>,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        GuardrailsPreset::Balanced.config()
    }
}

impl GuardrailsConfig {
    /// Weights actually used for scoring under the configured strategy.
    pub fn effective_weights(&self) -> ScoringWeights {
        let fallback = self.preset.weights();
        match self.scoring.strategy {
            ScoringStrategy::Weighted => self.scoring.weights.normalized(fallback),
            ScoringStrategy::Simple => {
                let skills_only = |w: ScoringWeights| ScoringWeights {
                    experience: 0.0,
                    location: 0.0,
                    ..w
                };
                skills_only(self.scoring.weights).normalized(skills_only(fallback))
            }
        }
    }

    /// `minMatchScore` on the 0–100 scale.
    pub fn min_match_score(&self) -> f64 {
        normalize_threshold(self.scoring.thresholds.min_match_score)
    }

    /// The stricter of `minMatchScore` and `shortlistMinScore`, 0–100.
    pub fn shortlist_min_score(&self) -> f64 {
        let shortlist = self
            .scoring
            .thresholds
            .shortlist_min_score
            .map(normalize_threshold)
            .unwrap_or(0.0);
        self.min_match_score().max(shortlist)
    }

    pub fn shortlist_max_candidates(&self) -> u32 {
        self.scoring
            .thresholds
            .shortlist_max_candidates
            .or_else(|| self.shortlist.as_ref().map(|s| s.max_candidates))
            .unwrap_or(DEFAULT_SHORTLIST_MAX_CANDIDATES)
    }

    pub fn shortlist_strategy(&self) -> ShortlistStrategy {
        self.shortlist
            .as_ref()
            .map(|s| s.strategy)
            .unwrap_or_default()
    }

    pub fn confidence_bands(&self) -> ConfidenceBands {
        self.safety.confidence_bands.unwrap_or_default()
    }

    pub fn explain(&self) -> ExplainConfig {
        self.explain.clone().unwrap_or_default()
    }
}

/// Thresholds ≤ 1 are fractions and are lifted to the 0–100 scale.
pub fn normalize_threshold(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = if value <= 1.0 { value * 100.0 } else { value };
    scaled.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let w = ScoringWeights {
            must_have_skills: 4.0,
            nice_to_have_skills: 2.0,
            experience: 3.0,
            location: 1.0,
        }
        .normalized(GuardrailsPreset::Balanced.weights());
        assert!(approx(w.sum(), 1.0));
        assert!(approx(w.must_have_skills, 0.4));
    }

    #[test]
    fn test_negative_weights_clamped() {
        let w = ScoringWeights {
            must_have_skills: 1.0,
            nice_to_have_skills: -5.0,
            experience: 1.0,
            location: 0.0,
        }
        .normalized(GuardrailsPreset::Balanced.weights());
        assert_eq!(w.nice_to_have_skills, 0.0);
        assert!(approx(w.must_have_skills, 0.5));
    }

    #[test]
    fn test_zero_sum_uses_preset_fallback() {
        let zero = ScoringWeights {
            must_have_skills: 0.0,
            nice_to_have_skills: 0.0,
            experience: 0.0,
            location: 0.0,
        };
        let fallback = GuardrailsPreset::Conservative.weights();
        let w = zero.normalized(fallback);
        assert!(approx(w.sum(), 1.0));
        assert!(approx(w.must_have_skills, fallback.normalized(fallback).must_have_skills));
    }

    #[test]
    fn test_simple_strategy_drops_experience_and_location() {
        let mut config = GuardrailsConfig::default();
        config.scoring.strategy = ScoringStrategy::Simple;
        let w = config.effective_weights();
        assert_eq!(w.experience, 0.0);
        assert_eq!(w.location, 0.0);
        assert!(approx(w.sum(), 1.0));
    }

    #[test]
    fn test_normalize_threshold_lifts_fractions() {
        assert_eq!(normalize_threshold(0.6), 60.0);
        assert_eq!(normalize_threshold(65.0), 65.0);
        assert_eq!(normalize_threshold(140.0), 100.0);
        assert_eq!(normalize_threshold(f64::NAN), 0.0);
    }

    #[test]
    fn test_shortlist_min_score_takes_stricter() {
        let mut config = GuardrailsConfig::default();
        config.scoring.thresholds.min_match_score = 0.5;
        config.scoring.thresholds.shortlist_min_score = Some(70.0);
        assert_eq!(config.shortlist_min_score(), 70.0);
        config.scoring.thresholds.shortlist_min_score = Some(0.3);
        assert_eq!(config.shortlist_min_score(), 50.0);
    }

    #[test]
    fn test_shortlist_cap_prefers_thresholds() {
        let mut config = GuardrailsConfig::default();
        config.scoring.thresholds.shortlist_max_candidates = Some(4);
        config.shortlist = Some(ShortlistConfig {
            strategy: ShortlistStrategy::Fast,
            max_candidates: 12,
        });
        assert_eq!(config.shortlist_max_candidates(), 4);
        config.scoring.thresholds.shortlist_max_candidates = None;
        assert_eq!(config.shortlist_max_candidates(), 12);
    }
}
