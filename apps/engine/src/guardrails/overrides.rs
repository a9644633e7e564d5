//! Tenant overrides: a fully-optional mirror of `GuardrailsConfig`.
//!
//! Present leaves replace the preset value; absent leaves keep it. Nested
//! sections merge recursively, one field at a time.

use serde::{Deserialize, Serialize};

use crate::guardrails::config::{
    ExplainConfig, ExplainLevel, GuardrailsConfig, ScoringStrategy,
    ShortlistConfig, ShortlistStrategy,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailsOverride {
    #[serde(default)]
    pub scoring: Option<ScoringOverride>,
    #[serde(default)]
    pub safety: Option<SafetyOverride>,
    #[serde(default)]
    pub shortlist: Option<ShortlistOverride>,
    #[serde(default)]
    pub explain: Option<ExplainOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringOverride {
    #[serde(default)]
    pub strategy: Option<ScoringStrategy>,
    #[serde(default)]
    pub weights: Option<WeightsOverride>,
    #[serde(default)]
    pub thresholds: Option<ThresholdsOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightsOverride {
    #[serde(default)]
    pub must_have_skills: Option<f64>,
    #[serde(default)]
    pub nice_to_have_skills: Option<f64>,
    #[serde(default)]
    pub experience: Option<f64>,
    #[serde(default)]
    pub location: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdsOverride {
    #[serde(default)]
    pub min_match_score: Option<f64>,
    #[serde(default)]
    pub shortlist_min_score: Option<f64>,
    #[serde(default)]
    pub shortlist_max_candidates: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyOverride {
    #[serde(default)]
    pub require_must_haves: Option<bool>,
    #[serde(default)]
    pub confidence_bands: Option<BandsOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandsOverride {
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub medium: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortlistOverride {
    #[serde(default)]
    pub strategy: Option<ShortlistStrategy>,
    #[serde(default)]
    pub max_candidates: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainOverride {
    #[serde(default)]
    pub level: Option<ExplainLevel>,
    #[serde(default)]
    pub include_weights: Option<bool>,
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl GuardrailsConfig {
    /// Returns a copy of `self` with `overrides` merged in.
    pub fn apply(&self, overrides: &GuardrailsOverride) -> GuardrailsConfig {
        let mut merged = self.clone();

        if let Some(scoring) = &overrides.scoring {
            replace(&mut merged.scoring.strategy, scoring.strategy);
            if let Some(weights) = &scoring.weights {
                let target = &mut merged.scoring.weights;
                replace(&mut target.must_have_skills, weights.must_have_skills);
                replace(&mut target.nice_to_have_skills, weights.nice_to_have_skills);
                replace(&mut target.experience, weights.experience);
                replace(&mut target.location, weights.location);
            }
            if let Some(thresholds) = &scoring.thresholds {
                let target = &mut merged.scoring.thresholds;
                replace(&mut target.min_match_score, thresholds.min_match_score);
                if thresholds.shortlist_min_score.is_some() {
                    target.shortlist_min_score = thresholds.shortlist_min_score;
                }
                if thresholds.shortlist_max_candidates.is_some() {
                    target.shortlist_max_candidates = thresholds.shortlist_max_candidates;
                }
            }
        }

        if let Some(safety) = &overrides.safety {
            replace(
                &mut merged.safety.require_must_haves,
                safety.require_must_haves,
            );
            if let Some(bands) = &safety.confidence_bands {
                let mut target = merged.safety.confidence_bands.unwrap_or_default();
                replace(&mut target.high, bands.high);
                replace(&mut target.medium, bands.medium);
                merged.safety.confidence_bands = Some(target);
            }
        }

        if let Some(shortlist) = &overrides.shortlist {
            let mut target = merged.shortlist.take().unwrap_or(ShortlistConfig {
                strategy: ShortlistStrategy::default(),
                max_candidates: self.shortlist_max_candidates(),
            });
            replace(&mut target.strategy, shortlist.strategy);
            replace(&mut target.max_candidates, shortlist.max_candidates);
            merged.shortlist = Some(target);
        }

        if let Some(explain) = &overrides.explain {
            let mut target = merged.explain.take().unwrap_or_else(ExplainConfig::default);
            replace(&mut target.level, explain.level);
            replace(&mut target.include_weights, explain.include_weights);
            merged.explain = Some(target);
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guardrails::presets::GuardrailsPreset;
    use serde_json::json;

    #[test]
    fn test_empty_override_is_identity() {
        let base = GuardrailsPreset::Balanced.config();
        assert_eq!(base.apply(&GuardrailsOverride::default()), base);
    }

    #[test]
    fn test_nested_leaf_replaces_only_that_field() {
        let base = GuardrailsPreset::Balanced.config();
        let overrides: GuardrailsOverride = serde_json::from_value(json!({
            "scoring": { "thresholds": { "minMatchScore": 72 } }
        }))
        .unwrap();

        let merged = base.apply(&overrides);
        assert_eq!(merged.scoring.thresholds.min_match_score, 72.0);
        assert_eq!(
            merged.scoring.thresholds.shortlist_min_score,
            base.scoring.thresholds.shortlist_min_score
        );
        assert_eq!(merged.scoring.weights, base.scoring.weights);
        assert_eq!(merged.safety, base.safety);
    }

    #[test]
    fn test_band_override_merges_with_existing_bands() {
        let base = GuardrailsPreset::Balanced.config();
        let overrides: GuardrailsOverride = serde_json::from_value(json!({
            "safety": { "confidenceBands": { "medium": 0.6 } }
        }))
        .unwrap();

        let bands = base.apply(&overrides).confidence_bands();
        assert_eq!(bands.high, 0.75);
        assert_eq!(bands.medium, 0.6);
    }

    #[test]
    fn test_missing_section_is_created_from_defaults() {
        let mut base = GuardrailsPreset::Balanced.config();
        base.explain = None;
        let overrides: GuardrailsOverride = serde_json::from_value(json!({
            "explain": { "includeWeights": true }
        }))
        .unwrap();

        let explain = base.apply(&overrides).explain();
        assert_eq!(explain.level, ExplainLevel::Standard);
        assert!(explain.include_weights);
    }

    #[test]
    fn test_strategy_and_require_flag_override() {
        let base = GuardrailsPreset::Balanced.config();
        let overrides: GuardrailsOverride = serde_json::from_value(json!({
            "scoring": { "strategy": "simple" },
            "safety": { "requireMustHaves": false },
            "shortlist": { "strategy": "diversity" }
        }))
        .unwrap();

        let merged = base.apply(&overrides);
        assert_eq!(merged.scoring.strategy, ScoringStrategy::Simple);
        assert!(!merged.safety.require_must_haves);
        assert_eq!(merged.shortlist_strategy(), ShortlistStrategy::Diversity);
    }
}
