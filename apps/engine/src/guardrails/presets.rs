use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::guardrails::config::{
    ConfidenceBands, ExplainConfig, ExplainLevel, GuardrailsConfig, SafetyConfig, ScoringConfig,
    ScoringStrategy, ScoringThresholds, ScoringWeights, ShortlistConfig, ShortlistStrategy,
};
use crate::guardrails::resolver::GuardrailsError;

/// Named bundle of default weights, thresholds, and safety rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardrailsPreset {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl GuardrailsPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }

    /// Raw preset weights. Also the fallback when tenant weights sum to ≤ 0.
    pub fn weights(&self) -> ScoringWeights {
        match self {
            Self::Conservative => ScoringWeights {
                must_have_skills: 0.5,
                nice_to_have_skills: 0.15,
                experience: 0.25,
                location: 0.1,
            },
            Self::Balanced => ScoringWeights {
                must_have_skills: 0.4,
                nice_to_have_skills: 0.2,
                experience: 0.25,
                location: 0.15,
            },
            Self::Aggressive => ScoringWeights {
                must_have_skills: 0.35,
                nice_to_have_skills: 0.25,
                experience: 0.25,
                location: 0.15,
            },
        }
    }

    pub fn config(&self) -> GuardrailsConfig {
        match self {
            Self::Conservative => GuardrailsConfig {
                preset: *self,
                scoring: ScoringConfig {
                    strategy: ScoringStrategy::Weighted,
                    weights: self.weights(),
                    thresholds: ScoringThresholds {
                        min_match_score: 70.0,
                        shortlist_min_score: Some(75.0),
                        shortlist_max_candidates: Some(5),
                    },
                },
                safety: SafetyConfig {
                    require_must_haves: true,
                    confidence_bands: Some(ConfidenceBands {
                        high: 0.8,
                        medium: 0.6,
                    }),
                },
                shortlist: Some(ShortlistConfig {
                    strategy: ShortlistStrategy::Strict,
                    max_candidates: 5,
                }),
                explain: Some(ExplainConfig {
                    level: ExplainLevel::Detailed,
                    include_weights: true,
                }),
            },
            Self::Balanced => GuardrailsConfig {
                preset: *self,
                scoring: ScoringConfig {
                    strategy: ScoringStrategy::Weighted,
                    weights: self.weights(),
                    thresholds: ScoringThresholds {
                        min_match_score: 60.0,
                        shortlist_min_score: Some(65.0),
                        shortlist_max_candidates: Some(10),
                    },
                },
                safety: SafetyConfig {
                    require_must_haves: true,
                    confidence_bands: Some(ConfidenceBands::default()),
                },
                shortlist: Some(ShortlistConfig {
                    strategy: ShortlistStrategy::Quality,
                    max_candidates: 10,
                }),
                explain: Some(ExplainConfig {
                    level: ExplainLevel::Standard,
                    include_weights: false,
                }),
            },
            Self::Aggressive => GuardrailsConfig {
                preset: *self,
                scoring: ScoringConfig {
                    strategy: ScoringStrategy::Weighted,
                    weights: self.weights(),
                    thresholds: ScoringThresholds {
                        min_match_score: 45.0,
                        shortlist_min_score: None,
                        shortlist_max_candidates: Some(20),
                    },
                },
                safety: SafetyConfig {
                    require_must_haves: false,
                    confidence_bands: Some(ConfidenceBands {
                        high: 0.7,
                        medium: 0.5,
                    }),
                },
                shortlist: Some(ShortlistConfig {
                    strategy: ShortlistStrategy::Fast,
                    max_candidates: 20,
                }),
                explain: Some(ExplainConfig {
                    level: ExplainLevel::Compact,
                    include_weights: false,
                }),
            },
        }
    }
}

impl fmt::Display for GuardrailsPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuardrailsPreset {
    type Err = GuardrailsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "balanced" => Ok(Self::Balanced),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(GuardrailsError::UnknownPreset(other.to_string())),
        }
    }
}
