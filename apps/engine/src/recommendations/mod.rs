//! Guardrail recommendations — a feedback loop over match telemetry.
//!
//! `GuardrailRecommendationEngine::generate` recomputes every recommendation
//! from fresh telemetry, then carries recruiter-owned `status` forward by id
//! from the persisted batch. Per-tenant calls are serialized so an
//! `update_status` never lands between a `generate` read and write.

pub mod engine;
pub mod handlers;
pub mod rules;
pub mod store;
pub mod telemetry;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modes::SystemMode;

pub use engine::{GuardrailRecommendationEngine, RecommendationError};
pub use rules::evaluate_rules;
pub use store::{InMemoryRecommendationStore, PgRecommendationStore, RecommendationStore, StoreError};
pub use telemetry::{
    collect_telemetry, FeedbackTelemetry, InMemoryTelemetryReader, PgTelemetryReader,
    TelemetryError, TelemetryReader, TelemetrySnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationConfidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    Applied,
    Dismissed,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Applied => "applied",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "applied" => Ok(Self::Applied),
            "dismissed" => Ok(Self::Dismissed),
            other => Err(format!("unknown recommendation status '{other}'")),
        }
    }
}

/// Guardrail setting a recommendation proposes to move, named by its path in
/// the tenant's override JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardrailField {
    #[serde(rename = "scoring.thresholds.minMatchScore")]
    MinMatchScore,
    #[serde(rename = "scoring.thresholds.shortlistMaxCandidates")]
    ShortlistMaxCandidates,
    #[serde(rename = "safety.confidenceBands.medium")]
    ConfidenceBandMedium,
    #[serde(rename = "safety.confidenceBands.high")]
    ConfidenceBandHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdChange {
    pub field: GuardrailField,
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Stable per rule, so status survives recomputation.
    pub id: String,
    pub title: String,
    pub summary: String,
    pub rationale: String,
    pub suggested_change: Vec<ThresholdChange>,
    pub confidence: RecommendationConfidence,
    pub signals: Vec<String>,
    #[serde(default)]
    pub status: RecommendationStatus,
    pub system_mode: SystemMode,
    pub generated_at: DateTime<Utc>,
}
