use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One point of the match quality index (MQI) series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QualitySnapshot {
    pub mqi: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedbackDirection {
    Up,
    Down,
}

impl FeedbackDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Recruiter feedback on a surfaced match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub direction: FeedbackDirection,
    /// 0–100 match score at the time feedback was given.
    pub match_score: f64,
    /// Confidence score, either a 0–1 fraction or a 0–100 percentage.
    pub confidence_score: f64,
}
