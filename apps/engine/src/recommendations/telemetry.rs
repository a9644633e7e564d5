//! Telemetry inputs: MQI snapshots and recruiter feedback.
//!
//! Every read degrades to neutral defaults. A missing table is expected on
//! tenants that never provisioned telemetry and is only logged at debug.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::is_undefined_table;
use crate::models::{FeedbackDirection, FeedbackRecord, QualitySnapshot};

pub const FEEDBACK_SAMPLE_SIZE: i64 = 100;
const SNAPSHOT_SAMPLE_SIZE: i64 = 2;

const HIGH_CONFIDENCE_CUTOFF: f64 = 80.0;
const MEDIUM_CONFIDENCE_CUTOFF: f64 = 60.0;

const NEUTRAL_AVG_MATCH_SCORE: f64 = 70.0;
const NEUTRAL_DISTRIBUTION: ConfidenceDistribution = ConfidenceDistribution {
    high: 0.4,
    medium: 0.4,
    low: 0.2,
};
/// Below the tightening trigger so neutral telemetry proposes nothing.
const NEUTRAL_SHORTLIST_PRESSURE: f64 = 0.5;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry source unavailable: {0}")]
    Unavailable(String),

    #[error("telemetry query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for TelemetryError {
    fn from(err: sqlx::Error) -> Self {
        if is_undefined_table(&err) {
            Self::Unavailable(err.to_string())
        } else {
            Self::Query(err)
        }
    }
}

#[async_trait]
pub trait TelemetryReader: Send + Sync {
    /// Tenant-scope snapshots, newest first.
    async fn quality_snapshots(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<QualitySnapshot>, TelemetryError>;

    /// Feedback records, newest first.
    async fn recent_feedback(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<FeedbackRecord>, TelemetryError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregates
// ────────────────────────────────────────────────────────────────────────────

/// Share of feedback per confidence bucket; sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTelemetry {
    pub sample_size: usize,
    pub avg_match_score: f64,
    pub false_positive_rate: f64,
    pub distribution: ConfidenceDistribution,
    /// Share of medium + high confidence feedback.
    pub shortlist_pressure: f64,
}

impl Default for FeedbackTelemetry {
    fn default() -> Self {
        Self {
            sample_size: 0,
            avg_match_score: NEUTRAL_AVG_MATCH_SCORE,
            false_positive_rate: 0.0,
            distribution: NEUTRAL_DISTRIBUTION,
            shortlist_pressure: NEUTRAL_SHORTLIST_PRESSURE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Latest minus previous tenant MQI; 0 without two snapshots.
    pub mqi_trend: f64,
    pub feedback: FeedbackTelemetry,
}

/// Confidence on a 0–100 scale; values ≤ 1 are fractions.
fn confidence_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if value <= 1.0 {
        value * 100.0
    } else {
        value
    }
}

pub fn mqi_trend(snapshots: &[QualitySnapshot]) -> f64 {
    match snapshots {
        [latest, previous, ..] => latest.mqi - previous.mqi,
        _ => 0.0,
    }
}

/// Aggregates feedback; an empty sample yields the neutral defaults.
pub fn summarize_feedback(records: &[FeedbackRecord]) -> FeedbackTelemetry {
    if records.is_empty() {
        return FeedbackTelemetry::default();
    }

    let n = records.len() as f64;
    let avg_match_score = records.iter().map(|r| r.match_score).sum::<f64>() / n;
    let downs = records
        .iter()
        .filter(|r| r.direction == FeedbackDirection::Down)
        .count() as f64;

    let (mut high, mut medium, mut low) = (0.0, 0.0, 0.0);
    for record in records {
        let pct = confidence_percent(record.confidence_score);
        if pct >= HIGH_CONFIDENCE_CUTOFF {
            high += 1.0;
        } else if pct >= MEDIUM_CONFIDENCE_CUTOFF {
            medium += 1.0;
        } else {
            low += 1.0;
        }
    }

    FeedbackTelemetry {
        sample_size: records.len(),
        avg_match_score,
        false_positive_rate: downs / n,
        distribution: ConfidenceDistribution {
            high: high / n,
            medium: medium / n,
            low: low / n,
        },
        shortlist_pressure: (high + medium) / n,
    }
}

fn log_degraded(source: &str, tenant_id: &str, err: &TelemetryError) {
    match err {
        TelemetryError::Unavailable(_) => {
            debug!("{source} unavailable for tenant {tenant_id}; using neutral defaults")
        }
        TelemetryError::Query(e) => {
            warn!("{source} query failed for tenant {tenant_id}; using neutral defaults: {e}")
        }
    }
}

/// Reads both telemetry sources. Never fails.
pub async fn collect_telemetry(reader: &dyn TelemetryReader, tenant_id: &str) -> TelemetrySnapshot {
    let mqi_trend = match reader.quality_snapshots(tenant_id, SNAPSHOT_SAMPLE_SIZE).await {
        Ok(snapshots) => mqi_trend(&snapshots),
        Err(e) => {
            log_degraded("quality snapshots", tenant_id, &e);
            0.0
        }
    };

    let feedback = match reader.recent_feedback(tenant_id, FEEDBACK_SAMPLE_SIZE).await {
        Ok(records) => summarize_feedback(&records),
        Err(e) => {
            log_degraded("match feedback", tenant_id, &e);
            FeedbackTelemetry::default()
        }
    };

    TelemetrySnapshot {
        mqi_trend,
        feedback,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory reader
// ────────────────────────────────────────────────────────────────────────────

/// Fixed telemetry per tenant. Unknown tenants read as empty; an
/// `unavailable` reader fails every read structurally.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTelemetryReader {
    snapshots: HashMap<String, Vec<QualitySnapshot>>,
    feedback: HashMap<String, Vec<FeedbackRecord>>,
    unavailable: bool,
}

impl InMemoryTelemetryReader {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// `snapshots` newest first.
    pub fn with_snapshots(
        mut self,
        tenant_id: impl Into<String>,
        snapshots: Vec<QualitySnapshot>,
    ) -> Self {
        self.snapshots.insert(tenant_id.into(), snapshots);
        self
    }

    pub fn with_feedback(mut self, tenant_id: impl Into<String>, feedback: Vec<FeedbackRecord>) -> Self {
        self.feedback.insert(tenant_id.into(), feedback);
        self
    }
}

#[async_trait]
impl TelemetryReader for InMemoryTelemetryReader {
    async fn quality_snapshots(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<QualitySnapshot>, TelemetryError> {
        if self.unavailable {
            return Err(TelemetryError::Unavailable("quality_snapshots".to_string()));
        }
        Ok(self
            .snapshots
            .get(tenant_id)
            .map(|s| s.iter().take(limit.max(0) as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn recent_feedback(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<FeedbackRecord>, TelemetryError> {
        if self.unavailable {
            return Err(TelemetryError::Unavailable("match_feedback".to_string()));
        }
        Ok(self
            .feedback
            .get(tenant_id)
            .map(|f| f.iter().take(limit.max(0) as usize).cloned().collect())
            .unwrap_or_default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres reader
// ────────────────────────────────────────────────────────────────────────────

/// Reads `quality_snapshots` and `match_feedback`.
#[derive(Clone)]
pub struct PgTelemetryReader {
    pool: PgPool,
}

impl PgTelemetryReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TelemetryReader for PgTelemetryReader {
    async fn quality_snapshots(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<QualitySnapshot>, TelemetryError> {
        let snapshots = sqlx::query_as::<_, QualitySnapshot>(
            "SELECT mqi, created_at FROM quality_snapshots \
             WHERE tenant_id = $1 AND scope = 'tenant' \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(snapshots)
    }

    async fn recent_feedback(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<FeedbackRecord>, TelemetryError> {
        let rows: Vec<(String, f64, f64)> = sqlx::query_as(
            "SELECT direction, match_score, confidence_score FROM match_feedback \
             WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(direction, match_score, confidence_score)| {
                let direction = FeedbackDirection::parse(&direction)?;
                Some(FeedbackRecord {
                    direction,
                    match_score,
                    confidence_score,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn feedback(direction: FeedbackDirection, match_score: f64, confidence: f64) -> FeedbackRecord {
        FeedbackRecord {
            direction,
            match_score,
            confidence_score: confidence,
        }
    }

    fn snapshot(mqi: f64, minutes_ago: i64) -> QualitySnapshot {
        QualitySnapshot {
            mqi,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_summarize_feedback() {
        let records = vec![
            feedback(FeedbackDirection::Up, 90.0, 0.9),
            feedback(FeedbackDirection::Down, 70.0, 65.0),
            feedback(FeedbackDirection::Up, 50.0, 0.3),
            feedback(FeedbackDirection::Down, 30.0, 10.0),
        ];
        let summary = summarize_feedback(&records);
        assert_eq!(summary.sample_size, 4);
        assert_eq!(summary.avg_match_score, 60.0);
        assert_eq!(summary.false_positive_rate, 0.5);
        assert_eq!(summary.distribution.high, 0.25);
        assert_eq!(summary.distribution.medium, 0.25);
        assert_eq!(summary.distribution.low, 0.5);
        assert_eq!(summary.shortlist_pressure, 0.5);
    }

    #[test]
    fn test_empty_feedback_is_neutral() {
        let summary = summarize_feedback(&[]);
        assert_eq!(summary, FeedbackTelemetry::default());
        assert_eq!(summary.avg_match_score, 70.0);
        assert_eq!(summary.distribution, NEUTRAL_DISTRIBUTION);
    }

    #[test]
    fn test_mqi_trend_needs_two_snapshots() {
        assert_eq!(mqi_trend(&[]), 0.0);
        assert_eq!(mqi_trend(&[snapshot(80.0, 0)]), 0.0);
        assert_eq!(mqi_trend(&[snapshot(72.0, 0), snapshot(80.0, 60)]), -8.0);
    }

    #[tokio::test]
    async fn test_collect_degrades_when_unavailable() {
        let reader = InMemoryTelemetryReader::unavailable();
        let telemetry = collect_telemetry(&reader, "t1").await;
        assert_eq!(telemetry, TelemetrySnapshot::default());
    }

    #[tokio::test]
    async fn test_collect_limits_to_recent_snapshots() {
        let reader = InMemoryTelemetryReader::default().with_snapshots(
            "t1",
            vec![snapshot(60.0, 0), snapshot(70.0, 10), snapshot(10.0, 20)],
        );
        let telemetry = collect_telemetry(&reader, "t1").await;
        assert_eq!(telemetry.mqi_trend, -10.0);
        assert_eq!(telemetry.feedback.sample_size, 0);
    }
}
