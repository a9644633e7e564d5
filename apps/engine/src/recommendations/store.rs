use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::is_undefined_table;

use super::Recommendation;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt recommendation payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Persisted recommendation batch per tenant. `save` replaces the batch.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn list(&self, tenant_id: &str) -> Result<Vec<Recommendation>, StoreError>;
    async fn save(&self, tenant_id: &str, recommendations: &[Recommendation])
        -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRecommendationStore {
    batches: RwLock<HashMap<String, Vec<Recommendation>>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn list(&self, tenant_id: &str) -> Result<Vec<Recommendation>, StoreError> {
        Ok(self
            .batches
            .read()
            .await
            .get(tenant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(
        &self,
        tenant_id: &str,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError> {
        self.batches
            .write()
            .await
            .insert(tenant_id.to_string(), recommendations.to_vec());
        Ok(())
    }
}

/// Stores each tenant's batch as one JSON document in
/// `guardrail_recommendations(tenant_id primary key, payload jsonb, updated_at)`.
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn list(&self, tenant_id: &str) -> Result<Vec<Recommendation>, StoreError> {
        let payload: Option<Json<serde_json::Value>> = match sqlx::query_scalar(
            "SELECT payload FROM guardrail_recommendations WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(payload) => payload,
            Err(e) if is_undefined_table(&e) => {
                debug!("guardrail_recommendations table missing; no persisted batch");
                None
            }
            Err(e) => return Err(e.into()),
        };

        match payload {
            Some(Json(value)) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(
        &self,
        tenant_id: &str,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_value(recommendations)?;
        sqlx::query(
            "INSERT INTO guardrail_recommendations (tenant_id, payload, updated_at) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (tenant_id) DO UPDATE \
             SET payload = EXCLUDED.payload, updated_at = NOW()",
        )
        .bind(tenant_id)
        .bind(Json(payload))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
