use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::guardrails::{GuardrailsError, GuardrailsResolver};
use crate::modes::{ensure_agent_enabled, ModeError, SystemModeReader};

use super::rules::evaluate_rules;
use super::store::{RecommendationStore, StoreError};
use super::telemetry::{collect_telemetry, TelemetryReader};
use super::{Recommendation, RecommendationStatus};

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("unknown recommendation '{id}' for tenant {tenant_id}")]
    UnknownRecommendation { tenant_id: String, id: String },

    #[error(transparent)]
    Guardrails(#[from] GuardrailsError),

    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct GuardrailRecommendationEngine {
    telemetry: Arc<dyn TelemetryReader>,
    store: Arc<dyn RecommendationStore>,
    guardrails: Arc<dyn GuardrailsResolver>,
    modes: Arc<dyn SystemModeReader>,
    /// One guard per tenant; held across every read-merge-write. Entries are
    /// dropped once no call for the tenant holds or awaits them.
    tenant_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GuardrailRecommendationEngine {
    pub fn new(
        telemetry: Arc<dyn TelemetryReader>,
        store: Arc<dyn RecommendationStore>,
        guardrails: Arc<dyn GuardrailsResolver>,
        modes: Arc<dyn SystemModeReader>,
    ) -> Self {
        Self {
            telemetry,
            store,
            guardrails,
            modes,
            tenant_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn tenant_lock(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        self.tenant_locks
            .lock()
            .await
            .entry(tenant_id.to_string())
            .or_default()
            .clone()
    }

    async fn release_tenant_lock(&self, tenant_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.tenant_locks.lock().await;
        // The map's entry plus `lock` itself: nobody else is waiting.
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(tenant_id);
        }
    }

    async fn with_tenant_lock<T, F>(&self, tenant_id: &str, op: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let lock = self.tenant_lock(tenant_id).await;
        let output = {
            let _guard = lock.lock().await;
            op.await
        };
        self.release_tenant_lock(tenant_id, lock).await;
        output
    }

    /// Recomputes the tenant's recommendations and persists them, keeping
    /// each surviving id's status. Fire-drill tenants get an empty list and
    /// the persisted batch is left untouched.
    pub async fn generate(&self, tenant_id: &str) -> Result<Vec<Recommendation>, RecommendationError> {
        self.with_tenant_lock(tenant_id, self.generate_locked(tenant_id))
            .await
    }

    async fn generate_locked(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let mode = self.modes.mode(tenant_id).await?;
        if mode.is_fire_drill() {
            info!("Recommendations suppressed for tenant {tenant_id}: fire drill");
            return Ok(Vec::new());
        }

        let config = self.guardrails.resolve(tenant_id).await?;
        let telemetry = collect_telemetry(self.telemetry.as_ref(), tenant_id).await;
        debug!("Telemetry for tenant {tenant_id}: {telemetry:?}");

        let previous: HashMap<String, RecommendationStatus> = self
            .store
            .list(tenant_id)
            .await?
            .into_iter()
            .map(|r| (r.id, r.status))
            .collect();

        let mut recommendations = evaluate_rules(&telemetry, &config, &mode, Utc::now());
        for recommendation in &mut recommendations {
            if let Some(status) = previous.get(&recommendation.id) {
                recommendation.status = *status;
            }
        }

        self.store.save(tenant_id, &recommendations).await?;
        info!(
            "Generated {} guardrail recommendation(s) for tenant {tenant_id} ({mode})",
            recommendations.len()
        );
        Ok(recommendations)
    }

    /// Sets one recommendation's status. Applying a change is an agent
    /// action and is rejected during a fire drill.
    pub async fn update_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: RecommendationStatus,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        self.with_tenant_lock(tenant_id, self.update_status_locked(tenant_id, id, status))
            .await
    }

    async fn update_status_locked(
        &self,
        tenant_id: &str,
        id: &str,
        status: RecommendationStatus,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        if status == RecommendationStatus::Applied {
            let mode = self.modes.mode(tenant_id).await?;
            ensure_agent_enabled(&mode, "applying a guardrail recommendation")?;
        }

        let mut recommendations = self.store.list(tenant_id).await?;
        let target = recommendations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RecommendationError::UnknownRecommendation {
                tenant_id: tenant_id.to_string(),
                id: id.to_string(),
            })?;
        target.status = status;

        self.store.save(tenant_id, &recommendations).await?;
        info!("Recommendation {id} for tenant {tenant_id} marked {status}");
        Ok(recommendations)
    }
}
