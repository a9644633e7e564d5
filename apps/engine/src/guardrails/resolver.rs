use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::is_undefined_table;
use crate::guardrails::config::GuardrailsConfig;
use crate::guardrails::overrides::GuardrailsOverride;
use crate::guardrails::presets::GuardrailsPreset;

#[derive(Debug, Error)]
pub enum GuardrailsError {
    #[error("unknown guardrails preset '{0}'")]
    UnknownPreset(String),

    #[error("invalid guardrails overrides: {0}")]
    InvalidOverrides(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves a tenant's effective guardrails (preset merged with overrides).
#[async_trait]
pub trait GuardrailsResolver: Send + Sync {
    async fn resolve(&self, tenant_id: &str) -> Result<GuardrailsConfig, GuardrailsError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory resolver
// ────────────────────────────────────────────────────────────────────────────

/// Resolver over a fixed tenant table. Unknown tenants get the default preset.
#[derive(Debug, Clone, Default)]
pub struct StaticGuardrailsResolver {
    default_preset: GuardrailsPreset,
    tenants: HashMap<String, (GuardrailsPreset, GuardrailsOverride)>,
}

impl StaticGuardrailsResolver {
    pub fn new(default_preset: GuardrailsPreset) -> Self {
        Self {
            default_preset,
            tenants: HashMap::new(),
        }
    }

    pub fn with_tenant(
        mut self,
        tenant_id: impl Into<String>,
        preset: GuardrailsPreset,
        overrides: GuardrailsOverride,
    ) -> Self {
        self.tenants.insert(tenant_id.into(), (preset, overrides));
        self
    }
}

#[async_trait]
impl GuardrailsResolver for StaticGuardrailsResolver {
    async fn resolve(&self, tenant_id: &str) -> Result<GuardrailsConfig, GuardrailsError> {
        Ok(match self.tenants.get(tenant_id) {
            Some((preset, overrides)) => preset.config().apply(overrides),
            None => self.default_preset.config(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres resolver
// ────────────────────────────────────────────────────────────────────────────

/// Reads `tenant_guardrails(tenant_id, preset, overrides jsonb)`.
#[derive(Clone)]
pub struct PgGuardrailsResolver {
    pool: PgPool,
    default_preset: GuardrailsPreset,
}

impl PgGuardrailsResolver {
    pub fn new(pool: PgPool, default_preset: GuardrailsPreset) -> Self {
        Self {
            pool,
            default_preset,
        }
    }
}

#[async_trait]
impl GuardrailsResolver for PgGuardrailsResolver {
    async fn resolve(&self, tenant_id: &str) -> Result<GuardrailsConfig, GuardrailsError> {
        let row: Option<(Option<String>, Option<Json<serde_json::Value>>)> = match sqlx::query_as(
            "SELECT preset, overrides FROM tenant_guardrails WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(row) => row,
            Err(e) if is_undefined_table(&e) => {
                warn!("tenant_guardrails table missing; using {} preset", self.default_preset);
                None
            }
            Err(e) => return Err(e.into()),
        };

        let Some((preset, overrides)) = row else {
            debug!("No guardrails row for tenant {tenant_id}; using default preset");
            return Ok(self.default_preset.config());
        };

        let preset = match preset {
            Some(name) => name.parse::<GuardrailsPreset>()?,
            None => self.default_preset,
        };
        let overrides: GuardrailsOverride = match overrides {
            Some(Json(value)) if !value.is_null() => serde_json::from_value(value)?,
            _ => GuardrailsOverride::default(),
        };

        Ok(preset.config().apply(&overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guardrails::overrides::{ScoringOverride, ThresholdsOverride};

    #[tokio::test]
    async fn test_unknown_tenant_gets_default_preset() {
        let resolver = StaticGuardrailsResolver::new(GuardrailsPreset::Aggressive);
        let config = resolver.resolve("tenant-x").await.unwrap();
        assert_eq!(config, GuardrailsPreset::Aggressive.config());
    }

    #[tokio::test]
    async fn test_tenant_overrides_are_merged() {
        let overrides = GuardrailsOverride {
            scoring: Some(ScoringOverride {
                thresholds: Some(ThresholdsOverride {
                    min_match_score: Some(0.8),
                    ..ThresholdsOverride::default()
                }),
                ..ScoringOverride::default()
            }),
            ..GuardrailsOverride::default()
        };
        let resolver = StaticGuardrailsResolver::default().with_tenant(
            "acme",
            GuardrailsPreset::Conservative,
            overrides,
        );

        let config = resolver.resolve("acme").await.unwrap();
        assert_eq!(config.preset, GuardrailsPreset::Conservative);
        assert_eq!(config.min_match_score(), 80.0);
    }
}
