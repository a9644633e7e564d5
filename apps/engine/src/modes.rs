//! Tenant system mode — gates narration, LLM polish, and auto-tuning output.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;

use crate::db::is_undefined_table;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SystemMode {
    Pilot,
    #[default]
    Production,
    Sandbox,
    /// Tenant-wide safety mode: no narration, no LLM calls, no recommendations.
    FireDrill,
    Other(String),
}

impl SystemMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pilot" => Self::Pilot,
            "production" => Self::Production,
            "sandbox" => Self::Sandbox,
            "fire_drill" | "firedrill" => Self::FireDrill,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pilot => "pilot",
            Self::Production => "production",
            Self::Sandbox => "sandbox",
            Self::FireDrill => "fire_drill",
            Self::Other(value) => value,
        }
    }

    pub fn is_fire_drill(&self) -> bool {
        matches!(self, Self::FireDrill)
    }

    pub fn is_pilot(&self) -> bool {
        matches!(self, Self::Pilot)
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SystemMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SystemMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Error)]
pub enum ModeError {
    #[error("{action} is disabled while tenant is in {mode} mode")]
    AgentDisabled { action: String, mode: SystemMode },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Rejects `action` when the tenant is in fire drill. Pure compute paths never
/// call this; it guards recruiter-initiated actions.
pub fn ensure_agent_enabled(mode: &SystemMode, action: &str) -> Result<(), ModeError> {
    if mode.is_fire_drill() {
        return Err(ModeError::AgentDisabled {
            action: action.to_string(),
            mode: mode.clone(),
        });
    }
    Ok(())
}

#[async_trait]
pub trait SystemModeReader: Send + Sync {
    async fn mode(&self, tenant_id: &str) -> Result<SystemMode, ModeError>;
}

/// Fixed per-tenant modes; unknown tenants run in `default`.
#[derive(Debug, Clone, Default)]
pub struct StaticSystemModeReader {
    default: SystemMode,
    tenants: HashMap<String, SystemMode>,
}

impl StaticSystemModeReader {
    pub fn new(default: SystemMode) -> Self {
        Self {
            default,
            tenants: HashMap::new(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>, mode: SystemMode) -> Self {
        self.tenants.insert(tenant_id.into(), mode);
        self
    }
}

#[async_trait]
impl SystemModeReader for StaticSystemModeReader {
    async fn mode(&self, tenant_id: &str) -> Result<SystemMode, ModeError> {
        Ok(self
            .tenants
            .get(tenant_id)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

/// Reads `tenant_system_modes(tenant_id, mode)`.
#[derive(Clone)]
pub struct PgSystemModeReader {
    pool: PgPool,
}

impl PgSystemModeReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SystemModeReader for PgSystemModeReader {
    async fn mode(&self, tenant_id: &str) -> Result<SystemMode, ModeError> {
        let mode: Option<String> =
            match sqlx::query_scalar("SELECT mode FROM tenant_system_modes WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await
            {
                Ok(mode) => mode,
                Err(e) if is_undefined_table(&e) => {
                    warn!("tenant_system_modes table missing; assuming production");
                    None
                }
                Err(e) => return Err(e.into()),
            };

        Ok(mode
            .map(|m| SystemMode::parse(&m))
            .unwrap_or(SystemMode::Production))
    }
}
