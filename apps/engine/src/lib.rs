//! Candidate–job decision engine.
//!
//! Pipeline: `GuardrailsConfig → run_match → confidence → build_shortlist`,
//! with `build_explanation`/`build_justification` per candidate and a
//! telemetry-driven `GuardrailRecommendationEngine` alongside.

pub mod config;
pub mod confidence;
pub mod db;
pub mod errors;
pub mod explain;
pub mod guardrails;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod modes;
pub mod recommendations;
pub mod routes;
pub mod shortlist;
pub mod state;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::guardrails::{GuardrailsResolver, PgGuardrailsResolver, StaticGuardrailsResolver};
use crate::llm_client::{LlmCaller, LlmClient};
use crate::modes::{PgSystemModeReader, StaticSystemModeReader, SystemModeReader};
use crate::recommendations::{
    GuardrailRecommendationEngine, InMemoryRecommendationStore, InMemoryTelemetryReader,
    PgRecommendationStore, PgTelemetryReader, RecommendationStore, TelemetryReader,
};
use crate::state::AppState;

/// Wires collaborators: Postgres-backed when a pool is given, in-memory
/// otherwise.
pub fn build_state(config: Config, pool: Option<PgPool>) -> AppState {
    let (guardrails, modes, telemetry, store): (
        Arc<dyn GuardrailsResolver>,
        Arc<dyn SystemModeReader>,
        Arc<dyn TelemetryReader>,
        Arc<dyn RecommendationStore>,
    ) = match pool {
        Some(pool) => (
            Arc::new(PgGuardrailsResolver::new(
                pool.clone(),
                config.default_guardrails_preset,
            )),
            Arc::new(PgSystemModeReader::new(pool.clone())),
            Arc::new(PgTelemetryReader::new(pool.clone())),
            Arc::new(PgRecommendationStore::new(pool)),
        ),
        None => (
            Arc::new(StaticGuardrailsResolver::new(config.default_guardrails_preset)),
            Arc::new(StaticSystemModeReader::default()),
            Arc::new(InMemoryTelemetryReader::default()),
            Arc::new(InMemoryRecommendationStore::new()),
        ),
    };

    let llm: Option<Arc<dyn LlmCaller>> = config.anthropic_api_key.clone().map(|key| {
        Arc::new(LlmClient::new(key).with_max_retries(config.llm_max_retries)) as Arc<dyn LlmCaller>
    });

    let recommendations = Arc::new(GuardrailRecommendationEngine::new(
        telemetry,
        store,
        guardrails.clone(),
        modes.clone(),
    ));

    AppState {
        config,
        guardrails,
        modes,
        llm,
        recommendations,
    }
}
