use std::sync::Arc;

use crate::config::Config;
use crate::guardrails::GuardrailsResolver;
use crate::llm_client::LlmCaller;
use crate::modes::SystemModeReader;
use crate::recommendations::GuardrailRecommendationEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub guardrails: Arc<dyn GuardrailsResolver>,
    pub modes: Arc<dyn SystemModeReader>,
    /// Absent when no API key is configured; explanations are then unpolished.
    pub llm: Option<Arc<dyn LlmCaller>>,
    pub recommendations: Arc<GuardrailRecommendationEngine>,
}
