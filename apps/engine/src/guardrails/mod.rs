//! Guardrails — the tenant-resolved configuration every engine consumes.
//!
//! A tenant's `GuardrailsConfig` is a named preset merged field-by-field with
//! the tenant's JSON overrides. Resolution goes through `GuardrailsResolver`
//! so engines never touch storage directly.

pub mod config;
pub mod handlers;
pub mod overrides;
pub mod presets;
pub mod resolver;

pub use config::{
    normalize_threshold, ConfidenceBands, ExplainConfig, ExplainLevel, GuardrailsConfig,
    SafetyConfig, ScoringConfig, ScoringStrategy, ScoringThresholds, ScoringWeights,
    ShortlistConfig, ShortlistStrategy,
};
pub use overrides::GuardrailsOverride;
pub use presets::GuardrailsPreset;
pub use resolver::{
    GuardrailsError, GuardrailsResolver, PgGuardrailsResolver, StaticGuardrailsResolver,
};
