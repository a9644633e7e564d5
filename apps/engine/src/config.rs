use anyhow::{Context, Result};

use crate::guardrails::GuardrailsPreset;

/// Application configuration loaded from environment variables.
/// Every variable has a default; without `DATABASE_URL` the service runs on
/// in-memory collaborators, without `ANTHROPIC_API_KEY` polish is disabled.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub default_guardrails_preset: GuardrailsPreset,
    pub llm_polish_timeout_ms: u64,
    pub llm_max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            anthropic_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            default_guardrails_preset: GuardrailsPreset::Balanced,
            llm_polish_timeout_ms: 4000,
            llm_max_retries: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        let defaults = Config::default();

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            default_guardrails_preset: match optional_env("DEFAULT_GUARDRAILS_PRESET") {
                Some(name) => name
                    .parse()
                    .context("DEFAULT_GUARDRAILS_PRESET must be conservative, balanced, or aggressive")?,
                None => defaults.default_guardrails_preset,
            },
            llm_polish_timeout_ms: parse_env("LLM_POLISH_TIMEOUT_MS", defaults.llm_polish_timeout_ms)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", defaults.llm_max_retries)?,
        })
    }
}

/// Unset and blank both read as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_makes_single_llm_attempt() {
        let config = Config::default();
        assert_eq!(config.llm_max_retries, 1);
        assert_eq!(config.llm_polish_timeout_ms, 4000);
    }
}
