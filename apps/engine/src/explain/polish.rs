use std::time::Duration;

use tracing::{debug, warn};

use crate::guardrails::ExplainConfig;
use crate::llm_client::{LlmCaller, LlmError};
use crate::modes::SystemMode;

use super::engine::Explanation;
use super::prompts::polish_prompt;

pub const DEFAULT_POLISH_TIMEOUT: Duration = Duration::from_millis(4000);

pub struct PolishOptions<'a> {
    pub explain: ExplainConfig,
    pub mode: SystemMode,
    pub llm: Option<&'a dyn LlmCaller>,
    pub timeout: Duration,
}

impl<'a> PolishOptions<'a> {
    pub fn new(explain: ExplainConfig, mode: SystemMode) -> Self {
        Self {
            explain,
            mode,
            llm: None,
            timeout: DEFAULT_POLISH_TIMEOUT,
        }
    }

    pub fn with_llm(mut self, llm: &'a dyn LlmCaller) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Rewrites only the summary through the LLM. Any failure, timeout, or
/// empty completion returns the explanation unchanged.
pub async fn maybe_polish_explanation(
    explanation: Explanation,
    options: PolishOptions<'_>,
) -> Explanation {
    if !options.explain.include_weights {
        return explanation;
    }
    if options.mode.is_fire_drill() {
        debug!("Skipping explanation polish: tenant in fire drill");
        return explanation;
    }
    let Some(llm) = options.llm else {
        return explanation;
    };

    let prompt = polish_prompt(&explanation);
    let outcome = match tokio::time::timeout(options.timeout, llm.complete(&prompt)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(options.timeout.as_millis())),
    };

    match outcome {
        Ok(text) if !text.trim().is_empty() => Explanation {
            summary: text.trim().to_string(),
            ..explanation
        },
        Ok(_) => {
            warn!("Explanation polish returned empty text; keeping original summary");
            explanation
        }
        Err(e) => {
            warn!("Explanation polish failed, keeping original summary: {e}");
            explanation
        }
    }
}
