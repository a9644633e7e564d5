// Shared prompt fragments for every LLM call the engine makes.
// Each module that calls the LLM defines its own prompts.rs alongside it.

/// System prompt fragment that enforces plain-text output.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a precise recruiting assistant. \
    Respond with plain text only. \
    Do NOT use markdown, bullet points, or code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction that keeps rewrites faithful to the structured input.
pub const FAITHFULNESS_INSTRUCTION: &str = "\
    CRITICAL: Only restate facts present in the input. Do NOT invent skills, \
    years of experience, employers, or locations. Do NOT soften or omit risks.";
