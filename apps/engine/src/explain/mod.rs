//! Explain — recruiter-facing explanations and justifications.
//!
//! The structured parts (strengths, risks, notes, summary) are pure. Only
//! `maybe_polish_explanation` touches the LLM, and only best-effort.

pub mod engine;
pub mod handlers;
pub mod justification;
pub mod polish;
pub mod prompts;

pub use engine::{build_explanation, build_summary, Explanation, ExplanationInput};
pub use justification::{build_justification, Justification, JustificationInput};
pub use polish::{maybe_polish_explanation, PolishOptions};
