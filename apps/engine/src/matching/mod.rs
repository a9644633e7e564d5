//! Match Engine — per-candidate signals and a 0–100 score, gated by guardrails.
//!
//! Pure and synchronous: no I/O, safe to call from any task.

pub mod engine;
pub mod handlers;
pub mod signals;

pub use engine::{run_match, score_candidate, MatchInput, MatchResult};
pub use signals::{skill_overlap, MatchSignals, SkillOverlap};
