//! Shortlist Engine — bounds scored, classified matches to a final list of ids.
//!
//! Strategies:
//! - `quality`: score desc, ties broken by band (HIGH > MEDIUM > LOW)
//! - `fast`: score desc only
//! - `strict`: HIGH band only, quality order; may return fewer than the cap
//! - `diversity`: quality order, skipping near-duplicate profiles

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confidence::{ConfidenceBand, ConfidenceResult};
use crate::guardrails::{GuardrailsConfig, ShortlistStrategy};
use crate::matching::{MatchResult, MatchSignals};

/// Scores within this many points may be near-duplicates.
const DUPLICATE_SCORE_TOLERANCE: f64 = 1.0;
/// Every signal must be within this distance for a near-duplicate.
const DUPLICATE_SIGNAL_TOLERANCE: f64 = 0.05;

/// A match annotated with its confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistCandidate {
    pub candidate_id: String,
    /// 0 – 100
    pub score: f64,
    pub confidence_band: ConfidenceBand,
    pub signals: MatchSignals,
}

impl ShortlistCandidate {
    pub fn from_match(result: &MatchResult, band: ConfidenceBand) -> Self {
        Self {
            candidate_id: result.candidate_id.clone(),
            score: f64::from(result.score),
            confidence_band: band,
            signals: result.signals,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShortlistInput<'a> {
    pub matches: &'a [ShortlistCandidate],
    pub config: &'a GuardrailsConfig,
    pub strategy: Option<ShortlistStrategy>,
}

/// Joins matches with their confidence results by candidate id. Matches with
/// no confidence result are treated as LOW.
pub fn annotate(matches: &[MatchResult], confidence: &[ConfidenceResult]) -> Vec<ShortlistCandidate> {
    matches
        .iter()
        .map(|m| {
            let band = confidence
                .iter()
                .find(|c| c.candidate_id == m.candidate_id)
                .map(|c| c.band)
                .unwrap_or(ConfidenceBand::Low);
            ShortlistCandidate::from_match(m, band)
        })
        .collect()
}

fn by_score(a: &ShortlistCandidate, b: &ShortlistCandidate) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}

fn by_quality(a: &ShortlistCandidate, b: &ShortlistCandidate) -> Ordering {
    by_score(a, b).then_with(|| b.confidence_band.rank().cmp(&a.confidence_band.rank()))
}

fn near_duplicate(a: &ShortlistCandidate, b: &ShortlistCandidate) -> bool {
    (a.score - b.score).abs() <= DUPLICATE_SCORE_TOLERANCE
        && a.signals
            .values()
            .iter()
            .zip(b.signals.values())
            .all(|(x, y)| (x - y).abs() <= DUPLICATE_SIGNAL_TOLERANCE)
}

fn select_diverse(ranked: Vec<&ShortlistCandidate>, cap: usize) -> Vec<&ShortlistCandidate> {
    let mut selected: Vec<&ShortlistCandidate> = Vec::with_capacity(cap);
    for candidate in ranked {
        if selected.len() >= cap {
            break;
        }
        if selected.iter().any(|kept| near_duplicate(kept, candidate)) {
            debug!("Skipping near-duplicate profile {}", candidate.candidate_id);
            continue;
        }
        selected.push(candidate);
    }
    selected
}

/// Selects at most `shortlistMaxCandidates` ids. Never fails: nothing eligible
/// or a zero cap yields an empty list.
pub fn build_shortlist(input: &ShortlistInput<'_>) -> Vec<String> {
    let strategy = input
        .strategy
        .unwrap_or_else(|| input.config.shortlist_strategy());
    let min_score = input.config.shortlist_min_score();
    let cap = input.config.shortlist_max_candidates() as usize;

    let mut eligible: Vec<&ShortlistCandidate> = input
        .matches
        .iter()
        .filter(|m| m.score.is_finite() && m.score >= min_score)
        .collect();

    if eligible.is_empty() || cap == 0 {
        return Vec::new();
    }

    let selected = match strategy {
        ShortlistStrategy::Quality => {
            eligible.sort_by(|a, b| by_quality(a, b));
            eligible.into_iter().take(cap).collect::<Vec<_>>()
        }
        ShortlistStrategy::Fast => {
            eligible.sort_by(|a, b| by_score(a, b));
            eligible.into_iter().take(cap).collect()
        }
        ShortlistStrategy::Strict => {
            let match_threshold = input.config.min_match_score();
            eligible.retain(|m| {
                m.confidence_band == ConfidenceBand::High && m.score >= match_threshold
            });
            eligible.sort_by(|a, b| by_quality(a, b));
            eligible.into_iter().take(cap).collect()
        }
        ShortlistStrategy::Diversity => {
            eligible.sort_by(|a, b| by_quality(a, b));
            select_diverse(eligible, cap)
        }
    };

    debug!(
        "Shortlist ({strategy:?}): {} of {} matches, cap {cap}, min score {min_score}",
        selected.len(),
        input.matches.len()
    );

    selected.into_iter().map(|m| m.candidate_id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guardrails::GuardrailsPreset;

    fn config(min: f64, shortlist_min: Option<f64>, cap: u32) -> GuardrailsConfig {
        let mut config = GuardrailsPreset::Balanced.config();
        config.scoring.thresholds.min_match_score = min;
        config.scoring.thresholds.shortlist_min_score = shortlist_min;
        config.scoring.thresholds.shortlist_max_candidates = Some(cap);
        config
    }

    fn candidate(id: &str, score: f64, band: ConfidenceBand, base: f64) -> ShortlistCandidate {
        ShortlistCandidate {
            candidate_id: id.to_string(),
            score,
            confidence_band: band,
            signals: MatchSignals {
                must_have_skills_coverage: base,
                nice_to_have_skills_coverage: base,
                experience_alignment: base,
                location_alignment: base,
            },
        }
    }

    fn pool() -> Vec<ShortlistCandidate> {
        vec![
            candidate("m80", 80.0, ConfidenceBand::Medium, 0.6),
            candidate("h80", 80.0, ConfidenceBand::High, 0.7),
            candidate("h90", 90.0, ConfidenceBand::High, 0.9),
            candidate("l50", 50.0, ConfidenceBand::Low, 0.3),
            candidate("l70", 70.0, ConfidenceBand::Low, 0.5),
        ]
    }

    fn run(
        matches: &[ShortlistCandidate],
        config: &GuardrailsConfig,
        strategy: ShortlistStrategy,
    ) -> Vec<String> {
        build_shortlist(&ShortlistInput {
            matches,
            config,
            strategy: Some(strategy),
        })
    }

    #[test]
    fn test_quality_breaks_ties_by_band() {
        let ids = run(&pool(), &config(60.0, None, 3), ShortlistStrategy::Quality);
        assert_eq!(ids, vec!["h90", "h80", "m80"]);
    }

    #[test]
    fn test_fast_ignores_band() {
        let ids = run(&pool(), &config(60.0, None, 3), ShortlistStrategy::Fast);
        assert_eq!(ids, vec!["h90", "m80", "h80"]);
    }

    #[test]
    fn test_min_score_is_stricter_of_two_thresholds() {
        let ids = run(&pool(), &config(0.6, Some(75.0), 10), ShortlistStrategy::Quality);
        assert_eq!(ids, vec!["h90", "h80", "m80"]);
    }

    #[test]
    fn test_strict_returns_only_high_band() {
        let ids = run(&pool(), &config(60.0, None, 10), ShortlistStrategy::Strict);
        assert_eq!(ids, vec!["h90", "h80"]);

        let only_medium = vec![candidate("m", 95.0, ConfidenceBand::Medium, 0.9)];
        assert!(run(&only_medium, &config(60.0, None, 10), ShortlistStrategy::Strict).is_empty());
    }

    #[test]
    fn test_diversity_skips_near_duplicates() {
        let matches = vec![
            candidate("a", 90.0, ConfidenceBand::High, 0.90),
            candidate("a-twin", 89.5, ConfidenceBand::High, 0.92),
            candidate("b", 89.0, ConfidenceBand::High, 0.70),
            candidate("c", 85.0, ConfidenceBand::Medium, 0.88),
        ];
        let ids = run(&matches, &config(60.0, None, 3), ShortlistStrategy::Diversity);
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diversity_never_selects_near_duplicate_pairs() {
        let matches: Vec<ShortlistCandidate> = (0..20)
            .map(|i| {
                candidate(
                    &format!("c{i}"),
                    90.0 - (i as f64) * 0.3,
                    ConfidenceBand::High,
                    0.9 - (i as f64) * 0.01,
                )
            })
            .collect();
        let ids = run(&matches, &config(0.0, None, 10), ShortlistStrategy::Diversity);
        let chosen: Vec<&ShortlistCandidate> = matches
            .iter()
            .filter(|m| ids.contains(&m.candidate_id))
            .collect();
        for (i, a) in chosen.iter().enumerate() {
            for b in &chosen[i + 1..] {
                let close_score = (a.score - b.score).abs() < 1.0;
                let close_signals = a
                    .signals
                    .values()
                    .iter()
                    .zip(b.signals.values())
                    .all(|(x, y)| (x - y).abs() <= 0.05);
                assert!(!(close_score && close_signals), "{} ~ {}", a.candidate_id, b.candidate_id);
            }
        }
    }

    #[test]
    fn test_cap_respected_and_zero_cap_is_empty() {
        for strategy in [
            ShortlistStrategy::Quality,
            ShortlistStrategy::Fast,
            ShortlistStrategy::Strict,
            ShortlistStrategy::Diversity,
        ] {
            assert!(run(&pool(), &config(0.0, None, 2), strategy).len() <= 2);
            assert!(run(&pool(), &config(0.0, None, 0), strategy).is_empty());
        }
    }

    #[test]
    fn test_nothing_eligible_is_empty() {
        assert!(run(&pool(), &config(95.0, None, 5), ShortlistStrategy::Quality).is_empty());
        assert!(run(&[], &config(0.0, None, 5), ShortlistStrategy::Quality).is_empty());
    }

    #[test]
    fn test_strategy_defaults_to_config() {
        let mut config = config(60.0, None, 3);
        config.shortlist = Some(crate::guardrails::ShortlistConfig {
            strategy: ShortlistStrategy::Strict,
            max_candidates: 3,
        });
        let ids = build_shortlist(&ShortlistInput {
            matches: &pool(),
            config: &config,
            strategy: None,
        });
        assert_eq!(ids, vec!["h90", "h80"]);
    }
}
