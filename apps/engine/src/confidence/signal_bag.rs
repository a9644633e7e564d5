//! Signal-bag confidence: classification over an arbitrary set of named
//! signals, for callers that have no job/candidate context.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::confidence::narration::{narrate, NamedSignal};
use crate::confidence::{
    classify, normalize_score, ConfidenceResult, ConfidenceVariant, RiskFlag,
};
use crate::guardrails::ConfidenceBands;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalBagInput {
    pub candidate_id: String,
    /// Overall score (0–1 or 0–100). When absent the mean of the signals is used.
    #[serde(default)]
    pub score: Option<f64>,
    /// Named signals, each 0–1 or 0–100.
    #[serde(default)]
    pub signals: BTreeMap<String, f64>,
    #[serde(default)]
    pub missing_must_have: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalBagOptions {
    pub bands: ConfidenceBands,
    pub narrate: bool,
}

impl Default for SignalBagOptions {
    fn default() -> Self {
        Self {
            bands: ConfidenceVariant::SignalBag.default_bands(),
            narrate: true,
        }
    }
}

/// `mustHaveCoverage` / `must_have_coverage` → "must have coverage".
fn humanize(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    let mut previous_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !label.ends_with(' ') && !label.is_empty() {
                label.push(' ');
            }
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower {
            label.push(' ');
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        label.extend(ch.to_lowercase());
    }
    label.trim().to_string()
}

pub fn classify_signal_bag(input: &SignalBagInput, options: &SignalBagOptions) -> ConfidenceResult {
    let signals: Vec<NamedSignal> = input
        .signals
        .iter()
        .filter(|(_, value)| value.is_finite())
        .map(|(key, value)| NamedSignal::new(key.clone(), humanize(key), normalize_score(*value)))
        .collect();

    let score = match input.score.filter(|s| s.is_finite()) {
        Some(score) => normalize_score(score),
        None if signals.is_empty() => 0.0,
        None => signals.iter().map(|s| s.value).sum::<f64>() / signals.len() as f64,
    };
    let band = classify(score, options.bands);

    let (reasons, risk_flags) = if options.narrate {
        let flags = if input.missing_must_have.is_empty() {
            Vec::new()
        } else {
            vec![RiskFlag::MissingData]
        };
        (narrate(band, &signals, &input.missing_must_have), flags)
    } else {
        (Vec::new(), Vec::new())
    };

    ConfidenceResult {
        candidate_id: input.candidate_id.clone(),
        band,
        score,
        reasons,
        risk_flags,
        recommended_action: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::ConfidenceBand;

    fn bag(entries: &[(&str, f64)]) -> SignalBagInput {
        SignalBagInput {
            candidate_id: "cand".to_string(),
            score: None,
            signals: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            missing_must_have: Vec::new(),
        }
    }

    #[test]
    fn test_humanize_keys() {
        assert_eq!(humanize("mustHaveCoverage"), "must have coverage");
        assert_eq!(humanize("experience_alignment"), "experience alignment");
        assert_eq!(humanize("ATS"), "ats");
    }

    #[test]
    fn test_medium_cutoff_is_sixty() {
        let options = SignalBagOptions::default();
        let mut input = bag(&[("skills", 0.9)]);
        input.score = Some(0.59);
        assert_eq!(classify_signal_bag(&input, &options).band, ConfidenceBand::Low);
        input.score = Some(60.0);
        assert_eq!(classify_signal_bag(&input, &options).band, ConfidenceBand::Medium);
    }

    #[test]
    fn test_mixed_scales_are_normalized() {
        let result = classify_signal_bag(
            &bag(&[("mustHaveCoverage", 90.0), ("recency", 0.7)]),
            &SignalBagOptions::default(),
        );
        assert!((result.score - 0.8).abs() < 1e-9);
        assert_eq!(result.band, ConfidenceBand::High);
        assert_eq!(result.reasons[0], "Strong must have coverage (90%)");
    }

    #[test]
    fn test_empty_bag_still_explains() {
        let result = classify_signal_bag(&bag(&[]), &SignalBagOptions::default());
        assert_eq!(result.band, ConfidenceBand::Low);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].starts_with("LOW"));
    }

    #[test]
    fn test_narration_off_keeps_band() {
        let mut input = bag(&[("skills", 0.95)]);
        input.missing_must_have = vec!["Rust".to_string()];
        let options = SignalBagOptions {
            narrate: false,
            ..SignalBagOptions::default()
        };
        let result = classify_signal_bag(&input, &options);
        assert_eq!(result.band, ConfidenceBand::High);
        assert!(result.reasons.is_empty());
        assert!(result.risk_flags.is_empty());
    }
}
