//! Human-readable reasons for a confidence band.

use crate::confidence::ConfidenceBand;

/// How many supporting signals a HIGH band cites.
const HIGH_BAND_CITATIONS: usize = 2;

/// A signal prepared for narration. `value` is already normalized to 0–1.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSignal {
    pub key: String,
    pub label: String,
    pub value: f64,
}

impl NamedSignal {
    pub fn new(key: impl Into<String>, label: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value,
        }
    }

    fn is_must_have_coverage(&self) -> bool {
        self.key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase()
            .contains("musthave")
    }
}

fn percent(value: f64) -> u32 {
    (value * 100.0).round().clamp(0.0, 100.0) as u32
}

fn missing_line(missing: &[String]) -> String {
    format!("Missing must-have skills: {}", missing.join(", "))
}

/// Builds the reasons list for `band`. Never empty.
pub fn narrate(band: ConfidenceBand, signals: &[NamedSignal], missing: &[String]) -> Vec<String> {
    if signals.is_empty() {
        return vec![format!(
            "{band} confidence assigned from the overall score; no individual signals were available"
        )];
    }

    match band {
        ConfidenceBand::High => {
            let mut strongest: Vec<&NamedSignal> = signals.iter().collect();
            strongest.sort_by(|a, b| {
                b.value
                    .partial_cmp(&a.value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            strongest
                .into_iter()
                .take(HIGH_BAND_CITATIONS)
                .map(|s| format!("Strong {} ({}%)", s.label, percent(s.value)))
                .collect()
        }
        ConfidenceBand::Medium => {
            let mut reasons = Vec::new();
            let weakest = signals.iter().fold(None::<&NamedSignal>, |acc, s| match acc {
                Some(current) if current.value <= s.value => Some(current),
                _ => Some(s),
            });
            if let Some(weakest) = weakest {
                reasons.push(format!(
                    "Weakest signal: {} ({}%)",
                    weakest.label,
                    percent(weakest.value)
                ));
            }
            if !missing.is_empty() {
                reasons.push(missing_line(missing));
            }
            reasons
        }
        ConfidenceBand::Low => {
            if !missing.is_empty() {
                return vec![missing_line(missing)];
            }
            match signals.iter().find(|s| s.is_must_have_coverage()) {
                Some(coverage) => vec![format!(
                    "Must-have skills coverage at {}%",
                    percent(coverage.value)
                )],
                None => vec!["Insufficient evidence to support this match".to_string()],
            }
        }
    }
}
