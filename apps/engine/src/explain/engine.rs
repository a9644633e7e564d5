use serde::{Deserialize, Serialize};

use crate::confidence::{ConfidenceBand, ConfidenceResult, RiskFlag};
use crate::guardrails::{ExplainConfig, ExplainLevel, ScoringWeights};
use crate::matching::{skill_overlap, MatchResult};
use crate::models::{Candidate, Job};

/// Generic strengths used to reach a level's minimum, in order.
pub const STRENGTH_FILLERS: &[&str] = &[
    "Solid alignment with the role's core requirements",
    "Solid alignment with the team's working context",
    "Solid alignment on overall profile fit",
];

/// Used when a level requires at least one risk and none were found.
pub const RISK_FILLER: &str = "No material risks identified; verify details during screening";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ExplanationInput<'a> {
    pub job: &'a Job,
    pub candidate: &'a Candidate,
    pub match_result: &'a MatchResult,
    pub confidence: Option<&'a ConfidenceResult>,
    pub explain: ExplainConfig,
    /// Effective scoring weights, cited when `include_weights` is set.
    pub weights: Option<ScoringWeights>,
}

/// (min, max) strengths and (min, max) risks per level.
fn level_bounds(level: ExplainLevel) -> ((usize, usize), (usize, usize)) {
    match level {
        ExplainLevel::Compact => ((1, 2), (0, 1)),
        ExplainLevel::Standard => ((2, 4), (0, 2)),
        ExplainLevel::Detailed => ((3, 5), (1, 3)),
    }
}

fn percent(value: f64) -> u32 {
    (value * 100.0).round().clamp(0.0, 100.0) as u32
}

fn natural_strengths(input: &ExplanationInput<'_>) -> Vec<String> {
    let overlap = skill_overlap(input.job, input.candidate);
    let signals = &input.match_result.signals;
    let mut strengths = Vec::new();

    if !overlap.matched_must_have.is_empty() {
        let total = overlap.matched_must_have.len() + overlap.missing_must_have.len();
        strengths.push(format!(
            "Covers {}/{} must-have skills: {}",
            overlap.matched_must_have.len(),
            total,
            overlap.matched_must_have.join(", ")
        ));
    }
    if !overlap.matched_nice_to_have.is_empty() {
        strengths.push(format!(
            "Brings nice-to-have skills: {}",
            overlap.matched_nice_to_have.join(", ")
        ));
    }
    if let Some(years) = input.candidate.total_experience_years {
        if signals.experience_alignment >= 0.8 {
            strengths.push(format!("Experience fits the role ({years:.0} years)"));
        }
    }
    if signals.location_alignment >= 1.0 {
        strengths.push("Location matches the role".to_string());
    } else if signals.location_alignment >= 0.8 {
        strengths.push("Remote-compatible location".to_string());
    }
    if let Some(confidence) = input.confidence {
        if confidence.band == ConfidenceBand::High {
            strengths.push(format!(
                "High-confidence match ({}%)",
                percent(confidence.score)
            ));
        }
    }
    strengths
}

fn natural_risks(input: &ExplanationInput<'_>) -> Vec<String> {
    let overlap = skill_overlap(input.job, input.candidate);
    let signals = &input.match_result.signals;
    let mut risks = Vec::new();

    if !overlap.missing_must_have.is_empty() {
        risks.push(format!(
            "Missing must-have skills: {}",
            overlap.missing_must_have.join(", ")
        ));
    }
    match input.candidate.total_experience_years {
        None => risks.push("Experience not stated on profile".to_string()),
        Some(_) if signals.experience_alignment < 0.5 => risks.push(format!(
            "Experience outside the role's range ({}% alignment)",
            percent(signals.experience_alignment)
        )),
        Some(_) => {}
    }
    if signals.location_alignment <= 0.3 {
        risks.push("Location mismatch with the role".to_string());
    }
    if let Some(confidence) = input.confidence {
        if confidence.risk_flags.contains(&RiskFlag::StaleAtsSync) {
            risks.push("Profile data may be stale (ATS sync issue)".to_string());
        }
        if confidence.risk_flags.contains(&RiskFlag::ConflictingSignals) {
            risks.push("Skills and experience signals disagree".to_string());
        }
        if confidence.band == ConfidenceBand::Low {
            risks.push(format!("Low confidence in this match ({}%)", percent(confidence.score)));
        }
    }
    if !overlap.missing_nice_to_have.is_empty() {
        risks.push(format!(
            "Lacks nice-to-have skills: {}",
            overlap.missing_nice_to_have.join(", ")
        ));
    }
    risks
}

fn notes(input: &ExplanationInput<'_>) -> Option<Vec<String>> {
    let mut notes = Vec::new();

    if input.explain.include_weights {
        if let Some(w) = input.weights {
            notes.push(format!(
                "Scoring weights: must-have {}%, nice-to-have {}%, experience {}%, location {}%",
                percent(w.must_have_skills),
                percent(w.nice_to_have_skills),
                percent(w.experience),
                percent(w.location)
            ));
        }
    }
    if input.explain.level == ExplainLevel::Detailed {
        let signals = input
            .match_result
            .signals
            .named()
            .iter()
            .map(|(label, value)| format!("{label} {}%", percent(*value)))
            .collect::<Vec<_>>()
            .join(", ");
        notes.push(format!("Signals: {signals}"));
        if let Some(confidence) = input.confidence {
            notes.extend(confidence.reasons.iter().cloned());
        }
    }

    if notes.is_empty() {
        None
    } else {
        Some(notes)
    }
}

fn clamp_strengths(mut strengths: Vec<String>, (min, max): (usize, usize)) -> Vec<String> {
    strengths.truncate(max);
    let mut fillers = STRENGTH_FILLERS.iter();
    while strengths.len() < min {
        match fillers.next() {
            Some(filler) => strengths.push(filler.to_string()),
            None => break,
        }
    }
    strengths
}

fn clamp_risks(mut risks: Vec<String>, (min, max): (usize, usize)) -> Vec<String> {
    risks.truncate(max);
    if risks.len() < min {
        risks.push(RISK_FILLER.to_string());
    }
    risks
}

/// First strength, suffixed with the first risk when one exists.
pub fn build_summary(strengths: &[String], risks: &[String]) -> String {
    let lead = strengths
        .first()
        .map(String::as_str)
        .unwrap_or(STRENGTH_FILLERS[0]);
    match risks.first() {
        Some(risk) => format!("{lead}. Key risk: {risk}"),
        None => lead.to_string(),
    }
}

pub fn build_explanation(input: &ExplanationInput<'_>) -> Explanation {
    let (strength_bounds, risk_bounds) = level_bounds(input.explain.level);
    let risks = natural_risks(input);
    let strengths = clamp_strengths(natural_strengths(input), strength_bounds);
    // Summary cites a real risk only, never the filler.
    let summary = build_summary(&strengths, &risks);

    Explanation {
        summary,
        strengths,
        risks: clamp_risks(risks, risk_bounds),
        notes: notes(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::RecruiterAction;
    use crate::matching::MatchSignals;
    use crate::models::Skill;

    fn job() -> Job {
        Job {
            id: "job".to_string(),
            location: Some("Austin, TX".to_string()),
            min_experience_years: Some(3.0),
            skills: vec![
                Skill::required("React"),
                Skill::required("GraphQL"),
                Skill::new("TypeScript"),
            ],
            ..Job::default()
        }
    }

    fn candidate(skills: &[&str], years: Option<f64>) -> Candidate {
        Candidate {
            id: "cand".to_string(),
            location: Some("Austin, TX".to_string()),
            total_experience_years: years,
            skills: skills.iter().map(|s| Skill::new(*s)).collect(),
            ..Candidate::default()
        }
    }

    fn result(must: f64, nice: f64, exp: f64, loc: f64) -> MatchResult {
        MatchResult {
            candidate_id: "cand".to_string(),
            score: 80,
            signals: MatchSignals {
                must_have_skills_coverage: must,
                nice_to_have_skills_coverage: nice,
                experience_alignment: exp,
                location_alignment: loc,
            },
        }
    }

    fn explain(level: ExplainLevel, include_weights: bool) -> ExplainConfig {
        ExplainConfig {
            level,
            include_weights,
        }
    }

    #[test]
    fn test_compact_bounds() {
        let job = job();
        let candidate = candidate(&["react", "graphql", "typescript"], Some(6.0));
        let result = result(1.0, 1.0, 1.0, 1.0);
        let explanation = build_explanation(&ExplanationInput {
            job: &job,
            candidate: &candidate,
            match_result: &result,
            confidence: None,
            explain: explain(ExplainLevel::Compact, false),
            weights: None,
        });
        assert!((1..=2).contains(&explanation.strengths.len()));
        assert!(explanation.risks.len() <= 1);
        assert_eq!(explanation.summary, explanation.strengths[0]);
        assert!(explanation.notes.is_none());
    }

    #[test]
    fn test_detailed_pads_strengths_and_risks() {
        let job = Job {
            skills: vec![],
            location: None,
            ..job()
        };
        let candidate = Candidate {
            location: None,
            ..candidate(&[], Some(1.0))
        };
        let result = result(1.0, 1.0, 0.6, 0.5);
        let explanation = build_explanation(&ExplanationInput {
            job: &job,
            candidate: &candidate,
            match_result: &result,
            confidence: None,
            explain: explain(ExplainLevel::Detailed, false),
            weights: None,
        });
        assert_eq!(explanation.strengths.len(), 3);
        assert_eq!(explanation.strengths[0], STRENGTH_FILLERS[0]);
        assert_eq!(explanation.risks, vec![RISK_FILLER.to_string()]);
        assert_eq!(explanation.summary, STRENGTH_FILLERS[0]);
        let notes = explanation.notes.unwrap();
        assert!(notes[0].starts_with("Signals: must-have skills coverage 100%"));
    }

    #[test]
    fn test_summary_carries_key_risk() {
        let job = job();
        let candidate = candidate(&["react"], Some(6.0));
        let result = result(0.5, 0.0, 1.0, 1.0);
        let explanation = build_explanation(&ExplanationInput {
            job: &job,
            candidate: &candidate,
            match_result: &result,
            confidence: None,
            explain: explain(ExplainLevel::Standard, false),
            weights: None,
        });
        assert_eq!(explanation.strengths[0], "Covers 1/2 must-have skills: React");
        assert_eq!(explanation.risks[0], "Missing must-have skills: GraphQL");
        assert_eq!(
            explanation.summary,
            "Covers 1/2 must-have skills: React. Key risk: Missing must-have skills: GraphQL"
        );
    }

    #[test]
    fn test_confidence_feeds_strengths_and_risks() {
        let job = job();
        let candidate = candidate(&["react", "graphql"], Some(6.0));
        let result = result(1.0, 0.0, 1.0, 1.0);
        let confidence = ConfidenceResult {
            candidate_id: "cand".to_string(),
            band: ConfidenceBand::High,
            score: 0.9,
            reasons: vec!["Strong must-have skills coverage (100%)".to_string()],
            risk_flags: vec![RiskFlag::StaleAtsSync],
            recommended_action: Some(RecruiterAction::Review),
        };
        let explanation = build_explanation(&ExplanationInput {
            job: &job,
            candidate: &candidate,
            match_result: &result,
            confidence: Some(&confidence),
            explain: explain(ExplainLevel::Detailed, true),
            weights: Some(crate::guardrails::GuardrailsPreset::Balanced.weights()),
        });
        assert!(explanation
            .strengths
            .contains(&"High-confidence match (90%)".to_string()));
        assert!(explanation
            .risks
            .contains(&"Profile data may be stale (ATS sync issue)".to_string()));
        let notes = explanation.notes.unwrap();
        assert_eq!(
            notes[0],
            "Scoring weights: must-have 40%, nice-to-have 20%, experience 25%, location 15%"
        );
        assert!(notes.contains(&"Strong must-have skills coverage (100%)".to_string()));
    }
}
