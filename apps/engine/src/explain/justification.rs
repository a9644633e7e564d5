use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceResult;
use crate::matching::MatchResult;
use crate::models::{Candidate, Job};

use super::engine::{Explanation, RISK_FILLER, STRENGTH_FILLERS};

const STRENGTH_COUNT: usize = 3;
const MAX_RISKS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Justification {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct JustificationInput<'a> {
    pub candidate: &'a Candidate,
    pub job: &'a Job,
    pub match_result: &'a MatchResult,
    pub confidence: Option<&'a ConfidenceResult>,
    pub explanation: &'a Explanation,
}

fn strength_bullets(explanation: &Explanation) -> Vec<String> {
    let mut bullets: Vec<String> = explanation
        .strengths
        .iter()
        .take(STRENGTH_COUNT)
        .cloned()
        .collect();
    for filler in STRENGTH_FILLERS {
        if bullets.len() >= STRENGTH_COUNT {
            break;
        }
        if !bullets.iter().any(|b| b == filler) {
            bullets.push(filler.to_string());
        }
    }
    bullets
}

fn risk_bullets(explanation: &Explanation) -> Vec<String> {
    let bullets: Vec<String> = explanation
        .risks
        .iter()
        .take(MAX_RISKS)
        .cloned()
        .collect();
    if bullets.is_empty() {
        vec![RISK_FILLER.to_string()]
    } else {
        bullets
    }
}

fn next_step(explanation: &Explanation, strengths: &[String]) -> String {
    let top_risk = explanation.risks.first().filter(|r| r.as_str() != RISK_FILLER);
    match (top_risk, strengths.first()) {
        (Some(risk), Some(strength)) => format!(
            "Schedule a screen to probe: {risk}. Lead with: {strength}."
        ),
        (Some(risk), None) => format!("Schedule a screen to probe: {risk}."),
        (None, Some(strength)) => {
            format!("Advance to the hiring manager, highlighting: {strength}.")
        }
        (None, None) => "Advance to the hiring manager.".to_string(),
    }
}

/// Composes the recruiter-facing recommendation for one candidate.
pub fn build_justification(input: &JustificationInput<'_>) -> Justification {
    let name = input.candidate.display_name();
    let title = input.job.display_title();
    let strengths = strength_bullets(input.explanation);
    let risks = risk_bullets(input.explanation);

    let subject = format!(
        "{name} for {title} (match score {})",
        input.match_result.score
    );

    let mut body = format!("{}\n", input.explanation.summary);
    if let Some(confidence) = input.confidence {
        body.push_str(&format!(
            "\nConfidence: {} ({}%)\n",
            confidence.band,
            (confidence.score * 100.0).round() as u32
        ));
    }
    body.push_str("\nStrengths:\n");
    for strength in &strengths {
        body.push_str(&format!("- {strength}\n"));
    }
    body.push_str("\nRisks:\n");
    for risk in &risks {
        body.push_str(&format!("- {risk}\n"));
    }
    body.push_str(&format!("\nNext step: {}", next_step(input.explanation, &strengths)));

    Justification { subject, body }
}
