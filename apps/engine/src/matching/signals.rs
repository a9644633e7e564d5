use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Candidate, Job};

/// Neutral value for a signal whose inputs are unknown.
pub const NEUTRAL_SIGNAL: f64 = 0.5;

const REMOTE_ALIGNMENT: f64 = 0.8;
const SHARED_REGION_ALIGNMENT: f64 = 0.7;
const LOCATION_MISMATCH: f64 = 0.3;

/// Raw match signals, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchSignals {
    pub must_have_skills_coverage: f64,
    pub nice_to_have_skills_coverage: f64,
    pub experience_alignment: f64,
    pub location_alignment: f64,
}

impl MatchSignals {
    /// Signals paired with their human-readable labels, in a fixed order.
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("must-have skills coverage", self.must_have_skills_coverage),
            ("nice-to-have skills coverage", self.nice_to_have_skills_coverage),
            ("experience alignment", self.experience_alignment),
            ("location alignment", self.location_alignment),
        ]
    }

    pub fn values(&self) -> [f64; 4] {
        [
            self.must_have_skills_coverage,
            self.nice_to_have_skills_coverage,
            self.experience_alignment,
            self.location_alignment,
        ]
    }
}

/// Which of the job's skills the candidate covers, by display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillOverlap {
    pub matched_must_have: Vec<String>,
    pub missing_must_have: Vec<String>,
    pub matched_nice_to_have: Vec<String>,
    pub missing_nice_to_have: Vec<String>,
}

pub fn candidate_skill_set(candidate: &Candidate) -> HashSet<String> {
    candidate
        .skills
        .iter()
        .map(|s| s.key())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Splits job skills into must-have and nice-to-have keys, de-duplicated
/// in declaration order.
fn job_targets(job: &Job) -> (Vec<(String, String)>, Vec<(String, String)>) {
    let mut seen = HashSet::new();
    let mut must_have = Vec::new();
    let mut nice_to_have = Vec::new();
    for skill in &job.skills {
        let key = skill.key();
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        let entry = (key, skill.name.trim().to_string());
        if skill.is_must_have() {
            must_have.push(entry);
        } else {
            nice_to_have.push(entry);
        }
    }
    (must_have, nice_to_have)
}

/// Matched / total. An empty target list is vacuously covered.
fn coverage(targets: &[(String, String)], skills: &HashSet<String>) -> f64 {
    if targets.is_empty() {
        return 1.0;
    }
    let matched = targets.iter().filter(|(key, _)| skills.contains(key)).count();
    matched as f64 / targets.len() as f64
}

pub fn skill_overlap(job: &Job, candidate: &Candidate) -> SkillOverlap {
    let skills = candidate_skill_set(candidate);
    let (must_have, nice_to_have) = job_targets(job);
    let mut overlap = SkillOverlap::default();

    for (key, name) in must_have {
        if skills.contains(&key) {
            overlap.matched_must_have.push(name);
        } else {
            overlap.missing_must_have.push(name);
        }
    }
    for (key, name) in nice_to_have {
        if skills.contains(&key) {
            overlap.matched_nice_to_have.push(name);
        } else {
            overlap.missing_nice_to_have.push(name);
        }
    }
    overlap
}

pub fn experience_alignment(job: &Job, candidate: &Candidate) -> f64 {
    let Some(years) = candidate.total_experience_years.filter(|y| y.is_finite()) else {
        return NEUTRAL_SIGNAL;
    };
    let years = years.max(0.0);
    let min = job.min_experience_years.filter(|y| y.is_finite());
    let max = job.max_experience_years.filter(|y| y.is_finite());

    let alignment = match (min, max) {
        (None, None) => 1.0,
        (Some(min), _) if years < min => years / min.max(1.0),
        (_, Some(max)) if years > max => max / years.max(1.0),
        _ => 1.0,
    };
    alignment.clamp(0.0, 1.0)
}

fn region_tokens(location: &str) -> HashSet<String> {
    location
        .split([',', '-'])
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn location_alignment(job_location: Option<&str>, candidate_location: Option<&str>) -> f64 {
    let job = job_location.map(str::trim).filter(|l| !l.is_empty());
    let candidate = candidate_location.map(str::trim).filter(|l| !l.is_empty());
    let (Some(job), Some(candidate)) = (job, candidate) else {
        return NEUTRAL_SIGNAL;
    };

    let job_lower = job.to_lowercase();
    let candidate_lower = candidate.to_lowercase();
    if job_lower == candidate_lower {
        return 1.0;
    }
    if job_lower.contains("remote") || candidate_lower.contains("remote") {
        return REMOTE_ALIGNMENT;
    }
    let job_tokens = region_tokens(&job_lower);
    if region_tokens(&candidate_lower)
        .iter()
        .any(|t| job_tokens.contains(t))
    {
        return SHARED_REGION_ALIGNMENT;
    }
    LOCATION_MISMATCH
}

pub fn compute_signals(job: &Job, candidate: &Candidate) -> MatchSignals {
    let skills = candidate_skill_set(candidate);
    let (must_have, nice_to_have) = job_targets(job);
    MatchSignals {
        must_have_skills_coverage: coverage(&must_have, &skills),
        nice_to_have_skills_coverage: coverage(&nice_to_have, &skills),
        experience_alignment: experience_alignment(job, candidate),
        location_alignment: location_alignment(
            job.location.as_deref(),
            candidate.location.as_deref(),
        ),
    }
}
