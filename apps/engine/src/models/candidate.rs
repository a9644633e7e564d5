use serde::{Deserialize, Serialize};

use crate::models::job::Skill;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub total_experience_years: Option<f64>,
    #[serde(default)]
    pub seniority_level: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Candidate {
    /// Display name, falling back to the candidate id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}
