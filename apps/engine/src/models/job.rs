use serde::{Deserialize, Serialize};

/// A skill as declared on a job or a candidate profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub normalized_name: Option<String>,
    /// `true` marks a must-have on a job. Ignored on candidate skills.
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Skill {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            normalized_name: None,
            required: None,
            weight: None,
        }
    }

    pub fn required(name: impl Into<String>) -> Self {
        Self {
            required: Some(true),
            ..Self::new(name)
        }
    }

    /// Identity used for every skill comparison: lower-cased, trimmed
    /// `normalized_name`, falling back to `name`.
    pub fn key(&self) -> String {
        self.normalized_name
            .as_deref()
            .unwrap_or(&self.name)
            .trim()
            .to_lowercase()
    }

    pub fn is_must_have(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub seniority_level: Option<String>,
    #[serde(default)]
    pub min_experience_years: Option<f64>,
    #[serde(default)]
    pub max_experience_years: Option<f64>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Job {
    /// Display title, falling back to the job id.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.id)
    }
}
