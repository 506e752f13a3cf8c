// Team-fit analysis: MBTI chemistry, requirement coverage, narrative, chart data.
// The scoring modules are pure; LLM access goes through llm_client via narrative.rs only.

pub mod chemistry;
pub mod compatibility;
pub mod coverage;
pub mod engine;
pub mod filler;
pub mod handlers;
pub mod narrative;
pub mod pipeline;
pub mod prompts;
pub mod store;
pub mod topics;
pub mod visualization;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::member::TeamMemberRow;

/// The read-only view of a team member the scoring engine works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub mbti: Option<String>,
    /// Comma-separated skill tokens.
    #[serde(default)]
    pub skills_extracted: Option<String>,
}

impl MemberProfile {
    pub fn new(name: &str, role: &str, mbti: Option<&str>, skills: Option<&str>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            role: role.to_string(),
            mbti: mbti.map(str::to_string),
            skills_extracted: skills.map(str::to_string),
        }
    }

    /// The MBTI code if one is present (non-blank). Not validated here.
    pub fn mbti_code(&self) -> Option<&str> {
        self.mbti.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl From<&TeamMemberRow> for MemberProfile {
    fn from(row: &TeamMemberRow) -> Self {
        Self {
            id: Some(row.id),
            name: row.name.clone(),
            role: row.role.clone(),
            mbti: row.mbti.clone(),
            skills_extracted: row.skills_extracted.clone(),
        }
    }
}

/// Turns a stored requirement list into phrases. Accepts a JSON string array or
/// comma/newline separated text; blanks are dropped.
pub fn normalize_requirements(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return vec![];
    }

    if let Ok(items) = serde_json::from_str::<Vec<String>>(raw) {
        return items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
