use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::normalize_requirements;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub rfp_text: Option<String>,
    pub rfp_s3_key: Option<String>,
    /// Stored as a JSON array; older rows may hold comma-separated text.
    pub requirements: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    pub fn requirement_list(&self) -> Vec<String> {
        normalize_requirements(&self.requirements)
    }
}
