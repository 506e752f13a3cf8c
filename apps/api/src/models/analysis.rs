use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub chemistry_score: i32,
    pub domain_coverage: i32,
    pub technical_coverage: i32,
    pub overall_score: i32,
    pub narrative_score: i32,
    pub narrative_source: String,
    pub recommendations: String,
    pub study_materials: String,
    pub visualization: Value,
    pub created_at: DateTime<Utc>,
}
