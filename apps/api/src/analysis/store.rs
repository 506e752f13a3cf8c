//! Analysis history. Append-only: every run inserts a new row, nothing is updated.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::engine::AnalysisResult;
use crate::models::analysis::AnalysisRow;

pub async fn insert_analysis(
    pool: &PgPool,
    project_id: Uuid,
    result: &AnalysisResult,
) -> Result<AnalysisRow> {
    let visualization = serde_json::to_value(&result.visualization)
        .context("Failed to serialize visualization payload")?;

    Ok(sqlx::query_as::<_, AnalysisRow>(
        r#"
        INSERT INTO analyses
            (project_id, chemistry_score, domain_coverage, technical_coverage,
             overall_score, narrative_score, narrative_source,
             recommendations, study_materials, visualization)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(result.chemistry_score as i32)
    .bind(result.domain_coverage as i32)
    .bind(result.technical_coverage as i32)
    .bind(result.overall_score as i32)
    .bind(result.narrative_score as i32)
    .bind(result.narrative_source.as_str())
    .bind(&result.recommendations)
    .bind(&result.study_materials)
    .bind(&visualization)
    .fetch_one(pool)
    .await?)
}

/// All analyses for a project, newest first.
pub async fn list_analyses(pool: &PgPool, project_id: Uuid) -> Result<Vec<AnalysisRow>> {
    Ok(sqlx::query_as::<_, AnalysisRow>(
        "SELECT * FROM analyses WHERE project_id = $1 ORDER BY created_at DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?)
}
