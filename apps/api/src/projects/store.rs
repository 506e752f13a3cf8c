//! Project and team-member persistence.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::member::TeamMemberRow;
use crate::models::project::ProjectRow;

pub struct NewProject<'a> {
    pub name: &'a str,
    pub client_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub rfp_text: Option<&'a str>,
    pub requirements: &'a [String],
}

pub struct NewMember<'a> {
    pub project_id: Uuid,
    pub name: &'a str,
    pub role: &'a str,
    /// Already validated and upper-cased by the caller.
    pub mbti: Option<&'a str>,
    pub skills_extracted: Option<&'a str>,
}

pub async fn create_project(pool: &PgPool, project: NewProject<'_>) -> Result<ProjectRow> {
    let requirements_json = serde_json::to_string(project.requirements)?;

    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects (name, client_name, description, rfp_text, requirements)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(project.name)
    .bind(project.client_name)
    .bind(project.description)
    .bind(project.rfp_text)
    .bind(&requirements_json)
    .fetch_one(pool)
    .await?;

    info!(
        "Created project {} with {} requirements",
        row.id,
        project.requirements.len()
    );
    Ok(row)
}

pub async fn list_projects(pool: &PgPool) -> Result<Vec<ProjectRow>> {
    Ok(
        sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_project(pool: &PgPool, project_id: Uuid) -> Result<Option<ProjectRow>> {
    Ok(
        sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Replaces the project's RFP text, storage key and derived requirements.
pub async fn update_project_rfp(
    pool: &PgPool,
    project_id: Uuid,
    rfp_text: Option<&str>,
    rfp_s3_key: &str,
    requirements: &[String],
) -> Result<ProjectRow> {
    let requirements_json = serde_json::to_string(requirements)?;

    Ok(sqlx::query_as::<_, ProjectRow>(
        r#"
        UPDATE projects
        SET rfp_text = COALESCE($2, rfp_text),
            rfp_s3_key = $3,
            requirements = $4,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(rfp_text)
    .bind(rfp_s3_key)
    .bind(&requirements_json)
    .fetch_one(pool)
    .await?)
}

pub async fn add_member(pool: &PgPool, member: NewMember<'_>) -> Result<TeamMemberRow> {
    let row = sqlx::query_as::<_, TeamMemberRow>(
        r#"
        INSERT INTO team_members (project_id, name, role, mbti, skills_extracted)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(member.project_id)
    .bind(member.name)
    .bind(member.role)
    .bind(member.mbti)
    .bind(member.skills_extracted)
    .fetch_one(pool)
    .await?;

    info!("Added team member {} to project {}", row.id, row.project_id);
    Ok(row)
}

pub async fn list_members(pool: &PgPool, project_id: Uuid) -> Result<Vec<TeamMemberRow>> {
    Ok(sqlx::query_as::<_, TeamMemberRow>(
        "SELECT * FROM team_members WHERE project_id = $1 ORDER BY created_at, id",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?)
}
