//! Axum route handlers for projects, team members and RFP uploads.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::compatibility::Mbti;
use crate::analysis::topics::{extract_topics, requirements_for};
use crate::errors::AppError;
use crate::models::member::TeamMemberRow;
use crate::models::project::ProjectRow;
use crate::projects::rfp::{detect_format, extract_rfp_text, store_rfp_document};
use crate::projects::store::{self, NewMember, NewProject};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub rfp_text: Option<String>,
    /// Explicit requirements win over ones derived from `rfp_text`.
    pub requirements: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: ProjectRow,
    pub requirements: Vec<String>,
    pub topics: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    pub project: ProjectRow,
    pub requirements: Vec<String>,
    pub members: Vec<TeamMemberRow>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub mbti: Option<String>,
    pub skills_extracted: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RfpUploadResponse {
    pub project: ProjectRow,
    pub s3_key: String,
    pub text_extracted: bool,
    pub topics: Vec<&'static str>,
    pub requirements: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let rfp_text = non_blank(request.rfp_text.as_deref());
    let topics = rfp_text.map(extract_topics).unwrap_or_default();
    let requirements = resolve_requirements(request.requirements, rfp_text, &topics);

    let project = store::create_project(
        &state.db,
        NewProject {
            name,
            client_name: non_blank(request.client_name.as_deref()),
            description: non_blank(request.description.as_deref()),
            rfp_text,
            requirements: &requirements,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            project,
            requirements,
            topics,
        }),
    ))
}

/// GET /api/v1/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    Ok(Json(store::list_projects(&state.db).await?))
}

/// GET /api/v1/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectDetailResponse>, AppError> {
    let project = load_project(&state, project_id).await?;
    let members = store::list_members(&state.db, project_id).await?;
    Ok(Json(ProjectDetailResponse {
        requirements: project.requirement_list(),
        project,
        members,
    }))
}

/// POST /api/v1/projects/:id/members
pub async fn handle_add_member(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<TeamMemberRow>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let mbti = validate_mbti(request.mbti.as_deref())?;

    load_project(&state, project_id).await?;

    let member = store::add_member(
        &state.db,
        NewMember {
            project_id,
            name,
            role: request.role.trim(),
            mbti: mbti.as_ref().map(Mbti::as_str),
            skills_extracted: non_blank(request.skills_extracted.as_deref()),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /api/v1/projects/:id/members
pub async fn handle_list_members(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<TeamMemberRow>>, AppError> {
    load_project(&state, project_id).await?;
    Ok(Json(store::list_members(&state.db, project_id).await?))
}

/// POST /api/v1/projects/:id/rfp  (multipart, field `file`)
///
/// Stores the document, then re-derives requirements from whatever text could be
/// extracted. When nothing could be extracted the existing requirements are kept.
pub async fn handle_upload_rfp(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<RfpUploadResponse>, AppError> {
    let project = load_project(&state, project_id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("rfp").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((file_name, content_type, data));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let s3_key = store_rfp_document(
        &state.s3,
        &state.config.s3_bucket,
        project_id,
        &file_name,
        content_type.as_deref(),
        data.clone(),
    )
    .await
    .map_err(|e| AppError::Storage(e.to_string()))?;

    let format = detect_format(&file_name, content_type.as_deref());
    let text = extract_rfp_text(format, data).await;

    let (topics, requirements) = match text.as_deref() {
        Some(text) => {
            let topics = extract_topics(text);
            let requirements = requirements_for(&topics);
            (topics, requirements)
        }
        None => (vec![], project.requirement_list()),
    };

    info!(
        "RFP '{}' for project {}: {:?}, text_extracted={}, {} topics",
        file_name,
        project_id,
        format,
        text.is_some(),
        topics.len()
    );

    let project = store::update_project_rfp(
        &state.db,
        project_id,
        text.as_deref(),
        &s3_key,
        &requirements,
    )
    .await?;

    Ok(Json(RfpUploadResponse {
        project,
        s3_key,
        text_extracted: text.is_some(),
        topics,
        requirements,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) async fn load_project(state: &AppState, project_id: Uuid) -> Result<ProjectRow, AppError> {
    store::get_project(&state.db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Blank → no MBTI. Anything else must be one of the 16 types.
fn validate_mbti(raw: Option<&str>) -> Result<Option<Mbti>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(code) => Mbti::parse(code)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("'{code}' is not a valid MBTI type"))),
    }
}

/// Explicit list (trimmed, blanks and exact duplicates dropped) if non-empty; otherwise
/// derived from RFP topics; otherwise empty.
fn resolve_requirements(
    explicit: Option<Vec<String>>,
    rfp_text: Option<&str>,
    topics: &[&'static str],
) -> Vec<String> {
    if let Some(list) = explicit {
        let mut out: Vec<String> = Vec::new();
        for item in list {
            let item = item.trim();
            if !item.is_empty() && !out.iter().any(|r| r == item) {
                out.push(item.to_string());
            }
        }
        if !out.is_empty() {
            return out;
        }
    }
    match rfp_text {
        Some(_) => requirements_for(topics),
        None => vec![],
    }
}
