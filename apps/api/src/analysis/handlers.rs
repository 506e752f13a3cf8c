//! Axum route handlers for running and listing team-fit analyses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::engine::AnalysisResult;
use crate::analysis::filler::{FillerSource, SeededFiller, ThreadFiller};
use crate::analysis::pipeline::{run_team_analysis, AnalysisRequest};
use crate::analysis::store::{insert_analysis, list_analyses};
use crate::analysis::topics::requirements_from_text;
use crate::analysis::MemberProfile;
use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;
use crate::projects::handlers::load_project;
use crate::projects::store::list_members;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// Ad-hoc analysis without a stored project.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub project_name: Option<String>,
    /// Used as-is when present and non-empty.
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    /// Requirements are derived from this when `requirements` is absent.
    #[serde(default)]
    pub rfp_text: Option<String>,
    pub members: Vec<MemberProfile>,
    /// Fixes the filler values (technical offset, chart fillers) for reproducible output.
    #[serde(default)]
    pub seed: Option<u64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/projects/:id/analyze
pub async fn handle_analyze_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let project = load_project(&state, project_id).await?;
    let rows = list_members(&state.db, project_id).await?;
    if rows.is_empty() {
        return Err(AppError::Validation("No team members to analyze".to_string()));
    }

    let members: Vec<MemberProfile> = rows.iter().map(MemberProfile::from).collect();
    let requirements = project.requirement_list();

    let result = run_team_analysis(
        AnalysisRequest {
            project_name: &project.name,
            rfp_text: project.rfp_text.as_deref(),
            requirements: &requirements,
            members: &members,
        },
        state.narrative.as_ref(),
        state.narrative_timeout(),
        &mut ThreadFiller,
    )
    .await;

    let row = insert_analysis(&state.db, project_id, &result).await?;

    Ok((
        StatusCode::CREATED,
        Json(AnalyzeResponse {
            analysis_id: row.id,
            project_id,
            created_at: row.created_at,
            result,
        }),
    ))
}

/// GET /api/v1/projects/:id/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<AnalysisRow>>, AppError> {
    load_project(&state, project_id).await?;
    Ok(Json(list_analyses(&state.db, project_id).await?))
}

/// POST /api/v1/team-fit/preview
///
/// Runs the full pipeline on an inline roster. Nothing is persisted.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    validate_members(&request.members)?;

    let requirements = preview_requirements(&request);
    let project_name = request
        .project_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("미리보기");

    let mut filler: Box<dyn FillerSource + Send> = match request.seed {
        Some(seed) => Box::new(SeededFiller::new(seed)),
        None => Box::new(ThreadFiller),
    };

    let result = run_team_analysis(
        AnalysisRequest {
            project_name,
            rfp_text: request.rfp_text.as_deref(),
            requirements: &requirements,
            members: &request.members,
        },
        state.narrative.as_ref(),
        state.narrative_timeout(),
        filler.as_mut(),
    )
    .await;

    Ok(Json(result))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn validate_members(members: &[MemberProfile]) -> Result<(), AppError> {
    if members.is_empty() {
        return Err(AppError::Validation("No team members to analyze".to_string()));
    }
    if members.iter().any(|m| m.name.trim().is_empty()) {
        return Err(AppError::Validation("Every member needs a name".to_string()));
    }
    Ok(())
}

fn preview_requirements(request: &PreviewRequest) -> Vec<String> {
    let explicit: Vec<String> = request
        .requirements
        .iter()
        .flatten()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    if !explicit.is_empty() {
        return explicit;
    }
    match request.rfp_text.as_deref() {
        Some(text) => requirements_from_text(text),
        None => vec![],
    }
}
