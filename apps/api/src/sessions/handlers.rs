//! Axum route handlers for workspaces, presets, and the download artifact.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::tone::Tone;
use crate::sessions::Workspace;
use crate::state::AppState;

pub const DOWNLOAD_FILENAME: &str = "job_advertisement.txt";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WorkspaceView {
    pub id: Uuid,
    pub template: String,
    pub description: String,
    pub tone: Tone,
    pub max_words: u32,
    pub generated_ad: String,
    pub generation_done: bool,
    pub refinement_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Workspace> for WorkspaceView {
    fn from(ws: &Workspace) -> Self {
        Self {
            id: ws.id,
            template: ws.template.clone(),
            description: ws.description.clone(),
            tone: ws.tone,
            max_words: ws.max_words,
            generated_ad: ws.generated_ad.clone(),
            generation_done: ws.generation_done,
            refinement_active: ws.refinement.is_some(),
            created_at: ws.created_at,
        }
    }
}

/// All fields optional: a PATCH updates only what it names.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub template: Option<String>,
    pub description: Option<String>,
    pub tone: Option<Tone>,
    pub max_words: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub templates: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/presets
pub async fn handle_get_presets(State(state): State<AppState>) -> Json<PresetsResponse> {
    Json(PresetsResponse {
        templates: state.presets.templates.clone(),
        descriptions: state.presets.descriptions.clone(),
    })
}

/// POST /api/v1/workspaces
///
/// Creates a workspace seeded with the default presets.
pub async fn handle_create_workspace(State(state): State<AppState>) -> Json<WorkspaceView> {
    let ws = Workspace::new(&state.presets);
    let view = WorkspaceView::from(&ws);
    state.workspaces.write().await.insert(ws.id, ws);
    Json(view)
}

/// GET /api/v1/workspaces/:id
pub async fn handle_get_workspace(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<WorkspaceView>, AppError> {
    let workspaces = state.workspaces.read().await;
    let ws = workspaces
        .get(&workspace_id)
        .ok_or_else(|| AppError::NotFound(format!("Workspace {workspace_id} not found")))?;
    Ok(Json(WorkspaceView::from(ws)))
}

/// PATCH /api/v1/workspaces/:id
///
/// Updates the editable inputs. Editing inputs never touches the generated
/// ad or the refinement transcript — only a new generation does that.
pub async fn handle_update_workspace(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<UpdateWorkspaceRequest>,
) -> Result<Json<WorkspaceView>, AppError> {
    let mut workspaces = state.workspaces.write().await;
    let ws = workspaces
        .get_mut(&workspace_id)
        .ok_or_else(|| AppError::NotFound(format!("Workspace {workspace_id} not found")))?;

    if let Some(template) = request.template {
        ws.template = template;
    }
    if let Some(description) = request.description {
        ws.description = description;
    }
    if let Some(tone) = request.tone {
        ws.tone = tone;
    }
    if let Some(max_words) = request.max_words {
        ws.max_words = max_words;
    }

    Ok(Json(WorkspaceView::from(&*ws)))
}

/// GET /api/v1/workspaces/:id/transcript
///
/// The refinement conversation as the user sees it: user and assistant
/// turns only, the priming turn withheld.
pub async fn handle_get_transcript(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let workspaces = state.workspaces.read().await;
    let ws = workspaces
        .get(&workspace_id)
        .ok_or_else(|| AppError::NotFound(format!("Workspace {workspace_id} not found")))?;

    let turns = ws
        .refinement
        .as_ref()
        .map(|s| s.visible_turns())
        .unwrap_or_default();
    Ok(Json(serde_json::json!({ "turns": turns })))
}

/// GET /api/v1/workspaces/:id/ad/download
///
/// The current ad as a plain-text attachment with a fixed filename.
pub async fn handle_download_ad(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let workspaces = state.workspaces.read().await;
    let ws = workspaces
        .get(&workspace_id)
        .ok_or_else(|| AppError::NotFound(format!("Workspace {workspace_id} not found")))?;

    if !ws.generation_done || ws.generated_ad.trim().is_empty() {
        return Err(AppError::Validation(
            "No generated ad to download yet".to_string(),
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        ws.generated_ad.clone(),
    ))
}
