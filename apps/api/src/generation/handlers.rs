//! Axum route handlers for ad generation.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::generate_ad;
use crate::generation::tone::Tone;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub workspace_id: Uuid,
    pub ad: String,
}

/// POST /api/v1/workspaces/:id/generate
///
/// Generates the ad from the workspace's current template, description, and
/// configuration. On success the ad replaces the workspace's previous ad
/// wholesale and any refinement session is torn down. On failure the
/// workspace is untouched.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<GenerateResponse>, AppError> {
    let (template, description, tone, max_words): (String, String, Tone, u32) = {
        let workspaces = state.workspaces.read().await;
        let ws = workspaces
            .get(&workspace_id)
            .ok_or_else(|| AppError::NotFound(format!("Workspace {workspace_id} not found")))?;
        (
            ws.template.clone(),
            ws.description.clone(),
            ws.tone,
            ws.max_words,
        )
    };

    // The lock is not held across the model call: the single mutator for
    // this workspace is the current user's request.
    let ad = generate_ad(&state.llm, &template, &description, tone, max_words).await?;

    let mut workspaces = state.workspaces.write().await;
    let ws = workspaces
        .get_mut(&workspace_id)
        .ok_or_else(|| AppError::NotFound(format!("Workspace {workspace_id} not found")))?;
    ws.apply_generation(ad.clone());
    info!("Workspace {workspace_id}: ad generated ({} chars)", ad.len());

    Ok(Json(GenerateResponse {
        workspace_id,
        ad,
    }))
}
