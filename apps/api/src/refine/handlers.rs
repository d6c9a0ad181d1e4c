//! Axum route handler for the streaming refinement endpoint.
//!
//! The model reply is forwarded to the client as SSE `delta` events while it
//! streams, followed by exactly one terminal event: `done` (carrying the
//! sanitized ad that was just installed), `safety_stop`, or `error`. On
//! `safety_stop` and `error` the workspace ad is untouched and no assistant
//! turn is recorded; the user's outgoing turn stays in the transcript.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ChatEvent, Content};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub message: String,
}

/// Phrases the model sometimes emits in place of blocked content. A reply
/// containing one is treated as safety-stopped even without an explicit
/// finish reason.
const BLOCKING_PHRASES: &[&str] = &[
    "[content generation stopped due to safety reasons.]",
    "[content blocked",
];

pub fn looks_safety_blocked(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BLOCKING_PHRASES.iter().any(|p| lowered.contains(p))
}

/// POST /api/v1/workspaces/:id/refine
pub async fn handle_refine(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<RefineRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::Validation(
            "Refinement message cannot be empty".to_string(),
        ));
    }

    // Append the user's turn (priming the session first if needed) and take
    // a snapshot of the transcript for the model call. The user turn is kept
    // even if the reply later fails.
    let contents: Vec<Content> = {
        let mut workspaces = state.workspaces.write().await;
        let ws = workspaces
            .get_mut(&workspace_id)
            .ok_or_else(|| AppError::NotFound(format!("Workspace {workspace_id} not found")))?;
        if !ws.generation_done || ws.generated_ad.trim().is_empty() {
            return Err(AppError::Validation(
                "Generate an ad before refining it".to_string(),
            ));
        }
        let session = ws.refinement_session();
        session.push_user(message);
        session.to_contents()
    };

    // Errors before the stream opens (auth, quota, network) surface as a
    // plain error response; the transcript keeps the user's turn.
    let mut model_events = state
        .llm
        .stream_chat(contents)
        .await
        .map_err(|e| AppError::Llm(format!("Chat request failed: {e}")))?;

    let (tx, rx) = mpsc::channel::<Event>(32);
    let store = state.workspaces.clone();

    tokio::spawn(async move {
        let mut full_reply = String::new();

        while let Some(event) = model_events.recv().await {
            match event {
                ChatEvent::Delta(chunk) => {
                    full_reply.push_str(&chunk);
                    if tx
                        .send(Event::default().event("delta").data(chunk))
                        .await
                        .is_err()
                    {
                        return; // client disconnected; leave state as-is
                    }
                }
                ChatEvent::SafetyStop => {
                    warn!("Workspace {workspace_id}: refinement safety-stopped, ad unchanged");
                    let _ = tx
                        .send(Event::default().event("safety_stop").data(
                            "The reply was stopped by the safety filter. The ad was not updated.",
                        ))
                        .await;
                    return;
                }
                ChatEvent::Error(message) => {
                    let _ = tx.send(Event::default().event("error").data(message)).await;
                    return;
                }
                ChatEvent::Done => break,
            }
        }

        if full_reply.trim().is_empty() {
            let _ = tx
                .send(Event::default().event("error").data(
                    "The model returned an empty reply. The ad was not updated.",
                ))
                .await;
            return;
        }
        if looks_safety_blocked(&full_reply) {
            warn!("Workspace {workspace_id}: reply text indicates blocking, ad unchanged");
            let _ = tx
                .send(Event::default().event("safety_stop").data(
                    "The reply appears to have been blocked. The ad was not updated.",
                ))
                .await;
            return;
        }

        // Success: record the assistant turn and install the sanitized ad.
        let new_ad = {
            let mut workspaces = store.write().await;
            let Some(ws) = workspaces.get_mut(&workspace_id) else {
                let _ = tx
                    .send(Event::default().event("error").data("Workspace no longer exists"))
                    .await;
                return;
            };
            let new_ad = ws.refinement_session().record_reply(&full_reply);
            ws.apply_refined_ad(new_ad.clone());
            new_ad
        };
        info!(
            "Workspace {workspace_id}: ad refined ({} chars)",
            new_ad.len()
        );
        let _ = tx.send(Event::default().event("done").data(new_ad)).await;
    });

    Ok(Sse::new(ReceiverStream::new(rx).map(Ok::<Event, Infallible>))
        .keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_phrases_detected_case_insensitively() {
        assert!(looks_safety_blocked(
            "Sure, here's...\n[Content generation stopped due to safety reasons.]"
        ));
        assert!(looks_safety_blocked("[CONTENT BLOCKED: policy]"));
    }

    #[test]
    fn test_ordinary_reply_not_flagged() {
        assert!(!looks_safety_blocked(
            "**Job Title:** Backend Engineer\nSafety is our top value."
        ));
    }
}
