pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::generation;
use crate::refine;
use crate::sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Everything behind the auth gate: presets, workspaces, generation,
    // refinement, download.
    let protected = Router::new()
        .route("/api/v1/presets", get(sessions::handlers::handle_get_presets))
        .route(
            "/api/v1/workspaces",
            post(sessions::handlers::handle_create_workspace),
        )
        .route(
            "/api/v1/workspaces/:id",
            get(sessions::handlers::handle_get_workspace)
                .patch(sessions::handlers::handle_update_workspace),
        )
        .route(
            "/api/v1/workspaces/:id/generate",
            post(generation::handlers::handle_generate),
        )
        .route(
            "/api/v1/workspaces/:id/transcript",
            get(sessions::handlers::handle_get_transcript),
        )
        .route(
            "/api/v1/workspaces/:id/refine",
            post(refine::handlers::handle_refine),
        )
        .route(
            "/api/v1/workspaces/:id/ad/download",
            get(sessions::handlers::handle_download_ad),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route("/api/v1/auth/logout", post(auth::handlers::handle_logout))
        .route("/api/v1/auth/session", get(auth::handlers::handle_session))
        .merge(protected)
        .with_state(state)
}
