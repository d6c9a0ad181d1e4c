use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::presets::PresetLibrary;
use crate::sessions::WorkspaceStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Presets and config are read-only after startup; the
/// workspace store is the only mutable shared state.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    pub presets: Arc<PresetLibrary>,
    pub auth: Arc<AuthService>,
    pub workspaces: WorkspaceStore,
}
