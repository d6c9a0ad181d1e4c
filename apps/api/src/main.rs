mod auth;
mod config;
mod errors;
mod generation;
mod llm_client;
mod presets;
mod refine;
mod routes;
mod sessions;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::AuthService;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::presets::PresetLibrary;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fatal on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AdForge API v{}", env!("CARGO_PKG_VERSION"));

    // Credential store — missing or malformed file halts startup
    let auth = Arc::new(AuthService::load(&config.credentials_path)?);

    // Preset library — built-ins plus the content directories
    let presets = Arc::new(PresetLibrary::load(
        Path::new(&config.ad_templates_dir),
        Path::new(&config.jd_descriptions_dir),
    ));

    // LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.model_name.clone());
    info!("LLM client initialized (model: {})", llm.model());

    // Build app state
    let state = AppState {
        llm,
        config: config.clone(),
        presets,
        auth,
        workspaces: sessions::new_store(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
