use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Missing required variables are fatal at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model_name: String,
    pub credentials_path: String,
    pub ad_templates_dir: String,
    pub jd_descriptions_dir: String,
    pub port: u16,
    pub rust_log: String,
}

/// Default Gemini model. Overridable via MODEL_NAME.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            model_name: std::env::var("MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            credentials_path: std::env::var("CREDENTIALS_PATH")
                .unwrap_or_else(|_| "configs/credentials.yaml".to_string()),
            ad_templates_dir: std::env::var("AD_TEMPLATES_DIR")
                .unwrap_or_else(|_| "content/ad_templates".to_string()),
            jd_descriptions_dir: std::env::var("JD_DESCRIPTIONS_DIR")
                .unwrap_or_else(|_| "content/jd_descriptions".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
