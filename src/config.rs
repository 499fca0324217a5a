use std::path::PathBuf;

/// Server configuration, read from the environment (the deployment target
/// injects these; there is no config file).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: Option<PathBuf>,
    pub bible_api_key: String,
    pub openai_api_key: String,
    pub speechify_api_key: String,
    pub storage_url: String,
    pub storage_key: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);

        let config = Self {
            port,
            db_path: std::env::var("DATABASE_PATH").ok().map(PathBuf::from),
            bible_api_key: std::env::var("BIBLE_API_KEY").unwrap_or_default(),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            speechify_api_key: std::env::var("SPEECHIFY_API_KEY").unwrap_or_default(),
            storage_url: std::env::var("STORAGE_URL").unwrap_or_default(),
            storage_key: std::env::var("STORAGE_KEY").unwrap_or_default(),
            allowed_origins,
        };

        if config.bible_api_key.is_empty() {
            tracing::warn!("BIBLE_API_KEY not set; Bible API calls will fail");
        }
        if config.openai_api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY not set; AI features will fail");
        }
        if config.speechify_api_key.is_empty() {
            tracing::warn!("SPEECHIFY_API_KEY not set; audio generation will fail");
        }

        config
    }
}
