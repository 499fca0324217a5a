mod ai;
mod audio;
mod favorites;
mod images;
mod rate_limit;
mod verses;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Json, Router};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use anchor_core::db::Database;

use crate::clients::{AiProvider, VerseProvider};
use crate::services::audio::AudioService;
use crate::services::usage::UsageLimiter;
use crate::services::votd::VerseOfDayService;

pub use rate_limit::IpRateLimiter;

const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
const IP_WINDOW: Duration = Duration::from_secs(15 * 60);
const IP_WINDOW_MAX: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub bible: Arc<dyn VerseProvider>,
    pub ai: Arc<dyn AiProvider>,
    pub votd: VerseOfDayService,
    pub audio: AudioService,
    pub usage: UsageLimiter,
}

pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let limiter = IpRateLimiter::new(IP_WINDOW_MAX, IP_WINDOW);

    let api = Router::new()
        .nest("/verses", verses::router())
        .nest("/ai", ai::router())
        .nest("/images", images::router())
        .nest("/favorites", favorites::router())
        .nest("/audio", audio::router())
        .layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::ip_rate_limit,
        ));

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Anchor Bible API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
