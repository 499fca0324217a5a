use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::json;

use anchor_core::db::DbError;

/// Quota metadata attached to a 429 response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaExceeded {
    pub message: String,
    pub current_usage: i64,
    pub daily_limit: i64,
    pub remaining_messages: i64,
    pub reset_time: DateTime<Local>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed client input.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{}", .0.message)]
    RateLimited(QuotaExceeded),

    /// An external provider returned an error; its status and detail are
    /// passed through untouched. Nothing is retried.
    #[error("upstream error: {detail}")]
    Upstream { status: Option<u16>, detail: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            Self::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
            }
            Self::RateLimited(quota) => {
                (StatusCode::TOO_MANY_REQUESTS, Json(quota)).into_response()
            }
            Self::Upstream { status, detail } => {
                let status = status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                tracing::error!(%status, detail = %detail, "upstream provider error");
                (
                    status,
                    Json(json!({
                        "error": "Upstream provider error",
                        "details": detail,
                        "status": status.as_u16(),
                    })),
                )
                    .into_response()
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate => Self::Conflict("Row already exists".to_string()),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}
