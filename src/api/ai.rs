use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, QuotaExceeded};
use crate::services::usage::{RateLimitDecision, Tier};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/explain", post(explain))
        .route("/related", post(related))
        .route("/study-questions", post(study_questions))
}

/// Wire shape shared by the AI endpoints. Fields are optional here and
/// checked explicitly so a missing field gets a field-specific 400 instead
/// of a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiRequest {
    verse: Option<String>,
    reference: Option<String>,
    user_id: Option<String>,
    #[serde(default)]
    is_pro: bool,
}

struct ValidatedAiRequest {
    verse: String,
    reference: String,
    user_id: String,
    tier: Tier,
}

impl AiRequest {
    fn validate(self, needs_reference: bool) -> Result<ValidatedAiRequest, ApiError> {
        let verse = self
            .verse
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Verse is required".to_string()))?;
        let reference = match self.reference.filter(|r| !r.trim().is_empty()) {
            Some(r) => r,
            None if needs_reference => {
                return Err(ApiError::BadRequest("Reference is required".to_string()))
            }
            None => String::new(),
        };
        let user_id = self
            .user_id
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;
        Ok(ValidatedAiRequest {
            verse,
            reference,
            user_id,
            tier: Tier::from_flag(self.is_pro),
        })
    }
}

/// Counter is consumed before the provider call; a store failure lets the
/// request through uncounted.
fn enforce_quota(state: &AppState, request: &ValidatedAiRequest) -> Result<(), ApiError> {
    match state.usage.check_and_count(&request.user_id, request.tier) {
        RateLimitDecision::Allowed { remaining, .. } => {
            tracing::debug!(user_id = %request.user_id, remaining, "AI quota consumed");
            Ok(())
        }
        RateLimitDecision::Exceeded {
            current_usage,
            daily_limit,
            reset_time,
        } => Err(ApiError::RateLimited(QuotaExceeded {
            message: "Daily message limit reached".to_string(),
            current_usage,
            daily_limit,
            remaining_messages: 0,
            reset_time,
        })),
        RateLimitDecision::FailedOpen => Ok(()),
    }
}

async fn explain(
    State(state): State<AppState>,
    Json(body): Json<AiRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = body.validate(true)?;
    enforce_quota(&state, &request)?;

    let explanation = state
        .ai
        .explain_verse(&request.verse, &request.reference)
        .await?;
    Ok(Json(json!({ "explanation": explanation })))
}

async fn related(
    State(state): State<AppState>,
    Json(body): Json<AiRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = body.validate(false)?;
    enforce_quota(&state, &request)?;

    let related_verses = state.ai.related_verses(&request.verse).await?;
    Ok(Json(json!({ "relatedVerses": related_verses })))
}

async fn study_questions(
    State(state): State<AppState>,
    Json(body): Json<AiRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = body.validate(true)?;
    enforce_quota(&state, &request)?;

    let questions = state
        .ai
        .study_questions(&request.verse, &request.reference)
        .await?;
    Ok(Json(json!({ "questions": questions })))
}
