use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use anchor_core::db::DbError;
use anchor_core::models::{CreatePresetInput, ImagePreset};

use crate::error::ApiError;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presets", get(list_presets).post(create_preset))
        .route("/presets/random", get(random_preset))
        .route("/presets/{id}", delete(delete_preset))
}

#[derive(Debug, Deserialize)]
struct PresetQuery {
    category: Option<String>,
}

async fn list_presets(
    State(state): State<AppState>,
    Query(query): Query<PresetQuery>,
) -> Result<Json<Vec<ImagePreset>>, ApiError> {
    let category = query.category.as_deref().filter(|c| *c != "all");
    let presets = state.db.get_presets(category)?;
    Ok(Json(presets))
}

async fn random_preset(State(state): State<AppState>) -> Result<Json<ImagePreset>, ApiError> {
    let presets = state.db.get_presets(None)?;
    if presets.is_empty() {
        return Err(ApiError::NotFound("No presets available".to_string()));
    }
    let index = rand::rng().random_range(0..presets.len());
    Ok(Json(presets[index].clone()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePresetRequest {
    name: Option<String>,
    image_url: Option<String>,
    category: Option<String>,
    tags: Option<Vec<String>>,
    sort_order: Option<i64>,
}

async fn create_preset(
    State(state): State<AppState>,
    Json(body): Json<CreatePresetRequest>,
) -> Result<(StatusCode, Json<ImagePreset>), ApiError> {
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let image_url = body
        .image_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("imageUrl is required".to_string()))?;
    let category = body
        .category
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("category is required".to_string()))?;

    let preset = state
        .db
        .create_preset(CreatePresetInput {
            name,
            image_url,
            category,
            tags: body.tags,
            sort_order: body.sort_order,
        })
        .map_err(|err| match err {
            DbError::Duplicate => ApiError::Conflict("Preset name already exists".to_string()),
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(preset)))
}

async fn delete_preset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.delete_preset(id)? {
        return Err(ApiError::NotFound("Preset not found".to_string()));
    }
    Ok(Json(json!({ "message": "Preset deleted successfully" })))
}
