use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use anchor_core::db::DbError;
use anchor_core::models::{CreateFavoriteInput, Favorite};

use crate::error::ApiError;

use super::AppState;

pub fn router() -> Router<AppState> {
    // GET reads by user id, DELETE by favorite id; one capture serves both.
    Router::new()
        .route("/", post(add_favorite))
        .route("/{id}", get(list_favorites).delete(remove_favorite))
}

async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Favorite>>, ApiError> {
    let favorites = state.db.get_favorites(&user_id)?;
    Ok(Json(favorites))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddFavoriteRequest {
    user_id: Option<String>,
    book: Option<String>,
    chapter: Option<u32>,
    verse: Option<u32>,
    version: Option<String>,
    text: Option<String>,
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<Favorite>), ApiError> {
    let (user_id, book, chapter, verse, version, text) = match (
        body.user_id,
        body.book,
        body.chapter,
        body.verse,
        body.version,
        body.text,
    ) {
        (Some(u), Some(b), Some(c), Some(v), Some(ver), Some(t))
            if !u.is_empty() && !b.is_empty() && !ver.is_empty() && !t.is_empty() =>
        {
            (u, b, c, v, ver, t)
        }
        _ => return Err(ApiError::BadRequest("Missing required fields".to_string())),
    };

    let favorite = state
        .db
        .create_favorite(CreateFavoriteInput {
            user_id,
            book,
            chapter,
            verse,
            version,
            text,
        })
        .map_err(|err| match err {
            DbError::Duplicate => ApiError::Conflict("Verse already in favorites".to_string()),
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.delete_favorite(id)? {
        return Err(ApiError::NotFound("Favorite not found".to_string()));
    }
    Ok(Json(json!({ "message": "Favorite removed successfully" })))
}
