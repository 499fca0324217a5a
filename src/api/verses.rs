use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use anchor_core::models::{Chapter, Verse};

use crate::clients::{available_versions, VersionInfo};
use crate::error::ApiError;
use crate::services::votd::DEFAULT_VERSION;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verse-of-day", get(verse_of_day))
        .route("/chapter/{book_name}/{chapter}", get(chapter))
        .route("/versions/list", get(versions))
        .route("/search/{query}", get(search))
        .route("/{reference}", get(verse))
}

#[derive(Debug, Deserialize)]
struct VerseOfDayQuery {
    version: Option<String>,
    date: Option<String>,
    timezone: Option<String>,
}

async fn verse_of_day(
    State(state): State<AppState>,
    Query(query): Query<VerseOfDayQuery>,
) -> Json<Verse> {
    let version = query.version.as_deref().unwrap_or(DEFAULT_VERSION);
    tracing::debug!(
        version,
        date = ?query.date,
        timezone = ?query.timezone,
        "fetching verse of the day"
    );
    let result = state
        .votd
        .verse_of_the_day(version, query.date.as_deref(), query.timezone.as_deref())
        .await;
    Json(result.verse)
}

#[derive(Debug, Deserialize)]
struct VersionQuery {
    version: Option<String>,
}

async fn chapter(
    State(state): State<AppState>,
    Path((book_name, chapter)): Path<(String, u32)>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<Chapter>, ApiError> {
    let version = query.version.as_deref().unwrap_or(DEFAULT_VERSION);
    let chapter = state.bible.get_chapter(&book_name, chapter, version).await?;
    Ok(Json(chapter))
}

async fn verse(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<Verse>, ApiError> {
    let version = query.version.as_deref().unwrap_or(DEFAULT_VERSION);
    let verse = state.bible.get_verse(&reference, version).await?;
    Ok(Json(verse))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    version: Option<String>,
    limit: Option<u32>,
}

async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Verse>>, ApiError> {
    let version = params.version.as_deref().unwrap_or(DEFAULT_VERSION);
    let limit = params.limit.unwrap_or(10);
    let results = state.bible.search(&query, version, limit).await?;
    Ok(Json(results))
}

async fn versions() -> Json<Vec<VersionInfo>> {
    Json(available_versions())
}
