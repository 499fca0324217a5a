use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use anchor_core::models::ChapterVerse;

use crate::error::ApiError;
use crate::services::audio::ChapterAudioResult;
use crate::services::votd::DEFAULT_VERSION;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-chapter-audio", post(generate_chapter_audio))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateChapterAudioRequest {
    verses: Option<Vec<VerseInput>>,
    book_name: Option<String>,
    chapter: Option<u32>,
    version: Option<String>,
}

/// Clients have sent the verse number under several names over time.
#[derive(Debug, Deserialize)]
struct VerseInput {
    #[serde(alias = "verse", alias = "verseNumber")]
    number: u32,
    #[serde(default)]
    text: String,
}

async fn generate_chapter_audio(
    State(state): State<AppState>,
    Json(body): Json<GenerateChapterAudioRequest>,
) -> Result<Json<ChapterAudioResult>, ApiError> {
    let verses = body
        .verses
        .ok_or_else(|| ApiError::BadRequest("Verses array is required".to_string()))?;
    if verses.is_empty() {
        return Err(ApiError::BadRequest("Verses array is empty".to_string()));
    }
    let book_name = body
        .book_name
        .filter(|b| !b.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("bookName is required".to_string()))?;
    let chapter = body
        .chapter
        .ok_or_else(|| ApiError::BadRequest("chapter is required".to_string()))?;
    let version = body.version.unwrap_or_else(|| DEFAULT_VERSION.to_string());

    let verses: Vec<ChapterVerse> = verses
        .into_iter()
        .map(|v| ChapterVerse {
            number: v.number,
            text: v.text,
        })
        .collect();

    let result = state
        .audio
        .generate_chapter_audio(&verses, &book_name, chapter, &version)
        .await?;
    Ok(Json(result))
}
