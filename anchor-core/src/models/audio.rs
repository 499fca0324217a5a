use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Memoized chapter audio, keyed by (book_name, chapter, version).
/// At most one row per key; acts as a cache over an expensive synthesis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterAudio {
    pub book_name: String,
    pub chapter: u32,
    pub version: String,
    pub audio_url: String,
    pub duration: f64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChapterAudio {
    pub book_name: String,
    pub chapter: u32,
    pub version: String,
    pub audio_url: String,
    pub duration: f64,
}
