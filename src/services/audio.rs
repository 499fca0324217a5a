use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use anchor_core::db::Database;
use anchor_core::models::{ChapterVerse, NewChapterAudio};

use crate::clients::{ObjectStore, SpeechProvider};
use crate::error::ApiError;

const AUDIO_BUCKET: &str = "chapter-audio";

/// Duration is estimated from byte length; the provider emits constant-rate
/// 128 kbps MP3.
const MP3_BITRATE_BITS_PER_SEC: f64 = 128_000.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAudioResult {
    pub audio_url: String,
    pub duration: f64,
    pub verse_count: usize,
    pub cached: bool,
}

/// Memoizes chapter synthesis: one TTS call and one stored blob per
/// (book, chapter, version), everything after that is a table read.
#[derive(Clone)]
pub struct AudioService {
    db: Database,
    tts: Arc<dyn SpeechProvider>,
    store: Arc<dyn ObjectStore>,
}

impl AudioService {
    pub fn new(db: Database, tts: Arc<dyn SpeechProvider>, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, tts, store }
    }

    pub async fn generate_chapter_audio(
        &self,
        verses: &[ChapterVerse],
        book_name: &str,
        chapter: u32,
        version: &str,
    ) -> Result<ChapterAudioResult, ApiError> {
        if verses.is_empty() {
            return Err(ApiError::BadRequest("Verses array is empty".to_string()));
        }

        if let Some(cached) = self.db.get_chapter_audio(book_name, chapter, version)? {
            tracing::debug!(book = book_name, chapter, version, "chapter audio cache hit");
            return Ok(ChapterAudioResult {
                audio_url: cached.audio_url,
                duration: cached.duration,
                verse_count: verses.len(),
                cached: true,
            });
        }

        let text = spoken_chapter_text(verses, book_name, chapter);
        tracing::info!(
            book = book_name,
            chapter,
            version,
            chars = text.len(),
            "synthesizing chapter audio"
        );

        let bytes = self.tts.synthesize(&text).await?;
        let duration = bytes.len() as f64 * 8.0 / MP3_BITRATE_BITS_PER_SEC;

        // Timestamp component keeps racing first-writers from colliding on
        // the storage key.
        let key = format!(
            "{}-{}-{}-{}.mp3",
            slug(book_name),
            chapter,
            version.to_lowercase(),
            Utc::now().timestamp_millis()
        );
        let audio_url = self
            .store
            .upload(AUDIO_BUCKET, &key, bytes, "audio/mpeg")
            .await?;

        self.db.insert_chapter_audio(&NewChapterAudio {
            book_name: book_name.to_string(),
            chapter,
            version: version.to_string(),
            audio_url: audio_url.clone(),
            duration,
        })?;

        Ok(ChapterAudioResult {
            audio_url,
            duration,
            verse_count: verses.len(),
            cached: false,
        })
    }
}

/// Spoken intro naming the chapter, then each verse with its number so
/// listeners can follow along.
fn spoken_chapter_text(verses: &[ChapterVerse], book_name: &str, chapter: u32) -> String {
    let body = verses
        .iter()
        .map(|v| format!("Verse {}. {}", v.number, v.text))
        .collect::<Vec<_>>()
        .join(". ");
    format!("{book_name}, chapter {chapter}. {body}")
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct StubSpeech {
        calls: AtomicUsize,
        bytes: usize,
    }

    impl StubSpeech {
        fn new(bytes: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                bytes,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SpeechProvider for StubSpeech {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8; self.bytes])
        }
    }

    struct StubStore;

    #[async_trait]
    impl ObjectStore for StubStore {
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, ApiError> {
            Ok(format!("https://store.example/{bucket}/{key}"))
        }
    }

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn verses() -> Vec<ChapterVerse> {
        vec![
            ChapterVerse { number: 1, text: "The Lord is my shepherd".to_string() },
            ChapterVerse { number: 2, text: "He makes me lie down".to_string() },
        ]
    }

    fn service(tts: Arc<StubSpeech>) -> AudioService {
        AudioService::new(test_db(), tts, Arc::new(StubStore))
    }

    #[tokio::test]
    async fn empty_verses_rejected_before_any_provider_call() {
        let tts = Arc::new(StubSpeech::new(16_000));
        let svc = service(tts.clone());

        let err = svc
            .generate_chapter_audio(&[], "Psalms", 23, "WEB")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(tts.call_count(), 0);
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let tts = Arc::new(StubSpeech::new(16_000));
        let svc = service(tts.clone());

        let fresh = svc
            .generate_chapter_audio(&verses(), "Psalms", 23, "WEB")
            .await
            .unwrap();
        assert!(!fresh.cached);
        assert_eq!(fresh.verse_count, 2);

        let cached = svc
            .generate_chapter_audio(&verses(), "Psalms", 23, "WEB")
            .await
            .unwrap();
        assert!(cached.cached);
        assert_eq!(cached.audio_url, fresh.audio_url);
        assert_eq!(tts.call_count(), 1);
    }

    #[tokio::test]
    async fn cache_keys_include_the_translation() {
        let tts = Arc::new(StubSpeech::new(16_000));
        let svc = service(tts.clone());

        svc.generate_chapter_audio(&verses(), "Psalms", 23, "WEB")
            .await
            .unwrap();
        let kjv = svc
            .generate_chapter_audio(&verses(), "Psalms", 23, "KJV")
            .await
            .unwrap();

        assert!(!kjv.cached);
        assert_eq!(tts.call_count(), 2);
    }

    #[tokio::test]
    async fn duration_follows_the_fixed_bitrate_assumption() {
        // 160_000 bytes at 128 kbps is exactly 10 seconds
        let svc = service(Arc::new(StubSpeech::new(160_000)));
        let result = svc
            .generate_chapter_audio(&verses(), "Psalms", 23, "WEB")
            .await
            .unwrap();
        assert!((result.duration - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn spoken_text_names_the_chapter_and_numbers_verses() {
        let text = spoken_chapter_text(&verses(), "Psalms", 23);
        assert!(text.starts_with("Psalms, chapter 23."));
        assert!(text.contains("Verse 1. The Lord is my shepherd"));
        assert!(text.contains("Verse 2."));
    }
}
