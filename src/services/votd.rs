use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, Utc};
use chrono_tz::Tz;

use anchor_core::db::Database;
use anchor_core::models::{Theme, Verse, VerseOfDayRow};

use crate::clients::VerseProvider;
use crate::error::ApiError;

pub const DEFAULT_VERSION: &str = "WEB";

/// Where the day's verse came from. `Fallback` marks a degraded result so
/// callers and tests can tell it apart from a real hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseSource {
    Cache,
    Generated,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct VerseOfDay {
    pub verse: Verse,
    pub source: VerseSource,
}

/// Produces exactly one verse per calendar day per translation: a weekly
/// theme rotation picks the candidate, the text provider fills it in, and
/// the result is cached so repeat requests are idempotent.
#[derive(Clone)]
pub struct VerseOfDayService {
    db: Database,
    bible: Arc<dyn VerseProvider>,
}

impl VerseOfDayService {
    pub fn new(db: Database, bible: Arc<dyn VerseProvider>) -> Self {
        Self { db, bible }
    }

    /// Never fails: availability of *a* verse outranks correctness of *the*
    /// verse, so every error path degrades to the fixed fallback.
    pub async fn verse_of_the_day(
        &self,
        version: &str,
        user_date: Option<&str>,
        timezone: Option<&str>,
    ) -> VerseOfDay {
        match self.resolve(version, user_date, timezone).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, version, "verse of the day degraded to fallback");
                VerseOfDay {
                    verse: fallback_verse(),
                    source: VerseSource::Fallback,
                }
            }
        }
    }

    async fn resolve(
        &self,
        version: &str,
        user_date: Option<&str>,
        timezone: Option<&str>,
    ) -> Result<VerseOfDay, ApiError> {
        let date = resolve_date(user_date, timezone)?;

        if let Some(cached) = self.db.get_verse_of_day(date, version)? {
            tracing::debug!(%date, version, "verse of the day served from cache");
            return Ok(VerseOfDay {
                verse: cached.into_verse(),
                source: VerseSource::Cache,
            });
        }

        let theme = Theme::for_weekday(date.weekday().num_days_from_sunday());
        tracing::debug!(%date, theme = theme.as_str(), "cache miss, selecting themed verse");

        let candidates = self.db.get_themed_verses(theme)?;
        if candidates.is_empty() {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "no themed verses for {}",
                theme.as_str()
            )));
        }

        // Pure function of (theme, date): concurrent requests for the same
        // day must land on the same candidate.
        let index = (fnv1a(date.to_string().as_bytes()) % candidates.len() as u64) as usize;
        let entry = &candidates[index];

        let fetched = self.bible.get_verse(&entry.reference_code, version).await?;

        let row = VerseOfDayRow {
            date,
            version: version.to_string(),
            book: entry.book.clone(),
            chapter: entry.chapter,
            verse: entry.verse,
            text: fetched.text,
            created_at: Utc::now(),
        };
        // A racing writer computed the same content; the loser is ignored.
        self.db.insert_verse_of_day(&row)?;

        Ok(VerseOfDay {
            verse: row.into_verse(),
            source: VerseSource::Generated,
        })
    }
}

/// Date resolution, in priority order: the caller's own calendar day wins,
/// then their timezone, then the server clock.
fn resolve_date(user_date: Option<&str>, timezone: Option<&str>) -> Result<NaiveDate, ApiError> {
    if let Some(date) = user_date {
        return date
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid date: {date}")));
    }
    if let Some(zone) = timezone {
        let tz: Tz = zone
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid timezone: {zone}")))?;
        return Ok(Utc::now().with_timezone(&tz).date_naive());
    }
    Ok(Local::now().date_naive())
}

/// FNV-1a over the date string. std's hasher keys per process, which would
/// break determinism across restarts.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

pub fn fallback_verse() -> Verse {
    Verse {
        text: "For God so loved the world, that he gave his only born Son, that whoever \
               believes in him should not perish, but have eternal life."
            .to_string(),
        reference: "John 3:16".to_string(),
        book: "John".to_string(),
        chapter: 3,
        verse: 16,
        version: DEFAULT_VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use anchor_core::models::Chapter;

    use super::*;

    struct StubBible {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubBible {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VerseProvider for StubBible {
        async fn get_verse(&self, reference: &str, version: &str) -> Result<Verse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Upstream {
                    status: None,
                    detail: "provider unreachable".to_string(),
                });
            }
            Ok(Verse {
                text: format!("text of {reference}"),
                reference: reference.to_string(),
                book: String::new(),
                chapter: 0,
                verse: 0,
                version: version.to_string(),
            })
        }

        async fn get_chapter(&self, _: &str, _: u32, _: &str) -> Result<Chapter, ApiError> {
            unimplemented!("not used by the selector")
        }

        async fn search(&self, _: &str, _: &str, _: u32) -> Result<Vec<Verse>, ApiError> {
            unimplemented!("not used by the selector")
        }
    }

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[tokio::test]
    async fn sunday_uses_the_rest_theme_consistently() {
        let db = test_db();
        let bible = Arc::new(StubBible::new());
        let service = VerseOfDayService::new(db.clone(), bible.clone());

        // 2024-03-10 is a Sunday (weekday 0)
        let first = service
            .verse_of_the_day("WEB", Some("2024-03-10"), None)
            .await;
        assert_eq!(first.source, VerseSource::Generated);

        let rest_candidates = db.get_themed_verses(Theme::Rest).unwrap();
        assert!(rest_candidates
            .iter()
            .any(|c| c.book == first.verse.book
                && c.chapter == first.verse.chapter
                && c.verse == first.verse.verse));
    }

    #[tokio::test]
    async fn repeated_calls_return_identical_results() {
        let db = test_db();
        let bible = Arc::new(StubBible::new());
        let service = VerseOfDayService::new(db, bible.clone());

        let first = service
            .verse_of_the_day("WEB", Some("2024-03-10"), None)
            .await;
        let second = service
            .verse_of_the_day("WEB", Some("2024-03-10"), None)
            .await;

        assert_eq!(first.verse, second.verse);
        assert_eq!(second.source, VerseSource::Cache);
        // Cached path never touches the provider
        assert_eq!(bible.call_count(), 1);
    }

    #[tokio::test]
    async fn translations_are_cached_independently() {
        let db = test_db();
        let bible = Arc::new(StubBible::new());
        let service = VerseOfDayService::new(db, bible.clone());

        service
            .verse_of_the_day("WEB", Some("2024-03-10"), None)
            .await;
        let kjv = service
            .verse_of_the_day("KJV", Some("2024-03-10"), None)
            .await;

        assert_eq!(kjv.source, VerseSource::Generated);
        assert_eq!(kjv.verse.version, "KJV");
        assert_eq!(bible.call_count(), 2);
    }

    #[tokio::test]
    async fn selection_is_deterministic_for_a_date() {
        // Same (theme, date) must always yield the same candidate, even
        // from a fresh database.
        let bible = Arc::new(StubBible::new());
        let a = VerseOfDayService::new(test_db(), bible.clone())
            .verse_of_the_day("WEB", Some("2024-03-10"), None)
            .await;
        let b = VerseOfDayService::new(test_db(), bible)
            .verse_of_the_day("WEB", Some("2024-03-10"), None)
            .await;
        assert_eq!(a.verse, b.verse);
    }

    #[tokio::test]
    async fn unreachable_provider_degrades_to_fallback() {
        let db = test_db();
        let service = VerseOfDayService::new(db.clone(), Arc::new(StubBible::failing()));

        let result = service
            .verse_of_the_day("WEB", Some("2024-03-10"), None)
            .await;

        assert_eq!(result.source, VerseSource::Fallback);
        assert_eq!(result.verse.reference, "John 3:16");
        assert_eq!(result.verse.version, "WEB");
        // A degraded result must not poison the cache
        assert!(db
            .get_verse_of_day("2024-03-10".parse().unwrap(), "WEB")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn malformed_date_degrades_to_fallback() {
        let service = VerseOfDayService::new(test_db(), Arc::new(StubBible::new()));
        let result = service
            .verse_of_the_day("WEB", Some("not-a-date"), None)
            .await;
        assert_eq!(result.source, VerseSource::Fallback);
    }

    #[test]
    fn fnv1a_is_stable() {
        assert_eq!(fnv1a(b"2024-03-10"), fnv1a(b"2024-03-10"));
        assert_ne!(fnv1a(b"2024-03-10"), fnv1a(b"2024-03-11"));
    }

    #[test]
    fn timezone_resolution_accepts_iana_names() {
        assert!(resolve_date(None, Some("America/New_York")).is_ok());
        assert!(resolve_date(None, Some("Atlantis/Nowhere")).is_err());
    }

    #[test]
    fn user_date_wins_over_timezone() {
        let date = resolve_date(Some("2024-03-10"), Some("Asia/Tokyo")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }
}
