mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

pub use schema::{SCHEMA, THEMED_VERSE_SEED};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Unique-constraint violation: the row already exists.
    #[error("row already exists")]
    Duplicate,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Outcome of the atomic daily-usage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDecision {
    /// Counter was incremented; `count` is the value after this call.
    Allowed { count: i64 },
    /// Counter already at or above the ceiling; nothing was written.
    Exceeded { count: i64 },
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dir = Self::default_data_dir();
        std::fs::create_dir_all(&dir).ok();
        Self::open(dir.join("anchor.db"))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("anchor")
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch(THEMED_VERSE_SEED)?;
        Ok(())
    }

    // Themed reference table (read-only at runtime)

    /// Candidates for a theme, in stable order so that deterministic
    /// selection by index is reproducible.
    pub fn get_themed_verses(&self, theme: Theme) -> Result<Vec<ThemedVerseEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT reference_code, book, chapter, verse, theme FROM themed_verses
             WHERE theme = ?1 ORDER BY reference_code",
        )?;
        let entries = stmt
            .query_map(params![theme.as_str()], themed_verse_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // Verse of the day cache

    pub fn get_verse_of_day(&self, date: NaiveDate, version: &str) -> Result<Option<VerseOfDayRow>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT date, version, book, chapter, verse, text, created_at
                 FROM verse_of_the_day WHERE date = ?1 AND version = ?2",
                params![date.to_string(), version],
                votd_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Insert a day's verse. Returns false when a concurrent writer got
    /// there first; both writers computed the same content, so the loser
    /// is silently ignored.
    pub fn insert_verse_of_day(&self, row: &VerseOfDayRow) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO verse_of_the_day
                 (id, date, version, book, chapter, verse, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                Uuid::new_v4().to_string(),
                row.date.to_string(),
                row.version,
                row.book,
                row.chapter,
                row.verse,
                row.text,
                row.created_at.to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    // Chapter audio cache

    pub fn get_chapter_audio(
        &self,
        book_name: &str,
        chapter: u32,
        version: &str,
    ) -> Result<Option<ChapterAudio>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT book_name, chapter, version, audio_url, duration, generated_at
                 FROM chapter_audio WHERE book_name = ?1 AND chapter = ?2 AND version = ?3",
                params![book_name, chapter, version],
                chapter_audio_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// At most one row per (book_name, chapter, version); a racing second
    /// writer loses silently.
    pub fn insert_chapter_audio(&self, audio: &NewChapterAudio) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT INTO chapter_audio
                 (id, book_name, chapter, version, audio_url, duration, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(book_name, chapter, version) DO NOTHING",
            params![
                Uuid::new_v4().to_string(),
                audio.book_name,
                audio.chapter,
                audio.version,
                audio.audio_url,
                audio.duration,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    // Image presets

    pub fn get_presets(&self, category: Option<&str>) -> Result<Vec<ImagePreset>> {
        let conn = self.conn.lock().unwrap();
        let mut query = String::from(
            "SELECT id, name, image_url, category, tags, sort_order, is_active, created_at
             FROM image_presets WHERE is_active = 1",
        );
        if category.is_some() {
            query.push_str(" AND category = ?1");
        }
        query.push_str(" ORDER BY sort_order ASC");

        let mut stmt = conn.prepare(&query)?;
        let presets = match category {
            Some(cat) => stmt
                .query_map(params![cat], preset_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], preset_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };
        Ok(presets)
    }

    pub fn create_preset(&self, input: CreatePresetInput) -> Result<ImagePreset> {
        let preset = ImagePreset {
            id: Uuid::new_v4(),
            name: input.name,
            image_url: input.image_url,
            category: input.category,
            tags: input.tags.unwrap_or_default(),
            sort_order: input.sort_order.unwrap_or(0),
            is_active: true,
            created_at: Utc::now(),
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO image_presets
                 (id, name, image_url, category, tags, sort_order, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                preset.id.to_string(),
                preset.name,
                preset.image_url,
                preset.category,
                serde_json::to_string(&preset.tags)?,
                preset.sort_order,
                preset.is_active,
                preset.created_at.to_rfc3339(),
            ],
        )
        .map_err(map_constraint)?;
        Ok(preset)
    }

    pub fn delete_preset(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM image_presets WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    // Favorites

    pub fn get_favorites(&self, user_id: &str) -> Result<Vec<Favorite>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, book, chapter, verse, version, text, created_at
             FROM favorites WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let favorites = stmt
            .query_map(params![user_id], favorite_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(favorites)
    }

    /// Duplicate (user, book, chapter, verse, version) is a conflict, not an
    /// overwrite; the original row is left untouched.
    pub fn create_favorite(&self, input: CreateFavoriteInput) -> Result<Favorite> {
        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            book: input.book,
            chapter: input.chapter,
            verse: input.verse,
            version: input.version,
            text: input.text,
            created_at: Utc::now(),
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO favorites (id, user_id, book, chapter, verse, version, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                favorite.id.to_string(),
                favorite.user_id,
                favorite.book,
                favorite.chapter,
                favorite.verse,
                favorite.version,
                favorite.text,
                favorite.created_at.to_rfc3339(),
            ],
        )
        .map_err(map_constraint)?;
        Ok(favorite)
    }

    pub fn delete_favorite(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM favorites WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    // AI usage counters

    /// Atomic read-then-increment for the daily per-user quota. Runs in a
    /// single transaction so two concurrent calls cannot both pass a
    /// ceiling of N with count == N - 1.
    pub fn check_and_increment_ai_usage(
        &self,
        user_id: &str,
        date: NaiveDate,
        ceiling: i64,
    ) -> Result<UsageDecision> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let count: i64 = tx
            .query_row(
                "SELECT count FROM ai_usage WHERE user_id = ?1 AND date = ?2",
                params![user_id, date.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);

        if count >= ceiling {
            return Ok(UsageDecision::Exceeded { count });
        }

        tx.execute(
            "INSERT INTO ai_usage (user_id, date, count) VALUES (?1, ?2, 1)
             ON CONFLICT(user_id, date) DO UPDATE SET count = count + 1",
            params![user_id, date.to_string()],
        )?;
        tx.commit()?;
        Ok(UsageDecision::Allowed { count: count + 1 })
    }

    pub fn get_ai_usage(&self, user_id: &str, date: NaiveDate) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn
            .query_row(
                "SELECT count FROM ai_usage WHERE user_id = ?1 AND date = ?2",
                params![user_id, date.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);
        Ok(count)
    }
}

fn map_constraint(err: rusqlite::Error) -> DbError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Duplicate
        }
        _ => DbError::Sqlite(err),
    }
}

fn themed_verse_from_row(row: &Row) -> rusqlite::Result<ThemedVerseEntry> {
    let theme_str: String = row.get(4)?;
    let theme = Theme::from_str(&theme_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown theme: {theme_str}").into(),
        )
    })?;
    Ok(ThemedVerseEntry {
        reference_code: row.get(0)?,
        book: row.get(1)?,
        chapter: row.get(2)?,
        verse: row.get(3)?,
        theme,
    })
}

fn votd_from_row(row: &Row) -> rusqlite::Result<VerseOfDayRow> {
    Ok(VerseOfDayRow {
        date: parse_date(row, 0)?,
        version: row.get(1)?,
        book: row.get(2)?,
        chapter: row.get(3)?,
        verse: row.get(4)?,
        text: row.get(5)?,
        created_at: parse_datetime(row, 6)?,
    })
}

fn chapter_audio_from_row(row: &Row) -> rusqlite::Result<ChapterAudio> {
    Ok(ChapterAudio {
        book_name: row.get(0)?,
        chapter: row.get(1)?,
        version: row.get(2)?,
        audio_url: row.get(3)?,
        duration: row.get(4)?,
        generated_at: parse_datetime(row, 5)?,
    })
}

fn preset_from_row(row: &Row) -> rusqlite::Result<ImagePreset> {
    let tags_json: String = row.get(4)?;
    let tags = serde_json::from_str(&tags_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
    })?;
    Ok(ImagePreset {
        id: parse_uuid(row, 0)?,
        name: row.get(1)?,
        image_url: row.get(2)?,
        category: row.get(3)?,
        tags,
        sort_order: row.get(5)?,
        is_active: row.get(6)?,
        created_at: parse_datetime(row, 7)?,
    })
}

fn favorite_from_row(row: &Row) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        id: parse_uuid(row, 0)?,
        user_id: row.get(1)?,
        book: row.get(2)?,
        chapter: row.get(3)?,
        verse: row.get(4)?,
        version: row.get(5)?,
        text: row.get(6)?,
        created_at: parse_datetime(row, 7)?,
    })
}

fn parse_uuid(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    s.parse()
        .map_err(|e: uuid::Error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    s.parse().map_err(|e: chrono::ParseError| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

fn parse_datetime(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn sample_votd(date: NaiveDate, version: &str) -> VerseOfDayRow {
        VerseOfDayRow {
            date,
            version: version.to_string(),
            book: "John".to_string(),
            chapter: 3,
            verse: 16,
            text: "For God so loved the world".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn migrate_is_idempotent() {
        let db = test_db();
        db.migrate().unwrap();
    }

    #[test]
    fn every_theme_has_seeded_candidates() {
        let db = test_db();
        for day in 0..7 {
            let theme = Theme::for_weekday(day);
            let entries = db.get_themed_verses(theme).unwrap();
            assert!(!entries.is_empty(), "no candidates for {}", theme.as_str());
            for entry in &entries {
                assert_eq!(entry.theme, theme);
            }
        }
    }

    #[test]
    fn votd_cache_keeps_one_row_per_date_version() {
        let db = test_db();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        assert!(db.insert_verse_of_day(&sample_votd(date, "WEB")).unwrap());
        // Second writer loses silently
        let mut second = sample_votd(date, "WEB");
        second.text = "different text from a racing writer".to_string();
        assert!(!db.insert_verse_of_day(&second).unwrap());

        let cached = db.get_verse_of_day(date, "WEB").unwrap().unwrap();
        assert_eq!(cached.text, "For God so loved the world");

        // A different translation is a distinct key
        assert!(db.insert_verse_of_day(&sample_votd(date, "KJV")).unwrap());
    }

    #[test]
    fn votd_reference_is_rebuilt_from_parts() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let verse = sample_votd(date, "WEB").into_verse();
        assert_eq!(verse.reference, "John 3:16");
    }

    #[test]
    fn chapter_audio_is_at_most_one_row_per_key() {
        let db = test_db();
        let audio = NewChapterAudio {
            book_name: "Psalms".to_string(),
            chapter: 23,
            version: "WEB".to_string(),
            audio_url: "https://store.example/audio/psalms-23.mp3".to_string(),
            duration: 94.5,
        };
        assert!(db.insert_chapter_audio(&audio).unwrap());
        assert!(!db.insert_chapter_audio(&audio).unwrap());

        let cached = db.get_chapter_audio("Psalms", 23, "WEB").unwrap().unwrap();
        assert_eq!(cached.audio_url, "https://store.example/audio/psalms-23.mp3");
        assert!(db.get_chapter_audio("Psalms", 24, "WEB").unwrap().is_none());
    }

    #[test]
    fn duplicate_favorite_is_a_conflict() {
        let db = test_db();
        let input = CreateFavoriteInput {
            user_id: "user-1".to_string(),
            book: "John".to_string(),
            chapter: 3,
            verse: 16,
            version: "WEB".to_string(),
            text: "For God so loved the world".to_string(),
        };
        let first = db.create_favorite(input.clone()).unwrap();
        let err = db.create_favorite(input).unwrap_err();
        assert!(matches!(err, DbError::Duplicate));

        // First row unaffected
        let favorites = db.get_favorites("user-1").unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, first.id);
    }

    #[test]
    fn delete_favorite_reports_missing_rows() {
        let db = test_db();
        assert!(!db.delete_favorite(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn preset_names_are_unique() {
        let db = test_db();
        let input = CreatePresetInput {
            name: "mountain-sunrise".to_string(),
            image_url: "https://store.example/presets/mountain.jpg".to_string(),
            category: "nature".to_string(),
            tags: Some(vec!["mountain".to_string()]),
            sort_order: Some(2),
        };
        db.create_preset(input.clone()).unwrap();
        assert!(matches!(db.create_preset(input), Err(DbError::Duplicate)));
    }

    #[test]
    fn presets_filter_by_category_and_sort_order() {
        let db = test_db();
        for (name, category, order) in [
            ("b", "nature", 2),
            ("a", "nature", 1),
            ("c", "abstract", 0),
        ] {
            db.create_preset(CreatePresetInput {
                name: name.to_string(),
                image_url: format!("https://store.example/{name}.jpg"),
                category: category.to_string(),
                tags: None,
                sort_order: Some(order),
            })
            .unwrap();
        }
        let nature = db.get_presets(Some("nature")).unwrap();
        assert_eq!(
            nature.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(db.get_presets(None).unwrap().len(), 3);
    }

    #[test]
    fn usage_counter_enforces_ceiling_at_exact_boundary() {
        let db = test_db();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        for expected in 1..=9 {
            let decision = db.check_and_increment_ai_usage("user-1", date, 10).unwrap();
            assert_eq!(decision, UsageDecision::Allowed { count: expected });
        }
        // count == 9 succeeds and is counted as 10 afterward
        assert_eq!(
            db.check_and_increment_ai_usage("user-1", date, 10).unwrap(),
            UsageDecision::Allowed { count: 10 }
        );
        // count == 10 is rejected and not incremented
        assert_eq!(
            db.check_and_increment_ai_usage("user-1", date, 10).unwrap(),
            UsageDecision::Exceeded { count: 10 }
        );
        assert_eq!(db.get_ai_usage("user-1", date).unwrap(), 10);
    }

    #[test]
    fn usage_counter_is_scoped_per_user_and_day() {
        let db = test_db();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

        db.check_and_increment_ai_usage("user-1", date, 10).unwrap();
        assert_eq!(db.get_ai_usage("user-2", date).unwrap(), 0);
        assert_eq!(db.get_ai_usage("user-1", next).unwrap(), 0);
    }
}
