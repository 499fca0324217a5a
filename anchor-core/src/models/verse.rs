use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Theme;

/// A fully resolved verse as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verse {
    pub text: String,
    pub reference: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub version: String,
}

/// One verse within a chapter listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterVerse {
    pub number: u32,
    pub text: String,
}

/// A whole chapter as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub verses: Vec<ChapterVerse>,
    pub reference: String,
    pub version: String,
}

/// Row in the static themed reference table. Read-only at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemedVerseEntry {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub theme: Theme,
    pub reference_code: String,
}

/// Cached verse of the day, uniquely keyed by (date, version).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseOfDayRow {
    pub date: NaiveDate,
    pub version: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl VerseOfDayRow {
    /// Reconstruct the client-facing verse, rebuilding the reference string.
    pub fn into_verse(self) -> Verse {
        let reference = format!("{} {}:{}", self.book, self.chapter, self.verse);
        Verse {
            text: self.text,
            reference,
            book: self.book,
            chapter: self.chapter,
            verse: self.verse,
            version: self.version,
        }
    }
}
