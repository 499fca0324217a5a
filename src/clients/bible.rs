use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use anchor_core::models::{Chapter, ChapterVerse, Verse};

use crate::error::ApiError;

use super::VerseProvider;

const BIBLE_API_URL: &str = "https://rest.api.bible/v1";

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s+(\d+):(\d+)").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub abbreviation: &'static str,
}

/// The translations the app exposes.
pub fn available_versions() -> Vec<VersionInfo> {
    vec![
        VersionInfo { id: "WEB", name: "World English Bible", abbreviation: "WEB" },
        VersionInfo { id: "KJV", name: "King James Version", abbreviation: "KJV" },
        VersionInfo { id: "ASV", name: "American Standard Version", abbreviation: "ASV" },
        VersionInfo { id: "FBV", name: "Free Bible Version", abbreviation: "FBV" },
    ]
}

#[derive(Debug, Deserialize)]
struct VerseEnvelope {
    data: VerseData,
}

#[derive(Debug, Deserialize)]
struct VerseData {
    content: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct ChapterVersesEnvelope {
    data: Vec<ChapterVerseData>,
}

#[derive(Debug, Deserialize)]
struct ChapterVerseData {
    id: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    verses: Vec<SearchVerse>,
}

#[derive(Debug, Deserialize)]
struct SearchVerse {
    text: String,
    reference: String,
}

/// Client for the rest.api.bible text provider.
pub struct BibleClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl BibleClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");
        Self {
            client,
            api_key,
            base_url: BIBLE_API_URL.to_string(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: Some(status),
                detail,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl VerseProvider for BibleClient {
    async fn get_verse(&self, reference: &str, version: &str) -> Result<Verse, ApiError> {
        let bible_id = version_id(version);
        let url = format!("{}/bibles/{}/verses/{}", self.base_url, bible_id, reference);
        let response = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .query(&[("content-type", "text")])
            .send()
            .await?;

        let envelope: VerseEnvelope = Self::check(response).await?.json().await?;
        Ok(normalize_verse(
            &envelope.data.content,
            &envelope.data.reference,
            version,
        ))
    }

    async fn get_chapter(
        &self,
        book_name: &str,
        chapter: u32,
        version: &str,
    ) -> Result<Chapter, ApiError> {
        let bible_id = version_id(version);
        let chapter_id = format!("{}.{}", book_code(book_name), chapter);
        let url = format!(
            "{}/bibles/{}/chapters/{}/verses",
            self.base_url, bible_id, chapter_id
        );
        let response = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        let envelope: ChapterVersesEnvelope = Self::check(response).await?.json().await?;
        let verses: Vec<ChapterVerse> = envelope
            .data
            .into_iter()
            .filter_map(|v| {
                // Verse number is the trailing segment of the id ("GEN.1.1")
                let number: u32 = v.id.rsplit('.').next()?.parse().ok()?;
                let text = v.content.or(v.text)?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    tracing::warn!(verse_id = %v.id, "skipping verse with no text");
                    return None;
                }
                Some(ChapterVerse { number, text })
            })
            .collect();

        tracing::debug!(count = verses.len(), book = book_name, chapter, "parsed chapter verses");

        Ok(Chapter {
            verses,
            reference: format!("{} {}", book_name, chapter),
            version: version.to_string(),
        })
    }

    async fn search(
        &self,
        query: &str,
        version: &str,
        limit: u32,
    ) -> Result<Vec<Verse>, ApiError> {
        let bible_id = version_id(version);
        let url = format!("{}/bibles/{}/search", self.base_url, bible_id);
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("content-type", "text"),
            ])
            .send()
            .await?;

        let envelope: SearchEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope
            .data
            .verses
            .into_iter()
            .map(|v| normalize_verse(&v.text, &v.reference, version))
            .collect())
    }
}

/// Strip provider markup and split the reference into its parts.
fn normalize_verse(content: &str, reference: &str, version: &str) -> Verse {
    let text = MARKUP.replace_all(content, "").trim().to_string();
    let (book, chapter, verse) = parse_reference(reference);
    Verse {
        text,
        reference: reference.to_string(),
        book,
        chapter,
        verse,
        version: version.to_string(),
    }
}

/// Split "1 John 4:19" into ("1 John", 4, 19). Unparseable parts become 0,
/// matching how the provider reference is treated as display-first data.
fn parse_reference(reference: &str) -> (String, u32, u32) {
    match REFERENCE.captures(reference) {
        Some(caps) => {
            let book = caps[1].to_string();
            let chapter = caps[2].parse().unwrap_or(0);
            let verse = caps[3].parse().unwrap_or(0);
            (book, chapter, verse)
        }
        None => (reference.to_string(), 0, 0),
    }
}

/// Translation abbreviation to provider bible id. Unknown versions fall back
/// to WEB.
fn version_id(version: &str) -> &'static str {
    match version.to_uppercase().as_str() {
        "KJV" => "de4e12af7f28f599-02",
        "ASV" => "06125adad2d5898a-01",
        "FBV" => "65eec8e0b60e656b-01",
        _ => "9879dbb7cfe39e4d-02", // WEB
    }
}

/// Book display name to the provider's book code.
fn book_code(book_name: &str) -> &'static str {
    match book_name {
        "Genesis" => "GEN",
        "Exodus" => "EXO",
        "Leviticus" => "LEV",
        "Numbers" => "NUM",
        "Deuteronomy" => "DEU",
        "Joshua" => "JOS",
        "Judges" => "JDG",
        "Ruth" => "RUT",
        "1 Samuel" => "1SA",
        "2 Samuel" => "2SA",
        "1 Kings" => "1KI",
        "2 Kings" => "2KI",
        "1 Chronicles" => "1CH",
        "2 Chronicles" => "2CH",
        "Ezra" => "EZR",
        "Nehemiah" => "NEH",
        "Esther" => "EST",
        "Job" => "JOB",
        "Psalms" => "PSA",
        "Proverbs" => "PRO",
        "Ecclesiastes" => "ECC",
        "Song of Solomon" => "SNG",
        "Isaiah" => "ISA",
        "Jeremiah" => "JER",
        "Lamentations" => "LAM",
        "Ezekiel" => "EZK",
        "Daniel" => "DAN",
        "Hosea" => "HOS",
        "Joel" => "JOL",
        "Amos" => "AMO",
        "Obadiah" => "OBA",
        "Jonah" => "JON",
        "Micah" => "MIC",
        "Nahum" => "NAM",
        "Habakkuk" => "HAB",
        "Zephaniah" => "ZEP",
        "Haggai" => "HAG",
        "Zechariah" => "ZEC",
        "Malachi" => "MAL",
        "Matthew" => "MAT",
        "Mark" => "MRK",
        "Luke" => "LUK",
        "John" => "JHN",
        "Acts" => "ACT",
        "Romans" => "ROM",
        "1 Corinthians" => "1CO",
        "2 Corinthians" => "2CO",
        "Galatians" => "GAL",
        "Ephesians" => "EPH",
        "Philippians" => "PHP",
        "Colossians" => "COL",
        "1 Thessalonians" => "1TH",
        "2 Thessalonians" => "2TH",
        "1 Timothy" => "1TI",
        "2 Timothy" => "2TI",
        "Titus" => "TIT",
        "Philemon" => "PHM",
        "Hebrews" => "HEB",
        "James" => "JAS",
        "1 Peter" => "1PE",
        "2 Peter" => "2PE",
        "1 John" => "1JN",
        "2 John" => "2JN",
        "3 John" => "3JN",
        "Jude" => "JUD",
        "Revelation" => "REV",
        _ => "GEN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_provider_markup() {
        let verse = normalize_verse(
            "<p class=\"p\"><span data-number=\"16\">16</span>For God so loved the world</p>",
            "John 3:16",
            "WEB",
        );
        assert_eq!(verse.text, "16For God so loved the world");
        assert!(!verse.text.contains('<'));
    }

    #[test]
    fn parses_simple_reference() {
        assert_eq!(parse_reference("John 3:16"), ("John".to_string(), 3, 16));
    }

    #[test]
    fn parses_numbered_book_reference() {
        assert_eq!(parse_reference("1 John 4:19"), ("1 John".to_string(), 4, 19));
    }

    #[test]
    fn unparseable_reference_keeps_display_text() {
        let (book, chapter, verse) = parse_reference("Jude");
        assert_eq!(book, "Jude");
        assert_eq!((chapter, verse), (0, 0));
    }

    #[test]
    fn unknown_version_falls_back_to_web() {
        assert_eq!(version_id("web"), version_id("NOPE"));
        assert_ne!(version_id("KJV"), version_id("WEB"));
    }

    #[test]
    fn unknown_book_falls_back_to_genesis() {
        assert_eq!(book_code("Atlantis"), "GEN");
        assert_eq!(book_code("Song of Solomon"), "SNG");
    }
}
