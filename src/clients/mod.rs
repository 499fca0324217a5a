//! HTTP clients for the external providers. Each sits behind a trait so the
//! services can be exercised against stubs.

mod bible;
mod openai;
mod speechify;
mod storage;

pub use bible::{available_versions, BibleClient, VersionInfo};
pub use openai::OpenAiClient;
pub use speechify::SpeechifyClient;
pub use storage::StorageClient;

use async_trait::async_trait;

use anchor_core::models::{Chapter, Verse};

use crate::error::ApiError;

#[async_trait]
pub trait VerseProvider: Send + Sync {
    /// Fetch a single verse by provider reference code, markup stripped.
    async fn get_verse(&self, reference: &str, version: &str) -> Result<Verse, ApiError>;

    /// Fetch a whole chapter as numbered verses.
    async fn get_chapter(
        &self,
        book_name: &str,
        chapter: u32,
        version: &str,
    ) -> Result<Chapter, ApiError>;

    /// Full-text search over the translation.
    async fn search(&self, query: &str, version: &str, limit: u32)
        -> Result<Vec<Verse>, ApiError>;
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn explain_verse(&self, verse: &str, reference: &str) -> Result<String, ApiError>;

    async fn related_verses(&self, verse: &str) -> Result<Vec<String>, ApiError>;

    async fn study_questions(&self, verse: &str, reference: &str)
        -> Result<Vec<String>, ApiError>;
}

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize spoken audio for the given text, returning MP3 bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ApiError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a blob and return its public URL.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError>;
}
