use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

use super::SpeechProvider;

const SPEECHIFY_API_URL: &str = "https://api.sws.speechify.com/v1/audio/speech";
const VOICE_ID: &str = "henry";
const TTS_MODEL: &str = "simba-english";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    input: &'a str,
    voice_id: &'a str,
    model: &'a str,
    audio_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    /// Base64-encoded MP3 payload.
    audio_data: String,
}

/// Text-to-speech client. Synthesis is synchronous from the caller's point
/// of view; long chapters take a while, so the timeout is generous.
pub struct SpeechifyClient {
    client: Client,
    api_key: String,
}

impl SpeechifyClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create HTTP client");
        Self { client, api_key }
    }
}

#[async_trait]
impl SpeechProvider for SpeechifyClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ApiError> {
        let request = SpeechRequest {
            input: text,
            voice_id: VOICE_ID,
            model: TTS_MODEL,
            audio_format: "mp3",
        };

        let response = self
            .client
            .post(SPEECHIFY_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: Some(status),
                detail,
            });
        }

        let speech: SpeechResponse = response.json().await?;
        base64::engine::general_purpose::STANDARD
            .decode(&speech.audio_data)
            .map_err(|e| ApiError::Upstream {
                status: None,
                detail: format!("invalid audio payload: {e}"),
            })
    }
}
