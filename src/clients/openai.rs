use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::ApiError;

use super::AiProvider;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";

static LEADING_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// LLM client for verse explanations, related references and study questions.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create HTTP client");
        Self { client, api_key }
    }

    async fn complete(
        &self,
        system: &str,
        user: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ApiError> {
        let request = ChatRequest {
            model: OPENAI_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
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

        let completion: ChatResponse = response.json().await?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl AiProvider for OpenAiClient {
    async fn explain_verse(&self, verse: &str, reference: &str) -> Result<String, ApiError> {
        let system = "You are a knowledgeable and encouraging Bible scholar. Explain scripture in an accessible way with:\n\
            1. Historical context\n\
            2. Theological significance\n\
            3. Practical application for modern life\n\
            Keep responses concise (3-4 paragraphs) and encouraging.";
        let user = format!("Please explain this Bible verse: \"{verse}\" ({reference})");

        let explanation = self.complete(system, user, 500, 0.7).await?;
        if explanation.is_empty() {
            return Ok("Unable to generate explanation at this time.".to_string());
        }
        Ok(explanation)
    }

    async fn related_verses(&self, verse: &str) -> Result<Vec<String>, ApiError> {
        let system = "You are a Bible scholar. Suggest 5 related verses that share similar \
            themes or provide complementary insight. Return ONLY the references in format \
            \"Book Chapter:Verse\", one per line, no additional text.";
        let user = format!("Find related verses for: \"{verse}\"");

        let response = self.complete(system, user, 200, 0.7).await?;
        Ok(response
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(5)
            .map(String::from)
            .collect())
    }

    async fn study_questions(
        &self,
        verse: &str,
        reference: &str,
    ) -> Result<Vec<String>, ApiError> {
        let system = "You are a Bible study leader. Create 3-5 thoughtful discussion questions \
            that help people reflect deeply on scripture. Questions should encourage personal \
            application and deeper understanding.";
        let user = format!("Create study questions for: \"{verse}\" ({reference})");

        let response = self.complete(system, user, 300, 0.8).await?;
        Ok(response
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && line.contains('?'))
            .map(|line| LEADING_NUMBERING.replace(line, "").to_string())
            .collect())
    }
}
