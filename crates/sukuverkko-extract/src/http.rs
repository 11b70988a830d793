//! HTTP-backed [`StructuredExtractor`] for an OpenAI-compatible chat
//! completion endpoint. The prompt instructs the model to return the
//! family record as JSON matching the schema [`crate::normalize_response`]
//! validates; this adapter submits the request and returns whatever text
//! the model answered with, unparsed.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sukuverkko_core::FamilyId;

use crate::{ExtractError, StructuredExtractor};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const SYSTEM_PROMPT: &str = "\
You transcribe Finnish parish genealogical family records into structured JSON. \
Given the source text of one family record, return a single JSON object with keys \
`pageReferences`, `couples` (each with `husband`, `wife`, `marriageDate`, `children`, \
`coupleNotes`), `notes`, and `noteDefinitions`. Preserve dates, spellings, and note \
markers exactly as written. Respond with the JSON object only.";

/// Talks to an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpStructuredExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl HttpStructuredExtractor {
    /// Builds an extractor with the default base URL and a 120s timeout
    /// (spec default).
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(api_key, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Builds an extractor with an explicit request timeout.
    pub fn with_timeout(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client builder never fails on these settings"),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points this extractor at an OpenAI-compatible endpoint other than
    /// `api.openai.com`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl StructuredExtractor for HttpStructuredExtractor {
    async fn extract(&self, family_id: &FamilyId, text: &str) -> Result<String, ExtractError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: 0.0,
        };

        tracing::debug!(family_id = %family_id, chars = text.len(), "submitting extraction request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let chat_response: ChatResponse = response
            .error_for_status()
            .map_err(classify_transport_error)?
            .json()
            .await
            .map_err(|e| ExtractError::Transport(format!("malformed chat completion response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ExtractError::Transport("chat completion returned no choices".to_string()))
    }
}

fn classify_transport_error(err: reqwest::Error) -> ExtractError {
    if err.is_timeout() {
        ExtractError::Timeout
    } else {
        ExtractError::Transport(err.to_string())
    }
}
