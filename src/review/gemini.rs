use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{GenerationError, ReviewGenerator};
use crate::config::{GenAiConfig, HttpConfig};

/// Google Gemini `generateContent` client.
///
/// The HTTP client is built per call, so a client that cannot be built
/// surfaces as a [`GenerationError`] and ends up in the fallback comment.
pub struct GeminiClient {
    timeout: Duration,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts joined.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    pub fn new(config: &GenAiConfig, http: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(http.timeout_secs),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        )
    }
}

#[async_trait]
impl ReviewGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_bytes = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        debug!("requesting generated review");
        let response = client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "generation request rejected");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .json::<GenerateContentResponse>()
            .await?
            .into_text()
            .ok_or(GenerationError::EmptyResponse)?;
        debug!(text_bytes = text.len(), "received generated review");
        Ok(text)
    }
}
