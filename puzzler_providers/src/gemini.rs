use async_trait::async_trait;
use puzzler_core::{
    ConversationTurn, GenerationError, QuestionGenerator, build_confused_student_prompt,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

// ---------------------------------------------------------------------------
// Gemini API wire types
// ---------------------------------------------------------------------------

/// Body sent to `generateContent`: `{"contents":[{"parts":[{"text": ...}]}]}`.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl GenerateContentRequest {
    fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: Some(prompt) }],
            }],
        }
    }
}

/// Turn a `generateContent` reply into question text.
///
/// Only a 200 counts as success; the first candidate's first text part is
/// returned trimmed.
fn parse_generate_response(status: StatusCode, body: &str) -> Result<String, GenerationError> {
    if status != StatusCode::OK {
        return Err(GenerationError::Api {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            GenerationError::MalformedResponse("missing candidates[0].content.parts[0].text".into())
        })
}

// ============================================================================
// GeminiProvider
// ============================================================================

/// Question generator backed by Google's Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    pub fn new(api_key: String) -> Self {
        info!("Creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        if !model.is_empty() {
            self.model = model;
        }
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// `{base}/models/{model}:generateContent?key={api_key}`
    fn endpoint(&self) -> Result<Url, GenerationError> {
        let path = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        Url::parse_with_params(&path, &[("key", self.api_key.as_str())])
            .map_err(|e| GenerationError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &GenerateContentRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint()?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        debug!("Gemini replied with status {status} ({} bytes)", body.len());
        parse_generate_response(status, &body)
    }
}

#[async_trait]
impl QuestionGenerator for GeminiProvider {
    async fn ask(
        &self,
        source_text: &str,
        history: &[ConversationTurn],
    ) -> Result<String, GenerationError> {
        let prompt = build_confused_student_prompt(source_text, history);
        info!(
            "Sending request to Gemini API: model={}, history={} turns",
            self.model,
            history.len()
        );

        let question = self
            .try_send(&GenerateContentRequest::from_prompt(prompt))
            .await?;

        info!("Received response from Gemini API");
        Ok(question)
    }
}
