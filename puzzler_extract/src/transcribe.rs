//! Speech-to-text for uploaded lecture recordings.
//!
//! Files are sent whole to the OpenAI Whisper API
//! (`POST /v1/audio/transcriptions`) and the plain transcript is returned.

use puzzler_core::{ExtractError, MediaFile};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// API base URL (without trailing slash)
    #[serde(default = "TranscriptionConfig::default_base_url")]
    pub base_url: String,

    /// Whisper model identifier
    #[serde(default = "TranscriptionConfig::default_model")]
    pub model: String,

    /// Optional language hint (e.g. `en`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TranscriptionConfig {
    fn default_base_url() -> String {
        "https://api.openai.com".to_string()
    }

    fn default_model() -> String {
        "whisper-1".to_string()
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            language: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WhisperJsonResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WhisperErrorResponse {
    error: WhisperErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WhisperErrorDetail {
    message: String,
}

/// MIME type guessed from the file extension.
fn media_content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mpeg" | "mpga" => "video/mpeg",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Whisper API client.
pub struct WhisperTranscriber {
    client: Client,
    api_key: Option<String>,
    config: TranscriptionConfig,
}

impl WhisperTranscriber {
    pub fn new(api_key: Option<String>, config: TranscriptionConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            config,
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Text fields sent next to the file.
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("model", self.config.model.clone()),
            ("response_format", "json".to_string()),
        ];
        if let Some(language) = &self.config.language {
            fields.push(("language", language.clone()));
        }
        fields
    }

    fn build_form(&self, media: &MediaFile) -> Result<Form, ExtractError> {
        let file = Part::bytes(media.bytes.clone())
            .file_name(media.file_name.clone())
            .mime_str(media_content_type(&media.file_name))
            .map_err(|e| ExtractError::Transcription(e.to_string()))?;

        Ok(self
            .form_fields()
            .into_iter()
            .fold(Form::new().part("file", file), |form, (name, value)| {
                form.text(name, value)
            }))
    }

    /// Best-effort transcript of the recording.
    pub async fn transcribe(&self, media: &MediaFile) -> Result<String, ExtractError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ExtractError::Transcription(
                "no OpenAI API key configured (set OPENAI_API_KEY)".to_string(),
            ));
        };
        if media.bytes.is_empty() {
            return Err(ExtractError::Transcription(format!(
                "{} is empty",
                media.file_name
            )));
        }

        info!(
            "Transcribing {} ({} bytes) with {}",
            media.file_name,
            media.bytes.len(),
            self.config.model
        );

        let form = self.build_form(media)?;
        let response = self
            .client
            .post(format!(
                "{}/v1/audio/transcriptions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        parse_transcription(status.as_u16(), status.is_success(), &text)
    }
}

fn parse_transcription(status: u16, success: bool, body: &str) -> Result<String, ExtractError> {
    if !success {
        let message = serde_json::from_str::<WhisperErrorResponse>(body)
            .map_or_else(|_| body.to_string(), |e| e.error.message);
        return Err(ExtractError::Transcription(format!("HTTP {status}: {message}")));
    }

    let parsed: WhisperJsonResponse =
        serde_json::from_str(body).map_err(|e| ExtractError::Transcription(e.to_string()))?;
    Ok(parsed.text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(name: &str, bytes: &[u8]) -> MediaFile {
        MediaFile {
            file_name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(media_content_type("lecture.MP4"), "video/mp4");
        assert_eq!(media_content_type("notes.m4a"), "audio/mp4");
        assert_eq!(media_content_type("noext"), "application/octet-stream");
    }

    #[test]
    fn form_carries_model_format_and_language() {
        let transcriber = WhisperTranscriber::new(
            Some("key".to_string()),
            TranscriptionConfig {
                language: Some("en".to_string()),
                ..TranscriptionConfig::default()
            },
        );
        assert_eq!(
            transcriber.form_fields(),
            vec![
                ("model", "whisper-1".to_string()),
                ("response_format", "json".to_string()),
                ("language", "en".to_string()),
            ]
        );

        let Ok(form) = transcriber.build_form(&media("talk \"1\".mp4", b"AUDIO")) else {
            panic!("form must build for a known media type");
        };
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn language_is_omitted_when_unset() {
        let transcriber = WhisperTranscriber::new(None, TranscriptionConfig::default());
        let names: Vec<&str> = transcriber.form_fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["model", "response_format"]);
    }

    #[test]
    fn parses_transcript_and_errors() {
        let ok = parse_transcription(200, true, r#"{"text": " Today we cover cells. "}"#);
        assert_eq!(ok.ok().as_deref(), Some("Today we cover cells."));

        let err = parse_transcription(
            401,
            false,
            r#"{"error": {"message": "Incorrect API key", "type": "invalid_request_error"}}"#,
        );
        match err {
            Err(ExtractError::Transcription(msg)) => assert_eq!(msg, "HTTP 401: Incorrect API key"),
            other => panic!("expected transcription error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let transcriber = WhisperTranscriber::new(Some("  ".to_string()), TranscriptionConfig::default());
        assert!(!transcriber.is_configured());

        let result = transcriber.transcribe(&media("talk.mp4", b"AUDIO")).await;
        assert!(matches!(result, Err(ExtractError::Transcription(_))));
    }

    #[tokio::test]
    async fn empty_file_fails_without_request() {
        let transcriber = WhisperTranscriber::new(Some("key".to_string()), TranscriptionConfig::default());
        let result = transcriber.transcribe(&media("talk.mp4", b"")).await;
        assert!(matches!(result, Err(ExtractError::Transcription(_))));
    }
}
