use thiserror::Error;

/// Failures of the conversation state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No lecture material provided")]
    EmptyInput,

    #[error("The initial question has already been generated")]
    AlreadyStarted,

    #[error("There is no open question to answer")]
    NoOpenQuestion,

    #[error("Answer is blank")]
    BlankAnswer,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Failures of the question generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The API answered with a status other than 200.
    #[error("Error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Request to the generation API failed: {0}")]
    Transport(String),

    #[error("Unexpected response from the generation API: {0}")]
    MalformedResponse(String),
}

/// Failures while turning one lecture source into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No English captions available for video {video_id}")]
    NoCaptions { video_id: String },

    #[error("Not a YouTube video link: {0}")]
    InvalidYouTubeUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Message shown to the user in place of the failed source.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoCaptions { .. } => "This video doesn't seem to have captions. Please try another video or upload the file manually".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_renders_status_and_body() {
        let err = GenerationError::Api {
            status: 403,
            body: "{\"error\":\"denied\"}".to_string(),
        };
        assert_eq!(err.to_string(), "Error: 403 - {\"error\":\"denied\"}");
    }

    #[test]
    fn session_error_is_transparent_over_generation() {
        let err = SessionError::from(GenerationError::Api {
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "Error: 500 - boom");
    }

    #[test]
    fn no_captions_has_friendly_message() {
        let err = ExtractError::NoCaptions {
            video_id: "abc".to_string(),
        };
        assert!(err.user_message().starts_with("This video doesn't seem to have captions"));

        let err = ExtractError::Network("timed out".to_string());
        assert_eq!(err.user_message(), "Network error: timed out");
    }
}
