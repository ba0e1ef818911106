#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod material;
pub mod prompt;

pub use error::{ExtractError, GenerationError, SessionError};
pub use material::{
    LectureMaterial, MediaFile, SourceAssembly, SourceFailure, SourceKind, assemble_source_text,
};
pub use prompt::{build_confused_student_prompt, format_history};

/// Number of questions a session asks before it stops.
pub const DEFAULT_TURN_LIMIT: usize = 5;

/// One question from the student and the human's answer to it.
///
/// The answer stays empty until the human responds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

impl ConversationTurn {
    /// Open a turn with no answer yet.
    #[must_use]
    pub fn open(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: String::new(),
        }
    }

    #[must_use]
    pub fn answered(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    #[must_use]
    pub const fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }
}

/// Produces the next confused-student question.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Ask for one question grounded in `source_text`, given every prior
    /// turn in chronological order (empty for the opening question).
    async fn ask(
        &self,
        source_text: &str,
        history: &[ConversationTurn],
    ) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T: QuestionGenerator + ?Sized> QuestionGenerator for std::sync::Arc<T> {
    async fn ask(
        &self,
        source_text: &str,
        history: &[ConversationTurn],
    ) -> Result<String, GenerationError> {
        (**self).ask(source_text, history).await
    }
}

/// Turns raw lecture material into plain text.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    fn from_plain_text(&self, text: &str) -> String {
        text.trim().to_string()
    }

    /// Page texts joined with newlines; pages without text are skipped.
    fn from_pdf(&self, bytes: &[u8]) -> Result<String, ExtractError>;

    async fn from_audio_video(&self, media: &MediaFile) -> Result<String, ExtractError>;

    async fn from_youtube(&self, url: &str) -> Result<String, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_turn_is_unanswered() {
        let turn = ConversationTurn::open("Why?");
        assert_eq!(turn.question, "Why?");
        assert!(turn.answer.is_empty());
        assert!(!turn.is_answered());
    }

    #[test]
    fn answered_turn_reports_answer() {
        let turn = ConversationTurn::answered("Why?", "Because.");
        assert!(turn.is_answered());
    }
}
