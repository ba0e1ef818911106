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

pub mod pdf;
pub mod transcribe;
pub mod youtube;

pub use pdf::extract_pdf_text;
pub use transcribe::{TranscriptionConfig, WhisperTranscriber};
pub use youtube::{YouTubeConfig, YouTubeTranscripts, video_id_from_url};

use async_trait::async_trait;
use puzzler_core::{ContentExtractor, ExtractError, MediaFile};

/// Extractor backed by the real services: lopdf for PDFs, the Whisper API
/// for recordings and YouTube captions for video links.
pub struct LectureExtractor {
    transcriber: WhisperTranscriber,
    youtube: YouTubeTranscripts,
}

impl LectureExtractor {
    pub const fn new(transcriber: WhisperTranscriber, youtube: YouTubeTranscripts) -> Self {
        Self {
            transcriber,
            youtube,
        }
    }
}

#[async_trait]
impl ContentExtractor for LectureExtractor {
    fn from_pdf(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        extract_pdf_text(bytes)
    }

    async fn from_audio_video(&self, media: &MediaFile) -> Result<String, ExtractError> {
        self.transcriber.transcribe(media).await
    }

    async fn from_youtube(&self, url: &str) -> Result<String, ExtractError> {
        self.youtube.fetch_transcript(url).await
    }
}
