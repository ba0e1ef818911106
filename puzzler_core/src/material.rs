//! Combining lecture sources into a single source text.
//!
//! Sources are read in a fixed order: pasted text, PDF, media, YouTube.
//! A failing source is recorded and skipped; it never aborts the others.

use std::fmt;

use tracing::{info, warn};

use crate::{ContentExtractor, ExtractError};

/// An uploaded audio or video file.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything the user handed in, each source optional.
#[derive(Debug, Clone, Default)]
pub struct LectureMaterial {
    pub pasted_text: Option<String>,
    pub pdf: Option<Vec<u8>>,
    pub media: Option<MediaFile>,
    pub youtube_url: Option<String>,
}

impl LectureMaterial {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pasted_text.is_none()
            && self.pdf.is_none()
            && self.media.is_none()
            && self.youtube_url.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    PastedText,
    Pdf,
    Media,
    YouTube,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PastedText => "pasted text",
            Self::Pdf => "PDF",
            Self::Media => "video",
            Self::YouTube => "YouTube video",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub error: ExtractError,
}

/// Combined text plus the sources that could not be read.
#[derive(Debug, Default)]
pub struct SourceAssembly {
    pub text: String,
    pub failures: Vec<SourceFailure>,
}

impl SourceAssembly {
    /// True when the text holds something other than whitespace.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    fn append(&mut self, source: SourceKind, extracted: Result<String, ExtractError>) {
        match extracted {
            Ok(text) => {
                info!("Loaded {} chars from {source}", text.len());
                self.text.push('\n');
                self.text.push_str(&text);
            }
            Err(error) => {
                warn!("Skipping {source}: {error}");
                self.failures.push(SourceFailure { source, error });
            }
        }
    }
}

/// Build the source text as `trim(pasted)` followed by `"\n" + extracted`
/// for each further source that is present.
pub async fn assemble_source_text<E>(extractor: &E, material: &LectureMaterial) -> SourceAssembly
where
    E: ContentExtractor + ?Sized,
{
    let mut assembly = SourceAssembly {
        text: material
            .pasted_text
            .as_deref()
            .map(|text| extractor.from_plain_text(text))
            .unwrap_or_default(),
        failures: Vec::new(),
    };

    if let Some(pdf) = &material.pdf {
        assembly.append(SourceKind::Pdf, extractor.from_pdf(pdf));
    }

    if let Some(media) = &material.media {
        assembly.append(SourceKind::Media, extractor.from_audio_video(media).await);
    }

    if let Some(url) = &material.youtube_url {
        assembly.append(SourceKind::YouTube, extractor.from_youtube(url).await);
    }

    assembly
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedExtractor;

    #[async_trait]
    impl ContentExtractor for FixedExtractor {
        fn from_pdf(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
            Ok("pdf text".to_string())
        }

        async fn from_audio_video(&self, media: &MediaFile) -> Result<String, ExtractError> {
            Ok(format!("transcript of {}", media.file_name))
        }

        async fn from_youtube(&self, url: &str) -> Result<String, ExtractError> {
            Err(ExtractError::InvalidYouTubeUrl(url.to_string()))
        }
    }

    #[tokio::test]
    async fn sources_are_joined_in_declared_order() {
        let material = LectureMaterial {
            pasted_text: Some("  notes  ".to_string()),
            pdf: Some(vec![1, 2, 3]),
            media: Some(MediaFile {
                file_name: "talk.mp4".to_string(),
                bytes: vec![0],
            }),
            youtube_url: None,
        };

        let assembly = assemble_source_text(&FixedExtractor, &material).await;
        assert_eq!(assembly.text, "notes\npdf text\ntranscript of talk.mp4");
        assert!(assembly.failures.is_empty());
    }

    #[tokio::test]
    async fn missing_pasted_text_keeps_leading_separator() {
        let material = LectureMaterial {
            pdf: Some(vec![1]),
            ..LectureMaterial::default()
        };

        let assembly = assemble_source_text(&FixedExtractor, &material).await;
        assert_eq!(assembly.text, "\npdf text");
        assert!(assembly.has_text());
    }

    #[tokio::test]
    async fn failures_are_recorded_per_source() {
        let material = LectureMaterial {
            youtube_url: Some("not a link".to_string()),
            ..LectureMaterial::default()
        };

        let assembly = assemble_source_text(&FixedExtractor, &material).await;
        assert!(!assembly.has_text());
        assert_eq!(assembly.failures.len(), 1);
        assert_eq!(assembly.failures[0].source, SourceKind::YouTube);
    }

    #[test]
    fn default_material_is_empty() {
        assert!(LectureMaterial::default().is_empty());
    }
}
