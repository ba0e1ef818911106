//! The study command: load lecture material and let the student ask.

use std::path::{Path, PathBuf};

use anyhow::Context;
use puzzler_config::Config;
use puzzler_conversation::{SessionConfig, StudentSession};
use puzzler_core::{
    LectureMaterial, MediaFile, SessionError, SourceFailure, assemble_source_text,
};
use puzzler_extract::{LectureExtractor, WhisperTranscriber, YouTubeTranscripts};
use puzzler_providers::GeminiProvider;
use tracing::info;

use crate::dialogue::Dialogue;

/// Input parameters for the Study command strategy.
#[derive(Debug, Clone, Default)]
pub struct StudyInput {
    /// Lecture text given directly on the command line
    pub text: Option<String>,
    /// File to read lecture text from
    pub text_file: Option<PathBuf>,
    /// PDF slides or notes
    pub pdf: Option<PathBuf>,
    /// Audio or video recording
    pub video: Option<PathBuf>,
    /// YouTube link
    pub youtube: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Optional number of questions
    pub turns: Option<usize>,
}

impl StudyInput {
    /// Read every file named on the command line into memory.
    fn load_material(&self) -> anyhow::Result<LectureMaterial> {
        let file_text = self
            .text_file
            .as_deref()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read text file {}", path.display()))
            })
            .transpose()?;

        let pasted_text = match (self.text.clone(), file_text) {
            (Some(text), Some(file)) => Some(format!("{text}\n{file}")),
            (text, file) => text.or(file),
        };

        let pdf = self
            .pdf
            .as_deref()
            .map(|path| {
                std::fs::read(path)
                    .with_context(|| format!("Failed to read PDF {}", path.display()))
            })
            .transpose()?;

        let media = self.video.as_deref().map(read_media).transpose()?;

        Ok(LectureMaterial {
            pasted_text,
            pdf,
            media,
            youtube_url: self.youtube.clone(),
        })
    }
}

fn read_media(path: &Path) -> anyhow::Result<MediaFile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read recording {}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "recording".to_string(), |n| n.to_string_lossy().into_owned());
    Ok(MediaFile { file_name, bytes })
}

/// Strategy for executing the Study command.
///
/// Builds the source text from every supplied source, reports the ones that
/// could not be read, then hands the session to the terminal dialogue.
#[derive(Debug, Clone, Copy)]
pub struct StudyStrategy;

impl super::CommandStrategy for StudyStrategy {
    type Input = StudyInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        let material = input.load_material()?;
        if material.is_empty() {
            anyhow::bail!(
                "{}: pass --text, --text-file, --pdf, --video or --youtube",
                SessionError::EmptyInput
            );
        }

        let Some(api_key) = config.providers.gemini.key() else {
            anyhow::bail!(
                "No Gemini API key configured. Set GEMINI_API_KEY or run 'puzzler init' and edit the config file"
            );
        };

        let provider = GeminiProvider::new(api_key.to_string())
            .with_base_url(config.generation.base_url.clone())
            .with_model(input.model.unwrap_or(config.generation.model));
        info!("Using model: {}", provider.model());

        let extractor = LectureExtractor::new(
            WhisperTranscriber::new(
                config.providers.openai.key().map(str::to_string),
                config.transcription,
            ),
            YouTubeTranscripts::new(config.youtube),
        );

        let assembly = assemble_source_text(&extractor, &material).await;
        report_failures(&assembly.failures);

        let session_config = SessionConfig::default()
            .with_turn_limit(input.turns.unwrap_or(config.generation.turn_limit));

        let session = match StudentSession::start(provider, assembly.text, session_config) {
            Ok(session) => session,
            Err(SessionError::EmptyInput) => {
                anyhow::bail!("No lecture text could be read from the material provided")
            }
            Err(e) => return Err(e.into()),
        };

        let mut dialogue = Dialogue::new(session, std::io::stdin().lock(), std::io::stdout());
        dialogue.run().await
    }
}

fn report_failures(failures: &[SourceFailure]) {
    for failure in failures {
        println!("{}: {}", failure.source, failure.error.user_message());
    }
}
