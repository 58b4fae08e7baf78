//! yt-transcript - extract metadata and cleaned transcripts from YouTube videos
//!
//! Captions are fetched with yt-dlp in a language order inferred from the video's
//! metadata. When no caption track exists the audio is transcribed with Whisper.
//! Both sources go through the same repetition-removal pipeline.

use std::path::PathBuf;

pub mod captions;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{ExtractionResult, SubtitleLanguage};
pub use language::{LanguageCode, VideoMetadata};
pub use pipeline::{ExtractionOptions, ExtractionPipeline, VideoReport};
pub use process::{CommandOutput, CommandRunner, Dependencies, SystemCommandRunner, ToolCommand};
pub use transcript::{clean_transcript, CleaningMode};

/// Result type used by the application glue
pub type Result<T> = anyhow::Result<T>;

/// Result type used by extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractorError>;

/// Error types specific to transcript extraction
#[derive(thiserror::Error, Debug)]
pub enum ExtractorError {
    #[error("Required tool is not installed: {0}")]
    DependencyMissing(String),

    #[error("Failed to extract video metadata: {0}")]
    MetadataExtractionFailed(String),

    #[error("yt-dlp failed: {0}")]
    DownloaderFailed(String),

    #[error("No subtitle files found")]
    NoSubtitlesFound,

    #[error("Failed to read caption file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse subtitles: {0}")]
    SubtitleParseFailed(String),

    #[error("Whisper invocation failed: {0}")]
    WhisperInvocationFailed(String),

    #[error("Whisper output missing: {0}")]
    WhisperOutputMissing(String),

    #[error("Failed to extract subtitles: {0}")]
    SubtitleStage(#[source] Box<ExtractorError>),

    #[error("Failed to extract with Whisper: {0}")]
    WhisperStage(#[source] Box<ExtractorError>),

    #[error("Both subtitle and Whisper extraction failed (subtitles: {subtitles}; whisper: {whisper})")]
    BothSourcesFailed {
        subtitles: Box<ExtractorError>,
        whisper: Box<ExtractorError>,
    },

    #[error("Extraction timeout after {0} seconds")]
    Timeout(u64),
}

impl ExtractorError {
    /// Innermost cause, skipping the stage wrappers
    pub fn root_cause(&self) -> &ExtractorError {
        match self {
            ExtractorError::SubtitleStage(inner) | ExtractorError::WhisperStage(inner) => inner.root_cause(),
            other => other,
        }
    }
}
