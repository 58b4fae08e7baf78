use serde::{Deserialize, Serialize};
use std::fmt;

pub mod metadata;
pub mod subtitles;
pub mod whisper;

pub use metadata::{MetadataExtractor, VideoInfo};
pub use subtitles::SubtitleExtractor;
pub use whisper::WhisperExtractor;

/// Language of a caption track as far as the downloaded filename tells
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleLanguage {
    Known(String),
    /// The track was found by the catch-all search and its name gave no language
    Unknown,
}

impl Serialize for SubtitleLanguage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SubtitleLanguage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "unknown" => SubtitleLanguage::Unknown,
            _ => SubtitleLanguage::Known(value),
        })
    }
}

impl SubtitleLanguage {
    pub fn code(&self) -> Option<&str> {
        match self {
            SubtitleLanguage::Known(code) => Some(code),
            SubtitleLanguage::Unknown => None,
        }
    }
}

impl fmt::Display for SubtitleLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtitleLanguage::Known(code) => f.write_str(code),
            SubtitleLanguage::Unknown => f.write_str("unknown"),
        }
    }
}

/// Transcript taken from a caption track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTranscript {
    pub transcript: String,
    pub language: SubtitleLanguage,
}

/// Transcript produced by speech-to-text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhisperTranscript {
    pub transcript: String,
    pub detected_language: Option<String>,
    pub model: String,
}

/// Outcome of one successful transcript acquisition, tagged by source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ExtractionResult {
    Subtitles(SubtitleTranscript),
    Whisper(WhisperTranscript),
}

impl ExtractionResult {
    pub fn transcript(&self) -> &str {
        match self {
            ExtractionResult::Subtitles(s) => &s.transcript,
            ExtractionResult::Whisper(w) => &w.transcript,
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            ExtractionResult::Subtitles(_) => "subtitles",
            ExtractionResult::Whisper(_) => "whisper",
        }
    }

    /// Caption language or whisper-detected language
    pub fn language(&self) -> Option<&str> {
        match self {
            ExtractionResult::Subtitles(s) => s.language.code(),
            ExtractionResult::Whisper(w) => w.detected_language.as_deref(),
        }
    }
}

impl From<SubtitleTranscript> for ExtractionResult {
    fn from(value: SubtitleTranscript) -> Self {
        ExtractionResult::Subtitles(value)
    }
}

impl From<WhisperTranscript> for ExtractionResult {
    fn from(value: WhisperTranscript) -> Self {
        ExtractionResult::Whisper(value)
    }
}
