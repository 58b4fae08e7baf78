use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::language::{LanguageCode, BROAD_PRIORITY};
use crate::transcript::CleaningMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Caption download settings
    pub subtitles: SubtitleConfig,

    /// Speech-to-text settings
    pub whisper: WhisperConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Video downloader executable
    pub yt_dlp: String,

    /// Speech-to-text executable
    pub whisper: String,

    /// Codec tool executable (used by yt-dlp for audio conversion)
    pub ffmpeg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    /// Caption format requested from yt-dlp
    pub format: String,

    /// Language order used when no metadata is available
    pub fallback_languages: Vec<LanguageCode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// Model for complex scripts (CJK, Arabic, Hindi, Thai)
    pub complex_script_model: String,

    /// Model for everything else
    pub default_model: String,

    /// Audio bitrate for Japanese, Korean and Chinese
    pub high_audio_quality: String,

    /// Audio bitrate for everything else
    pub standard_audio_quality: String,

    pub fp16: bool,
    pub no_speech_threshold: f32,
    pub logprob_threshold: f32,

    /// Pass the metadata-detected language to whisper instead of `auto`
    pub forward_language_hint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for temporary caption/audio files (current directory if unset)
    pub work_dir: Option<PathBuf>,

    /// Overall extraction timeout
    pub timeout_secs: u64,

    /// Transcript cleaning passes
    pub cleaning_mode: CleaningMode,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: "yt-dlp".to_string(),
            whisper: "whisper".to_string(),
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            format: "vtt".to_string(),
            fallback_languages: BROAD_PRIORITY.to_vec(),
        }
    }
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            complex_script_model: "base".to_string(),
            default_model: "turbo".to_string(),
            high_audio_quality: "192k".to_string(),
            standard_audio_quality: "128k".to_string(),
            fp16: true,
            no_speech_threshold: 0.6,
            logprob_threshold: -1.0,
            forward_language_hint: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            timeout_secs: 60,
            cleaning_mode: CleaningMode::Full,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let content = fs_err::tokio::read_to_string(&config_path)
                .await
                .context("Failed to read config file")?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::tokio::create_dir_all(parent).await?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::tokio::write(&config_path, content)
            .await
            .context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("yt-transcript").join("config.yaml"))
    }

    fn validate(&self) -> Result<()> {
        if self.tools.yt_dlp.trim().is_empty() || self.tools.whisper.trim().is_empty() {
            anyhow::bail!("Tool paths must not be empty");
        }

        if self.subtitles.fallback_languages.is_empty() {
            anyhow::bail!("subtitles.fallback_languages must list at least one language");
        }

        if self.app.timeout_secs == 0 {
            anyhow::bail!("app.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Directory used for temporary files
    pub fn work_dir(&self) -> PathBuf {
        self.app.work_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  yt-dlp: {}", self.tools.yt_dlp);
        println!("  whisper: {}", self.tools.whisper);
        println!("  ffmpeg: {}", self.tools.ffmpeg);
        println!("  Subtitle format: {}", self.subtitles.format);
        println!(
            "  Fallback languages: {}",
            self.subtitles
                .fallback_languages
                .iter()
                .map(LanguageCode::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!(
            "  Whisper models: {} (complex scripts), {} (default)",
            self.whisper.complex_script_model, self.whisper.default_model
        );
        println!("  Work directory: {}", self.work_dir().display());
        println!("  Timeout: {}s", self.app.timeout_secs);
        println!("  Cleaning mode: {}", self.app.cleaning_mode);
    }
}
