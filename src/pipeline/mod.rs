use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::extractors::{ExtractionResult, MetadataExtractor, SubtitleExtractor, VideoInfo, WhisperExtractor};
use crate::language::{detect_script_languages, VideoMetadata};
use crate::process::{check_dependencies, CommandRunner, Dependencies, SystemCommandRunner};
use crate::{ExtractResult, ExtractorError};

/// What to put in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    pub include_title: bool,
    pub include_description: bool,
    pub include_transcript: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            include_title: true,
            include_description: true,
            include_transcript: false,
        }
    }
}

/// Everything extracted for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoReport {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Duration in seconds
    pub duration: Option<u64>,
    pub upload_date: Option<String>,
    pub uploader: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub channel_id: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub transcript: Option<ExtractionResult>,
    pub extracted_at: chrono::DateTime<chrono::Utc>,
}

impl VideoReport {
    fn new(url: &str, info: VideoInfo, options: &ExtractionOptions) -> Self {
        Self {
            url: url.to_string(),
            title: info.title.filter(|_| options.include_title),
            description: info.description.filter(|_| options.include_description),
            duration: info.duration,
            upload_date: info.upload_date,
            uploader: info.uploader,
            view_count: info.view_count,
            like_count: info.like_count,
            channel_id: info.channel_id,
            tags: info.tags,
            categories: info.categories,
            transcript: None,
            extracted_at: chrono::Utc::now(),
        }
    }
}

/// Metadata, subtitles first, Whisper as the fallback
pub struct ExtractionPipeline {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    metadata: MetadataExtractor,
    subtitles: SubtitleExtractor,
    whisper: WhisperExtractor,
}

impl ExtractionPipeline {
    /// Create a pipeline that runs the real tools
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, Arc::new(SystemCommandRunner::new()))
    }

    pub fn with_runner(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            metadata: MetadataExtractor::new(runner.clone(), &config.tools),
            subtitles: SubtitleExtractor::new(runner.clone(), &config),
            whisper: WhisperExtractor::new(runner.clone(), &config),
            runner,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn check_dependencies(&self) -> Dependencies {
        check_dependencies(self.runner.as_ref(), &self.config.tools).await
    }

    /// yt-dlp and ffmpeg are required. A missing whisper only matters once
    /// captions are unavailable, so it is reported and extraction goes on.
    pub async fn ensure_dependencies(&self, options: &ExtractionOptions) -> ExtractResult<Dependencies> {
        let deps = self.check_dependencies().await;

        if !deps.yt_dlp {
            return Err(ExtractorError::DependencyMissing("yt-dlp".to_string()));
        }
        if !deps.ffmpeg {
            return Err(ExtractorError::DependencyMissing("ffmpeg".to_string()));
        }
        if options.include_transcript && !deps.whisper {
            tracing::warn!("Whisper is not installed. Transcript extraction will only work if subtitles are available");
        }

        Ok(deps)
    }

    /// Try captions, then speech-to-text.
    pub async fn extract_transcript(
        &self,
        url: &str,
        metadata: Option<&VideoMetadata>,
    ) -> ExtractResult<ExtractionResult> {
        tracing::info!("Trying subtitles first...");
        let subtitle_error = match self.subtitles.extract(url, metadata).await {
            Ok(result) => {
                tracing::info!("Subtitle extraction successful ({})", result.language);
                return Ok(result.into());
            }
            Err(e) => e,
        };
        tracing::info!("Subtitles not available, falling back to Whisper: {}", subtitle_error);

        let profile = metadata.and_then(|m| detect_script_languages(m).into_iter().next());
        let hint = profile.filter(|_| self.config.whisper.forward_language_hint);

        match self.whisper.extract_with_profile(url, profile, hint).await {
            Ok(result) => {
                tracing::info!("Whisper extraction successful");
                Ok(result.into())
            }
            Err(whisper_error) => {
                tracing::error!("Whisper extraction failed: {}", whisper_error);
                Err(ExtractorError::BothSourcesFailed {
                    subtitles: Box::new(subtitle_error),
                    whisper: Box::new(whisper_error),
                })
            }
        }
    }

    /// Fetch metadata and, when asked for, the transcript.
    pub async fn extract(&self, url: &str, options: &ExtractionOptions) -> ExtractResult<VideoReport> {
        tracing::info!("Starting extraction for: {}", url);
        tracing::debug!("Options: {:?}", options);

        let info = self.metadata.fetch(url).await?;
        let language_metadata = info.language_metadata();
        let mut report = VideoReport::new(url, info, options);

        if options.include_transcript {
            tracing::info!("Extracting transcript...");
            report.transcript = Some(self.extract_transcript(url, Some(&language_metadata)).await?);
        }

        tracing::info!("Extraction completed successfully");
        Ok(report)
    }

    /// `extract` bounded by `app.timeout_secs`. When the deadline passes the
    /// running tool is killed and the attempt's temporary files are removed.
    pub async fn extract_with_timeout(&self, url: &str, options: &ExtractionOptions) -> ExtractResult<VideoReport> {
        let secs = self.config.app.timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), self.extract(url, options))
            .await
            .map_err(|_| ExtractorError::Timeout(secs))?
    }
}
