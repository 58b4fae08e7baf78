use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ToolsConfig;
use crate::language::VideoMetadata;
use crate::process::{CommandRunner, ToolCommand};
use crate::{ExtractResult, ExtractorError};

/// Video information reported by `yt-dlp --dump-json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Duration in seconds
    pub duration: Option<u64>,
    /// Upload date as `YYYYMMDD`
    pub upload_date: Option<String>,
    pub uploader: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub channel_id: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
}

/// Subset of the yt-dlp info JSON we read
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    description: Option<String>,
    duration: Option<f64>,
    upload_date: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    view_count: Option<u64>,
    like_count: Option<u64>,
    channel_id: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    categories: Option<Vec<String>>,
}

impl From<YtDlpInfo> for VideoInfo {
    fn from(info: YtDlpInfo) -> Self {
        Self {
            title: info.title,
            description: info.description,
            duration: info.duration.map(|d| d.max(0.0).round() as u64),
            upload_date: info.upload_date,
            uploader: info.uploader.or(info.channel),
            view_count: info.view_count,
            like_count: info.like_count,
            channel_id: info.channel_id,
            tags: info.tags.unwrap_or_default(),
            categories: info.categories.unwrap_or_default(),
        }
    }
}

impl VideoInfo {
    /// Parse the JSON document printed by `yt-dlp --dump-json`
    pub fn from_json(json: &str) -> ExtractResult<Self> {
        let info: YtDlpInfo = serde_json::from_str(json.trim())
            .map_err(|e| ExtractorError::MetadataExtractionFailed(format!("invalid yt-dlp JSON: {}", e)))?;
        Ok(info.into())
    }

    /// The fields language detection looks at
    pub fn language_metadata(&self) -> VideoMetadata {
        VideoMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            uploader: self.uploader.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Fetches video metadata through yt-dlp without downloading anything
pub struct MetadataExtractor {
    runner: Arc<dyn CommandRunner>,
    yt_dlp_path: String,
}

impl MetadataExtractor {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: &ToolsConfig) -> Self {
        Self {
            runner,
            yt_dlp_path: tools.yt_dlp.clone(),
        }
    }

    fn build_command(&self, url: &str) -> ToolCommand {
        ToolCommand::new(&self.yt_dlp_path).args(["--dump-json", "--no-download", "--no-warnings", "--no-playlist", url])
    }

    /// Get video information using yt-dlp
    pub async fn fetch(&self, url: &str) -> ExtractResult<VideoInfo> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = self
            .runner
            .run(&self.build_command(url))
            .await
            .map_err(|e| ExtractorError::MetadataExtractionFailed(e.to_string()))?;

        if !output.success {
            return Err(ExtractorError::MetadataExtractionFailed(output.failure_summary()));
        }

        VideoInfo::from_json(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockCommandRunner};

    const INFO_JSON: &str = r#"{
        "title": "러스트 입문",
        "description": "Learn Rust",
        "duration": 754.6,
        "upload_date": "20240131",
        "uploader": null,
        "channel": "Rust Korea",
        "view_count": 12345,
        "like_count": 67,
        "channel_id": "UC123",
        "tags": ["rust", "프로그래밍"],
        "categories": ["Education"],
        "formats": [{"format_id": "18"}]
    }"#;

    #[test]
    fn test_from_json() {
        let info = VideoInfo::from_json(INFO_JSON).unwrap();
        assert_eq!(info.title.as_deref(), Some("러스트 입문"));
        assert_eq!(info.duration, Some(755));
        assert_eq!(info.uploader.as_deref(), Some("Rust Korea"));
        assert_eq!(info.tags, vec!["rust", "프로그래밍"]);
        assert_eq!(info.language_metadata().uploader.as_deref(), Some("Rust Korea"));
    }

    #[test]
    fn test_from_json_tolerates_missing_fields() {
        let info = VideoInfo::from_json(r#"{"title": "only a title", "tags": null}"#).unwrap();
        assert!(info.tags.is_empty());
        assert_eq!(info.duration, None);
    }

    #[test]
    fn test_invalid_json_is_metadata_error() {
        let err = VideoInfo::from_json("ERROR: not json").unwrap_err();
        assert!(matches!(err, ExtractorError::MetadataExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_fetch_runs_dump_json_without_download() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.program == "yt-dlp" && cmd.has_arg("--dump-json") && cmd.has_arg("--no-download"))
            .times(1)
            .returning(|_| Ok(CommandOutput::ok(INFO_JSON)));

        let extractor = MetadataExtractor::new(Arc::new(runner), &ToolsConfig::default());
        let info = extractor.fetch("https://youtu.be/abc").await.unwrap();
        assert_eq!(info.view_count, Some(12345));
    }

    #[tokio::test]
    async fn test_fetch_failure_carries_stderr() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(CommandOutput::failed(1, "ERROR: Video unavailable")));

        let extractor = MetadataExtractor::new(Arc::new(runner), &ToolsConfig::default());
        let err = extractor.fetch("https://youtu.be/abc").await.unwrap_err();
        assert!(err.to_string().contains("Video unavailable"));
    }
}
