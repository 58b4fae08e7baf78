use std::path::PathBuf;
use std::sync::Arc;

use super::{SubtitleLanguage, SubtitleTranscript};
use crate::captions::parse_vtt_file;
use crate::config::{Config, SubtitleConfig};
use crate::language::{detect_video_language, expand_language_codes, VideoMetadata};
use crate::process::{CommandRunner, ToolCommand};
use crate::transcript::{clean_transcript, CleaningMode};
use crate::utils::TempFiles;
use crate::{ExtractResult, ExtractorError};

/// A caption file produced by yt-dlp
#[derive(Debug, Clone, PartialEq)]
struct FoundSubtitle {
    path: PathBuf,
    language: SubtitleLanguage,
}

/// Fetches caption tracks with yt-dlp and turns them into cleaned transcripts
pub struct SubtitleExtractor {
    runner: Arc<dyn CommandRunner>,
    yt_dlp_path: String,
    config: SubtitleConfig,
    work_dir: PathBuf,
    cleaning_mode: CleaningMode,
}

impl SubtitleExtractor {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        Self {
            runner,
            yt_dlp_path: config.tools.yt_dlp.clone(),
            config: config.subtitles.clone(),
            work_dir: config.work_dir(),
            cleaning_mode: config.app.cleaning_mode,
        }
    }

    /// Download, parse and clean the best available caption track.
    ///
    /// Temporary files are removed whether or not extraction succeeds.
    pub async fn extract(&self, url: &str, metadata: Option<&VideoMetadata>) -> ExtractResult<SubtitleTranscript> {
        let temp = TempFiles::new(&self.work_dir, "subs");

        let result = self.fetch_and_clean(url, metadata, temp.prefix()).await;
        temp.cleanup().await;

        result.map_err(|e| ExtractorError::SubtitleStage(Box::new(e)))
    }

    async fn fetch_and_clean(
        &self,
        url: &str,
        metadata: Option<&VideoMetadata>,
        prefix: &str,
    ) -> ExtractResult<SubtitleTranscript> {
        let priority = match metadata {
            Some(metadata) => detect_video_language(metadata),
            None => self.config.fallback_languages.clone(),
        };
        tracing::info!(
            "Language priority for subtitles: {}",
            priority.iter().map(|l| l.as_str()).collect::<Vec<_>>().join(", ")
        );

        let languages = expand_language_codes(&priority);
        let command = self.build_command(url, &languages, prefix);

        let download_error = match self.runner.run(&command).await {
            Ok(output) if output.success => None,
            Ok(output) => Some(output.failure_summary()),
            Err(e) => Some(e.to_string()),
        };

        let found = match self.find_subtitle_file(prefix, &languages).await {
            Some(found) => Some(found),
            None => self.find_any_subtitle_file(prefix).await,
        };

        let found = match (found, download_error) {
            (Some(found), error) => {
                if let Some(error) = error {
                    tracing::warn!("yt-dlp reported an error but produced captions: {}", error);
                }
                found
            }
            (None, Some(error)) => return Err(ExtractorError::DownloaderFailed(error)),
            (None, None) => return Err(ExtractorError::NoSubtitlesFound),
        };

        tracing::info!("Found subtitle file: {} (language: {})", found.path.display(), found.language);

        let raw = parse_vtt_file(&found.path).await?;
        if raw.is_empty() {
            return Err(ExtractorError::SubtitleParseFailed(format!(
                "caption track {} contains no text",
                found.path.display()
            )));
        }

        let transcript = clean_transcript(&raw, self.cleaning_mode);
        tracing::info!(
            "Subtitle extraction successful ({}): {} chars raw, {} chars cleaned",
            found.language,
            raw.chars().count(),
            transcript.chars().count()
        );

        Ok(SubtitleTranscript {
            transcript,
            language: found.language,
        })
    }

    fn build_command(&self, url: &str, languages: &[String], prefix: &str) -> ToolCommand {
        let template = self.work_dir.join(format!("{}.%(ext)s", prefix));

        ToolCommand::new(&self.yt_dlp_path)
            .args(["--write-subs", "--write-auto-subs", "--sub-format"])
            .arg(&self.config.format)
            .args(["--skip-download", "--no-warnings", "--sub-langs"])
            .arg(languages.join(","))
            .arg("-o")
            .arg(template.to_string_lossy())
            .arg(url)
    }

    fn candidate_names(&self, prefix: &str, lang: &str) -> [String; 3] {
        let ext = &self.config.format;
        [
            format!("{}.{}.{}", prefix, lang, ext),
            format!("{}.{}-auto.{}", prefix, lang, ext),
            format!("{}.{}.auto.{}", prefix, lang, ext),
        ]
    }

    /// Look for the exact per-language filenames, in priority order.
    async fn find_subtitle_file(&self, prefix: &str, languages: &[String]) -> Option<FoundSubtitle> {
        for lang in languages {
            for name in self.candidate_names(prefix, lang) {
                let path = self.work_dir.join(&name);
                if fs_err::tokio::metadata(&path).await.is_ok() {
                    return Some(FoundSubtitle {
                        path,
                        language: SubtitleLanguage::Known(lang.clone()),
                    });
                }
            }
        }
        None
    }

    /// Accept any caption file with our prefix. The language is only a guess
    /// from the filename and may be [`SubtitleLanguage::Unknown`].
    async fn find_any_subtitle_file(&self, prefix: &str) -> Option<FoundSubtitle> {
        let suffix = format!(".{}", self.config.format);
        let mut names = Vec::new();

        let mut entries = fs_err::tokio::read_dir(&self.work_dir).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(prefix) && name.ends_with(&suffix) {
                names.push(name);
            }
        }
        names.sort();

        let name = names.into_iter().next()?;
        let language = language_from_filename(&name, prefix, &suffix);
        tracing::info!("Found fallback subtitle file: {} ({})", name, language);

        Some(FoundSubtitle {
            path: self.work_dir.join(&name),
            language,
        })
    }
}

/// `{prefix}.{lang}[...].{ext}` → `lang`, otherwise `Unknown`
fn language_from_filename(name: &str, prefix: &str, suffix: &str) -> SubtitleLanguage {
    let middle = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .and_then(|rest| rest.strip_prefix('.'));

    let lang = middle
        .and_then(|m| m.split('.').next())
        .map(|l| l.strip_suffix("-auto").unwrap_or(l));

    match lang {
        Some(l) if !l.is_empty() && l.chars().all(|c| c.is_ascii_alphabetic() || c == '-') => {
            SubtitleLanguage::Known(l.to_string())
        }
        _ => SubtitleLanguage::Unknown,
    }
}
