use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::WhisperTranscript;
use crate::config::{Config, WhisperConfig};
use crate::language::LanguageCode;
use crate::process::{CommandRunner, ToolCommand};
use crate::transcript::{clean_transcript, CleaningMode};
use crate::utils::TempFiles;
use crate::{ExtractResult, ExtractorError};

static DETECTED_LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Detected language: (\w+)").expect("valid detected language regex"));

/// Recover the engine's auto-detected language from its console output.
///
/// Whisper prints the English name (`Japanese`); known names are mapped to codes.
pub fn detected_language_from_output(output: &str) -> Option<String> {
    let captured = DETECTED_LANGUAGE.captures(output)?.get(1)?.as_str();
    Some(
        captured
            .parse::<LanguageCode>()
            .map(|lang| lang.as_str().to_string())
            .unwrap_or_else(|_| captured.to_string()),
    )
}

/// Downloads audio with yt-dlp and transcribes it with the whisper CLI
pub struct WhisperExtractor {
    runner: Arc<dyn CommandRunner>,
    yt_dlp_path: String,
    whisper_path: String,
    config: WhisperConfig,
    work_dir: PathBuf,
    cleaning_mode: CleaningMode,
}

impl WhisperExtractor {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        Self {
            runner,
            yt_dlp_path: config.tools.yt_dlp.clone(),
            whisper_path: config.tools.whisper.clone(),
            config: config.whisper.clone(),
            work_dir: config.work_dir(),
            cleaning_mode: config.app.cleaning_mode,
        }
    }

    /// Complex scripts get the smaller, more careful model
    pub fn select_model(&self, language: Option<LanguageCode>) -> &str {
        match language {
            Some(lang) if lang.is_complex_script() => &self.config.complex_script_model,
            _ => &self.config.default_model,
        }
    }

    pub fn audio_quality(&self, language: Option<LanguageCode>) -> &str {
        match language {
            Some(lang) if lang.needs_high_quality_audio() => &self.config.high_audio_quality,
            _ => &self.config.standard_audio_quality,
        }
    }

    /// Transcribe `url`, using `language` both to pick the model and as the engine hint.
    pub async fn extract(&self, url: &str, language: Option<LanguageCode>) -> ExtractResult<WhisperTranscript> {
        self.extract_with_profile(url, language, language).await
    }

    /// Transcribe `url`. `profile` selects model and audio quality, `hint` is
    /// passed to the engine (`auto` when absent).
    pub async fn extract_with_profile(
        &self,
        url: &str,
        profile: Option<LanguageCode>,
        hint: Option<LanguageCode>,
    ) -> ExtractResult<WhisperTranscript> {
        let temp = TempFiles::new(&self.work_dir, "audio");

        let result = self.transcribe(url, profile, hint, temp.prefix()).await;
        temp.cleanup().await;

        result.map_err(|e| ExtractorError::WhisperStage(Box::new(e)))
    }

    async fn transcribe(
        &self,
        url: &str,
        profile: Option<LanguageCode>,
        hint: Option<LanguageCode>,
        prefix: &str,
    ) -> ExtractResult<WhisperTranscript> {
        let model = self.select_model(profile).to_string();
        let quality = self.audio_quality(profile);
        let base = self.work_dir.join(prefix);

        let audio_command = self.build_audio_command(url, &base, quality);
        let output = self
            .runner
            .run(&audio_command)
            .await
            .map_err(|e| ExtractorError::WhisperInvocationFailed(format!("audio extraction: {}", e)))?;
        if !output.success {
            return Err(ExtractorError::WhisperInvocationFailed(format!(
                "audio extraction: {}",
                output.failure_summary()
            )));
        }

        tracing::info!(
            "Using Whisper model: {} for language: {}",
            model,
            hint.map(|l| l.as_str()).unwrap_or("auto")
        );
        let whisper_command = self.build_whisper_command(&base, &model, hint);
        let output = self
            .runner
            .run(&whisper_command)
            .await
            .map_err(|e| ExtractorError::WhisperInvocationFailed(e.to_string()))?;
        if !output.success {
            return Err(ExtractorError::WhisperInvocationFailed(output.failure_summary()));
        }

        let detected_language = match hint {
            Some(lang) => Some(lang.as_str().to_string()),
            None => detected_language_from_output(&output.stderr)
                .or_else(|| detected_language_from_output(&output.stdout)),
        };

        let text_file = with_extension(&base, "txt");
        let raw = fs_err::tokio::read_to_string(&text_file)
            .await
            .map_err(|e| ExtractorError::WhisperOutputMissing(e.to_string()))?;
        let transcript = clean_transcript(raw.trim(), self.cleaning_mode);

        tracing::info!(
            "Whisper extraction successful ({}): {} chars raw, {} chars cleaned",
            model,
            raw.chars().count(),
            transcript.chars().count()
        );

        Ok(WhisperTranscript {
            transcript,
            detected_language,
            model,
        })
    }

    fn build_audio_command(&self, url: &str, base: &Path, quality: &str) -> ToolCommand {
        ToolCommand::new(&self.yt_dlp_path)
            .args(["-x", "--audio-format", "wav", "--audio-quality", quality, "--no-warnings", "-o"])
            .arg(format!("{}.%(ext)s", base.display()))
            .arg(url)
    }

    fn build_whisper_command(&self, base: &Path, model: &str, hint: Option<LanguageCode>) -> ToolCommand {
        let flag = |enabled: bool| if enabled { "True" } else { "False" };

        ToolCommand::new(&self.whisper_path)
            .arg(with_extension(base, "wav").to_string_lossy())
            .args(["--model", model, "--output_format", "txt", "--output_dir"])
            .arg(self.work_dir.to_string_lossy())
            .args(["--language", hint.map(|l| l.as_str()).unwrap_or("auto")])
            .args(["--fp16", flag(self.config.fp16)])
            .args(["--verbose", "False", "--word_timestamps", "False"])
            .arg("--no_speech_threshold")
            .arg(format!("{:.1}", self.config.no_speech_threshold))
            .arg("--logprob_threshold")
            .arg(format!("{:.1}", self.config.logprob_threshold))
    }
}

/// `base` + `.ext`, keeping any dots already in the file name
fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
