use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use yt_transcript::output::{format_as_json, format_as_text};
use yt_transcript::{
    CommandOutput, CommandRunner, Config, ExtractionOptions, ExtractionPipeline, ExtractionResult, ExtractorError,
    SubtitleLanguage, ToolCommand,
};

const INFO_JSON: &str = r#"{
    "title": "러스트로 만드는 CLI",
    "description": "이번 영상에서는 CLI를 만듭니다",
    "duration": 125,
    "upload_date": "20240305",
    "channel": "코딩채널",
    "view_count": 1500,
    "like_count": 42,
    "tags": ["rust", "cli"],
    "categories": ["Education"]
}"#;

/// Plays the part of yt-dlp and whisper by writing the files they would produce
#[derive(Default)]
struct ScriptedRunner {
    captions: Vec<(&'static str, &'static str)>,
    audio_fails: bool,
    whisper_text: Option<&'static str>,
    calls: Mutex<Vec<ToolCommand>>,
}

impl ScriptedRunner {
    fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().unwrap().clone()
    }

    fn ran(&self, predicate: impl Fn(&ToolCommand) -> bool) -> usize {
        self.calls().iter().filter(|cmd| predicate(*cmd)).count()
    }
}

fn output_path(cmd: &ToolCommand, ext: &str) -> String {
    cmd.flag_value("-o").unwrap().replace("%(ext)s", ext)
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &ToolCommand) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());

        if command.has_arg("--dump-json") {
            return Ok(CommandOutput::ok(INFO_JSON));
        }
        if command.has_arg("--write-subs") {
            for (ext, content) in &self.captions {
                std::fs::write(output_path(command, ext), content)?;
            }
            return Ok(CommandOutput::ok(""));
        }
        if command.has_arg("-x") {
            if self.audio_fails {
                return Ok(CommandOutput::failed(1, "ERROR: Sign in to confirm your age"));
            }
            std::fs::write(output_path(command, "wav"), b"RIFF")?;
            return Ok(CommandOutput::ok(""));
        }
        if command.program == "whisper" {
            let base = command.args[0].trim_end_matches(".wav");
            if let Some(text) = self.whisper_text {
                std::fs::write(format!("{}.txt", base), text)?;
            }
            return Ok(CommandOutput::ok("").with_stderr("Detecting language\nDetected language: Korean\n"));
        }

        Ok(CommandOutput::failed(127, "unexpected command"))
    }

    async fn is_available(&self, _program: &str) -> bool {
        true
    }
}

fn pipeline(dir: &Path, runner: Arc<ScriptedRunner>) -> ExtractionPipeline {
    let mut config = Config::default();
    config.app.work_dir = Some(dir.to_path_buf());
    ExtractionPipeline::with_runner(config, runner)
}

fn with_transcript() -> ExtractionOptions {
    ExtractionOptions {
        include_transcript: true,
        ..Default::default()
    }
}

fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn subtitles_are_preferred_and_cleaned() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner {
        captions: vec![
            ("en.vtt", "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nhello\n"),
            (
                "ko.vtt",
                "WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.000\n안녕 안녕 반가워요\n\n\
                 2\n00:00:02.000 --> 00:00:04.000\n<c>안녕 안녕 반가워요</c>\n",
            ),
        ],
        ..Default::default()
    });

    let report = pipeline(dir.path(), runner.clone())
        .extract("https://www.youtube.com/watch?v=abc", &with_transcript())
        .await
        .unwrap();

    match report.transcript.as_ref().unwrap() {
        ExtractionResult::Subtitles(subs) => {
            assert_eq!(subs.language, SubtitleLanguage::Known("ko".to_string()));
            assert_eq!(subs.transcript, "안녕 반가워요");
        }
        other => panic!("expected subtitles, got {:?}", other),
    }

    let subtitle_call = runner.calls().into_iter().find(|c| c.has_arg("--write-subs")).unwrap();
    assert!(subtitle_call.flag_value("--sub-langs").unwrap().starts_with("ko,kr,"));
    assert_eq!(runner.ran(|c| c.program == "whisper"), 0);
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn whisper_fills_in_when_no_captions_exist() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner {
        whisper_text: Some("오늘은 CLI를 만듭니다. 오늘은 CLI를 만듭니다. 시작합니다.\n"),
        ..Default::default()
    });

    let report = pipeline(dir.path(), runner.clone())
        .extract("https://www.youtube.com/watch?v=abc", &with_transcript())
        .await
        .unwrap();

    let transcript = report.transcript.as_ref().unwrap();
    assert_eq!(transcript.source_name(), "whisper");
    assert_eq!(transcript.language(), Some("ko"));
    assert_eq!(transcript.transcript(), "오늘은 CLI를 만듭니다. 시작합니다");

    assert_eq!(runner.ran(|c| c.has_arg("--write-subs")), 1);
    assert_eq!(runner.ran(|c| c.has_arg("-x") && c.flag_value("--audio-quality") == Some("192k")), 1);
    assert_eq!(runner.ran(|c| c.program == "whisper" && c.flag_value("--model") == Some("base")), 1);
    assert!(is_empty_dir(dir.path()));

    let text = console::strip_ansi_codes(&format_as_text(&report)).into_owned();
    assert!(text.contains("Transcript (whisper):"));
    assert!(text.contains("Whisper Model: base"));
    assert!(text.contains("Channel: 코딩채널"));
}

#[tokio::test]
async fn both_sources_failing_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner {
        audio_fails: true,
        ..Default::default()
    });

    let err = pipeline(dir.path(), runner.clone())
        .extract("https://www.youtube.com/watch?v=abc", &with_transcript())
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractorError::BothSourcesFailed { .. }));
    let message = err.to_string();
    assert!(message.contains("No subtitle files found"));
    assert!(message.contains("Sign in to confirm your age"));
    assert_eq!(runner.ran(|c| c.program == "whisper"), 0);
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn whisper_without_output_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::default());

    let err = pipeline(dir.path(), runner)
        .extract_transcript("https://www.youtube.com/watch?v=abc", None)
        .await
        .unwrap_err();

    match err {
        ExtractorError::BothSourcesFailed { whisper, .. } => {
            assert!(matches!(whisper.root_cause(), ExtractorError::WhisperOutputMissing(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(is_empty_dir(dir.path()));
}

#[test]
fn metadata_only_report_skips_transcript_tools() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::default());
    let options = ExtractionOptions {
        include_title: true,
        include_description: false,
        include_transcript: false,
    };

    let report = tokio_test::block_on(pipeline(dir.path(), runner.clone()).extract("https://youtu.be/abc", &options))
        .unwrap();

    assert_eq!(runner.calls().len(), 1);
    let json: serde_json::Value = serde_json::from_str(&format_as_json(&report).unwrap()).unwrap();
    assert_eq!(json["title"], "러스트로 만드는 CLI");
    assert!(json["description"].is_null());
    assert_eq!(json["uploader"], "코딩채널");
    assert_eq!(json["view_count"], 1500);
}
