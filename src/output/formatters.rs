use anyhow::Result;
use console::{style, Emoji};

use crate::extractors::ExtractionResult;
use crate::pipeline::VideoReport;
use crate::utils::{format_duration, format_number, format_upload_date, truncate_chars};

const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_TAGS: usize = 10;
const MAX_TRANSCRIPT_CHARS: usize = 3000;
const MAX_REPORT_CHARS: usize = 50_000;

static CLAPPER: Emoji<'_, '_> = Emoji("🎬 ", "");
static TV: Emoji<'_, '_> = Emoji("📺 ", "");
static PAGE: Emoji<'_, '_> = Emoji("📄 ", "");
static LABEL: Emoji<'_, '_> = Emoji("🏷️  ", "");
static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
static SCROLL: Emoji<'_, '_> = Emoji("📜 ", "");
static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
static CLOCK: Emoji<'_, '_> = Emoji("⏰ ", "");

/// Format the report as a human readable text block
pub fn format_as_text(report: &VideoReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}{}\n", CLAPPER, style("YouTube Content Extraction Results").bold()));
    out.push_str(&format!("{}\n\n", "=".repeat(50)));

    if report.title.is_some() || report.uploader.is_some() {
        out.push_str(&format!("{}{}\n", TV, style("Video Information:").bold()));
        if let Some(title) = &report.title {
            out.push_str(&format!("   Title: {}\n", style(title).cyan()));
        }
        if let Some(uploader) = &report.uploader {
            out.push_str(&format!("   Channel: {}\n", uploader));
        }
        if let Some(duration) = report.duration.filter(|d| *d > 0) {
            out.push_str(&format!("   Duration: {}\n", format_duration(duration)));
        }
        if let Some(date) = &report.upload_date {
            out.push_str(&format!("   Upload Date: {}\n", format_upload_date(date)));
        }
        if let Some(views) = report.view_count.filter(|v| *v > 0) {
            out.push_str(&format!("   Views: {}\n", format_number(views)));
        }
        if let Some(likes) = report.like_count.filter(|l| *l > 0) {
            out.push_str(&format!("   Likes: {}\n", format_number(likes)));
        }
        out.push('\n');
    }

    if let Some(description) = report.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("{}{}\n", PAGE, style("Description:").bold()));
        match truncate_chars(description, MAX_DESCRIPTION_CHARS) {
            Some(head) => out.push_str(&format!("{}...\n\n", head)),
            None => out.push_str(&format!("{}\n\n", description)),
        }
    }

    if !report.tags.is_empty() {
        let shown: Vec<&str> = report.tags.iter().take(MAX_TAGS).map(String::as_str).collect();
        let more = if report.tags.len() > MAX_TAGS { "..." } else { "" };
        out.push_str(&format!("{}{}\n", LABEL, style("Tags:").bold()));
        out.push_str(&format!("   {}{}\n\n", shown.join(", "), more));
    }

    if !report.categories.is_empty() {
        out.push_str(&format!("{}{}\n", FOLDER, style("Categories:").bold()));
        out.push_str(&format!("   {}\n\n", report.categories.join(", ")));
    }

    if let Some(result) = report.transcript.as_ref().filter(|r| !r.transcript().is_empty()) {
        out.push_str(&format_transcript_section(result));
    }

    out.push_str(&format!("{}{}\n", LINK, style("Source URL:").bold()));
    out.push_str(&format!("   {}\n\n", report.url));
    out.push_str(&format!(
        "{}Extracted at: {}\n\n",
        CLOCK,
        report.extracted_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    ));

    if let Some(head) = truncate_chars(&out, MAX_REPORT_CHARS) {
        return format!("{}\n\n[Response truncated due to size limit]", head);
    }
    out
}

fn format_transcript_section(result: &ExtractionResult) -> String {
    let mut out = format!(
        "{}{}\n",
        SCROLL,
        style(format!("Transcript ({}):", result.source_name())).bold()
    );

    match result {
        ExtractionResult::Whisper(whisper) => {
            out.push_str(&format!("   Whisper Model: {}\n", whisper.model));
            if let Some(language) = &whisper.detected_language {
                out.push_str(&format!("   Detected Language: {}\n", language));
            }
        }
        ExtractionResult::Subtitles(subtitles) => {
            out.push_str(&format!("   Subtitle Language: {}\n", subtitles.language));
        }
    }
    out.push_str(&format!("   {}\n", "-".repeat(40)));

    let transcript = result.transcript();
    let body = match truncate_chars(transcript, MAX_TRANSCRIPT_CHARS) {
        Some(head) => format!("{}\n\n[Transcript truncated for display...]", head),
        None => transcript.to_string(),
    };
    out.push_str(&format!("   {}\n\n", body.replace('\n', "\n   ")));
    out
}

/// Format the report as pretty-printed JSON
pub fn format_as_json(report: &VideoReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Installation instructions for a missing tool
pub fn dependency_help(tool: &str) -> String {
    match tool {
        "yt-dlp" => "yt-dlp is not installed. Please install it first:\n\n\
                     pip install yt-dlp\n\
                     # or\n\
                     brew install yt-dlp"
            .to_string(),
        "ffmpeg" => "ffmpeg is not installed. Please install it first:\n\n\
                     brew install ffmpeg\n\
                     # or\n\
                     sudo apt install ffmpeg"
            .to_string(),
        "whisper" => "Whisper is not installed. Transcript extraction will only work if subtitles are available.\n\n\
                      To install Whisper:\n\
                      pip install openai-whisper\n\
                      # or\n\
                      brew install openai-whisper"
            .to_string(),
        other => format!("{} is not installed.", other),
    }
}
