//! WebVTT caption track parsing.
//!
//! Only the spoken text survives: headers, cue timings, cue indices, cue
//! settings and inline markup are discarded.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::transcript::normalize::collapse_whitespace;
use crate::{ExtractResult, ExtractorError};

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

fn is_header(line: &str) -> bool {
    line == "WEBVTT" || line.starts_with("WEBVTT ") || line.starts_with("WEBVTT\t")
}

fn is_timing(line: &str) -> bool {
    line.contains("-->")
}

fn is_cue_index(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

fn is_cue_setting(line: &str) -> bool {
    line.contains("align:") || line.contains("position:")
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
}

fn clean_caption_line(line: &str) -> String {
    let without_tags = MARKUP_TAG.replace_all(line, "");
    decode_entities(&without_tags).trim().to_string()
}

/// Extract the caption text lines of a WebVTT document, in order.
pub fn extract_text_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut inside_cue = false;

    for raw in content.lines() {
        let line = raw.trim();

        if line.is_empty() || is_header(line) {
            continue;
        }
        if is_timing(line) {
            inside_cue = true;
            continue;
        }
        if is_cue_index(line) || is_cue_setting(line) {
            continue;
        }
        if inside_cue {
            let text = clean_caption_line(line);
            if !text.is_empty() {
                lines.push(text);
            }
        }
    }

    lines
}

/// Parse a WebVTT document into a single space-joined transcript.
pub fn parse_vtt(content: &str) -> String {
    collapse_whitespace(&extract_text_lines(content).join(" "))
}

/// Read and parse a WebVTT file. Unreadable files fail with [`ExtractorError::FileAccess`].
pub async fn parse_vtt_file(path: &Path) -> ExtractResult<String> {
    tracing::debug!("Parsing caption file: {}", path.display());

    let content = fs_err::tokio::read_to_string(path)
        .await
        .map_err(|source| ExtractorError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(parse_vtt(&content))
}
