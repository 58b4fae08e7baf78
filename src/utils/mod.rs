use anyhow::Result;
use std::path::{Path, PathBuf};
use url::Url;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Unique temporary file prefix: nanosecond timestamp plus a random suffix,
/// so concurrent extractions never share a name.
pub fn generate_temp_prefix(kind: &str) -> String {
    let timestamp = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| chrono::Utc::now().timestamp_micros());
    let random_suffix = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();

    format!("temp_{}_{}_{}", kind, timestamp, random_suffix)
}

/// Delete every file in `dir` whose name starts with `prefix`.
/// Errors are logged and ignored.
pub async fn remove_prefixed_files(dir: &Path, prefix: &str) -> usize {
    let mut removed = 0;

    let mut entries = match fs_err::tokio::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cleanup skipped, cannot list {}: {}", dir.display(), e);
            return 0;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(prefix) {
            continue;
        }
        match fs_err::tokio::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to remove temporary file: {}", e),
        }
    }

    tracing::debug!("Removed {} temporary file(s) for {}", removed, prefix);
    removed
}

/// Blocking counterpart of [`remove_prefixed_files`], for use from `Drop`.
fn remove_prefixed_files_blocking(dir: &Path, prefix: &str) -> usize {
    let entries = match fs_err::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cleanup skipped, cannot list {}: {}", dir.display(), e);
            return 0;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
        .filter(|entry| match fs_err::remove_file(entry.path()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to remove temporary file: {}", e);
                false
            }
        })
        .count()
}

/// Owns the temporary file prefix of one acquisition attempt.
///
/// Call [`TempFiles::cleanup`] when the attempt finishes. If the attempt is
/// dropped first (timeout, cancellation) the files are removed on drop.
#[derive(Debug)]
pub struct TempFiles {
    dir: PathBuf,
    prefix: String,
    armed: bool,
}

impl TempFiles {
    pub fn new(dir: &Path, kind: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: generate_temp_prefix(kind),
            armed: true,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub async fn cleanup(mut self) -> usize {
        self.armed = false;
        remove_prefixed_files(&self.dir, &self.prefix).await
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        if self.armed {
            let removed = remove_prefixed_files_blocking(&self.dir, &self.prefix);
            tracing::debug!("Removed {} abandoned temporary file(s) for {}", removed, self.prefix);
        }
    }
}

/// Format duration as `h:mm:ss` or `m:ss`
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format an integer with thousands separators
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// yt-dlp reports upload dates as `YYYYMMDD`
pub fn format_upload_date(date: &str) -> String {
    chrono::NaiveDate::parse_from_str(date, "%Y%m%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> Option<&str> {
    text.char_indices().nth(max_chars).map(|(idx, _)| &text[..idx])
}
