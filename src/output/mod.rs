use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::VideoReport;

pub mod formatters;

pub use formatters::*;

fn render(report: &VideoReport, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(report)),
        OutputFormat::Json => format_as_json(report),
    }
}

/// Save the report to a file, without terminal styling
pub async fn save_to_file(report: &VideoReport, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(report, format)?;
    let content = console::strip_ansi_codes(&content);

    fs_err::tokio::write(path, content.as_bytes())
        .await
        .context("Failed to write report")?;
    Ok(())
}

/// Print the report to stdout
pub fn print_to_console(report: &VideoReport, format: &OutputFormat) -> Result<()> {
    let content = render(report, format)?;
    println!("{}", content);
    Ok(())
}
