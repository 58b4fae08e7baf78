use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::transcript::CleaningMode;

#[derive(Parser)]
#[command(
    name = "yt-transcript",
    about = "Extract metadata and cleaned transcripts from YouTube videos",
    version,
    long_about = "Extracts video metadata with yt-dlp and a transcript from the best available caption track. \
                  When a video has no captions the audio is transcribed locally with Whisper."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract metadata and optionally a transcript from a YouTube URL
    Extract {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Leave the title out of the report
        #[arg(long)]
        no_title: bool,

        /// Leave the description out of the report
        #[arg(long)]
        no_description: bool,

        /// Include the transcript (subtitles, falling back to Whisper)
        #[arg(short, long)]
        transcript: bool,
    },

    /// Clean a local .vtt caption file or plain transcript
    Clean {
        /// File to clean
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Cleaning passes (defaults to the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<CleaningMode>,
    },

    /// Check that yt-dlp, ffmpeg and whisper are installed
    Deps,

    /// Show or create the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Human readable report
    Text,
    /// JSON report
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::try_parse_from([
            "yt-transcript",
            "extract",
            "https://youtu.be/abc",
            "--no-title",
            "--transcript",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract {
                url,
                no_title,
                no_description,
                transcript,
                format,
                output,
            } => {
                assert_eq!(url, "https://youtu.be/abc");
                assert!(no_title);
                assert!(!no_description);
                assert!(transcript);
                assert!(matches!(format, OutputFormat::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_clean_mode_values() {
        let cli = Cli::try_parse_from(["yt-transcript", "clean", "subs.vtt", "--mode", "sentences"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Clean {
                mode: Some(CleaningMode::SentencesOnly),
                ..
            }
        ));
    }
}
