use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yt_transcript::captions::parse_vtt_file;
use yt_transcript::output::{self, dependency_help};
use yt_transcript::utils::validate_and_normalize_url;
use yt_transcript::{
    clean_transcript, Cli, CleaningMode, Commands, Config, ExtractionOptions, ExtractionPipeline, ExtractorError,
};

fn init_tracing(cli: &Cli) {
    let default_filter = if cli.verbose { "yt_transcript=debug" } else { "yt_transcript=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    // Reports go to stdout, so logs stay on stderr
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn spinner(quiet: bool, message: &str) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    Ok(progress)
}

async fn run_extract(
    config: Config,
    url: &str,
    options: ExtractionOptions,
    quiet: bool,
) -> Result<yt_transcript::VideoReport> {
    let url = validate_and_normalize_url(url)?;
    let pipeline = ExtractionPipeline::new(config);

    tracing::info!("Checking dependencies...");
    match pipeline.ensure_dependencies(&options).await {
        Ok(deps) => {
            if options.include_transcript && !deps.whisper {
                eprintln!("{} {}\n", style("Warning:").yellow().bold(), dependency_help("whisper"));
            }
        }
        Err(ExtractorError::DependencyMissing(tool)) => {
            eprintln!("{} {}", style("Error:").red().bold(), dependency_help(&tool));
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    let progress = spinner(quiet, "Extracting YouTube content...")?;
    let result = pipeline.extract_with_timeout(&url, &options).await;
    progress.finish_and_clear();

    result.context("Error extracting YouTube content")
}

async fn run_clean(file: &Path, mode: CleaningMode) -> Result<String> {
    let is_vtt = file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("vtt"))
        .unwrap_or(false);

    let raw = if is_vtt {
        parse_vtt_file(file).await?
    } else {
        fs_err::tokio::read_to_string(file).await?
    };

    Ok(clean_transcript(raw.trim(), mode))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = Config::load().await?;

    match cli.command {
        Commands::Extract {
            url,
            output,
            format,
            no_title,
            no_description,
            transcript,
        } => {
            let options = ExtractionOptions {
                include_title: !no_title,
                include_description: !no_description,
                include_transcript: transcript,
            };

            let report = run_extract(config, &url, options, cli.quiet).await?;

            match output {
                Some(path) => {
                    output::save_to_file(&report, &path, &format).await?;
                    println!("Report saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&report, &format)?;
                }
            }
        }
        Commands::Clean { file, mode } => {
            let mode = mode.unwrap_or(config.app.cleaning_mode);
            let cleaned = run_clean(&file, mode).await?;
            println!("{}", cleaned);
        }
        Commands::Deps => {
            let pipeline = ExtractionPipeline::new(config);
            let deps = pipeline.check_dependencies().await;

            for (tool, present) in [("yt-dlp", deps.yt_dlp), ("ffmpeg", deps.ffmpeg), ("whisper", deps.whisper)] {
                if present {
                    println!("  {} {}", style("✓").green(), tool);
                } else {
                    println!("  {} {}", style("✗").red(), tool);
                }
            }

            if !deps.all_present() {
                println!();
                for (tool, present) in [("yt-dlp", deps.yt_dlp), ("ffmpeg", deps.ffmpeg), ("whisper", deps.whisper)] {
                    if !present {
                        println!("{}\n", dependency_help(tool));
                    }
                }
            }
        }
        Commands::Config { show, init } => {
            if init {
                let path = Config::config_path()?;
                if path.exists() {
                    println!("Configuration already exists at: {}", path.display());
                } else {
                    let path = Config::default().save().await?;
                    println!("Configuration written to: {}", path.display());
                }
            }
            if show || !init {
                config.display();
            }
        }
    }

    Ok(())
}
