//! synctime CLI — forced-align text fragments to narrated audio.
//!
//! Thin driver over `synctime_core::align`: discovers pre-computed MFCC
//! feature files in a text/audio directory pair (§6 external collaborator
//! contracts — synthesis and feature extraction happen upstream of this
//! tool), runs the alignment core, and renders the resulting sync map as
//! SMIL or JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use synctime_core::{align, DEFAULT_RADIUS, DEFAULT_SKIP_PENALTY};

mod json_source;
mod output;

use json_source::{discover_audio_sources, discover_text_sources};
use output::{OutputFormat, TimeFormat};

#[derive(Parser, Debug)]
#[command(
    name = "synctime",
    about = "Cross-boundary forced alignment of text fragments to narrated audio",
    version
)]
struct Cli {
    /// Directory of pre-synthesized text feature files (one JSON per text document)
    #[arg(long)]
    text_dir: PathBuf,

    /// Directory of audio feature files (one JSON per recording)
    #[arg(long)]
    audio_dir: PathBuf,

    /// Directory the sync map output is written to
    #[arg(long, default_value = "./synctime-output")]
    output_dir: PathBuf,

    /// Per-frame skip penalty (unitless, MFCC-scale dependent — re-run with
    /// a different value if alignment fails, per §7's retry guidance)
    #[arg(long, default_value_t = DEFAULT_SKIP_PENALTY)]
    skip_penalty: f64,

    /// FastDTW-BD corridor radius
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    radius: u32,

    /// Output format
    #[arg(long, default_value = "smil", value_parser = ["smil", "json"])]
    format: String,

    /// Render times as fractional-second durations instead of H:MM:SS.mmm
    #[arg(long, default_value_t = false)]
    times_as_duration: bool,

    /// Prefix prepended to text file names written into the sync map
    #[arg(long, default_value = "")]
    sync_map_text_path_prefix: String,

    /// Prefix prepended to audio file names written into the sync map
    #[arg(long, default_value = "")]
    sync_map_audio_path_prefix: String,

    /// Show debug-level logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if !cli.text_dir.is_dir() {
        bail!("text directory not found: {}", cli.text_dir.display());
    }
    if !cli.audio_dir.is_dir() {
        bail!("audio directory not found: {}", cli.audio_dir.display());
    }
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating output directory {}", cli.output_dir.display()))?;

    let format = match cli.format.as_str() {
        "smil" => OutputFormat::Smil,
        "json" => OutputFormat::Json,
        other => bail!("unknown output format: {other}"),
    };
    let time_format = if cli.times_as_duration {
        TimeFormat::Duration
    } else {
        TimeFormat::HmsMillis
    };

    // Scratch directory for the lifetime of this alignment call (§5); no
    // loader here stages derived files into it yet, but the lifecycle
    // contract — created before the controller loop, removed on every exit
    // path — is established now so a future transcoding loader has
    // somewhere to write without touching this function's error handling.
    let scratch = synctime_core::scratch::ScratchDir::new()?;
    log::debug!("scratch directory: {}", scratch.path().display());

    let text_sources = discover_text_sources(&cli.text_dir, &cli.sync_map_text_path_prefix)
        .context("discovering text sources")?;
    let audio_sources = discover_audio_sources(&cli.audio_dir, &cli.sync_map_audio_path_prefix)
        .context("discovering audio sources")?;

    if text_sources.is_empty() {
        bail!("no *.json text feature files found in {}", cli.text_dir.display());
    }
    if audio_sources.is_empty() {
        bail!("no *.json audio feature files found in {}", cli.audio_dir.display());
    }

    log::info!(
        "aligning {} text document(s) against {} audio recording(s)",
        text_sources.len(),
        audio_sources.len()
    );

    let sync_map = align(text_sources, audio_sources, cli.skip_penalty, cli.radius)
        .context("alignment failed")?;

    if sync_map.is_empty() {
        bail!(
            "no alignment found between any text/audio pair; try adjusting \
             --skip-penalty (currently {}) or check your inputs",
            cli.skip_penalty
        );
    }

    output::write_sync_map(&sync_map, &cli.output_dir, format, time_format)?;

    println!(
        "Wrote sync map for {} text file(s) to {}",
        sync_map.files.len(),
        cli.output_dir.display()
    );

    Ok(())
}
