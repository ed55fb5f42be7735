//! AR marker demo driver.

use std::fs;
use std::path::PathBuf;

use ar_markers_cli::overlay::{CostumeContent, OverlayError};
use ar_markers_cli::pipeline::{self, OverlayMode, RunError};
use ar_markers_cli::sink::{FrameSink, SinkError};
use ar_markers_cli::source::{FrameSource, ImageDirSource, SourceError, StillSource};
use ar_markers_core::{init_with_level, order_corners};
use ar_markers_decode::{BankError, MarkerDecoder, TemplateBank};
use ar_markers_detect::{find_squares, DetectParams};
use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("reading {path}: {source}")]
    ReadParams {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    ParseParams {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Parser)]
#[command(name = "ar-markers", about = "Square fiducial marker AR overlay demos")]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file overriding the detector parameters.
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Costume overlay: warp a pose image over each decoded marker.
    Costume {
        /// Directory of marker template images.
        #[arg(long)]
        templates: PathBuf,
        /// Directory holding the four pose images.
        #[arg(long)]
        content: PathBuf,
        /// Directory of input frames (image sequence).
        #[arg(long)]
        frames: PathBuf,
        /// Output directory for the numbered composites.
        #[arg(long, default_value = "output")]
        out: PathBuf,
    },
    /// Color overlay: composite identity-keyed color swatches.
    Color {
        #[arg(long)]
        templates: PathBuf,
        #[arg(long)]
        frames: PathBuf,
        #[arg(long, default_value = "output")]
        out: PathBuf,
    },
    /// Full multi-channel sweep over one still image; prints every
    /// accepted quadrilateral and its decoded identities.
    Detect {
        #[arg(long)]
        templates: PathBuf,
        /// Still image to scan.
        image: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = init_with_level(level);

    if let Err(err) = run(cli) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let params = load_params(cli.params.as_deref())?;

    match cli.command {
        Command::Costume {
            templates,
            content,
            frames,
            out,
        } => {
            let decoder = load_decoder(&templates)?;
            let content = CostumeContent::load_dir(&content)?;
            let mut source = ImageDirSource::open(&frames)?;
            let mut sink = FrameSink::create(&out)?;
            let n = pipeline::run_loop(
                &mut source,
                &params,
                &decoder,
                &OverlayMode::Costume(content),
                &mut sink,
            )?;
            log::info!("processed {n} frame(s)");
        }
        Command::Color {
            templates,
            frames,
            out,
        } => {
            let decoder = load_decoder(&templates)?;
            let mut source = ImageDirSource::open(&frames)?;
            let mut sink = FrameSink::create(&out)?;
            let n = pipeline::run_loop(&mut source, &params, &decoder, &OverlayMode::Color, &mut sink)?;
            log::info!("processed {n} frame(s)");
        }
        Command::Detect { templates, image } => {
            let decoder = load_decoder(&templates)?;
            let mut source = StillSource::open(&image)?;
            if let Some(frame) = source.next_frame()? {
                detect_still(&frame, &params, &decoder);
            }
        }
    }
    Ok(())
}

fn load_params(path: Option<&std::path::Path>) -> Result<DetectParams, AppError> {
    let Some(path) = path else {
        return Ok(DetectParams::default());
    };
    let text = fs::read_to_string(path).map_err(|source| AppError::ReadParams {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AppError::ParseParams {
        path: path.to_path_buf(),
        source,
    })
}

fn load_decoder(templates: &std::path::Path) -> Result<MarkerDecoder, AppError> {
    let bank = TemplateBank::load_dir(templates)?;
    if bank.is_empty() {
        log::warn!(
            "template bank at {} is empty; no marker will ever decode",
            templates.display()
        );
    }
    Ok(MarkerDecoder::new(bank))
}

fn detect_still(frame: &image::RgbImage, params: &DetectParams, decoder: &MarkerDecoder) {
    let gray = image::imageops::grayscale(frame);
    let quads = find_squares(frame, params);
    log::info!("{} candidate(s)", quads.len());

    for quad in &quads {
        let Some(ordered) = order_corners(quad) else {
            continue;
        };
        let ids = decoder.decode_all(&gray, &ordered);
        if ids.is_empty() {
            continue;
        }
        let names: Vec<&str> = ids
            .iter()
            .filter_map(|&id| decoder.bank().name(id))
            .collect();
        let corners: Vec<String> = ordered
            .iter()
            .map(|p| format!("({:.0},{:.0})", p.x, p.y))
            .collect();
        println!("{} -> {:?} {:?}", corners.join(" "), ids, names);
    }
}
