//! horizon: batch horizon detection over a directory of frames.
//!
//! Reads every `frame*` image from the input directory, writes a copy
//! with the detected horizon drawn in red to the output directory and,
//! when ground truth is available, reports the max and mean endpoint
//! loss.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin horizon -- --input frames/ --output annotated/
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use horizon_io::{BatchConfig, BatchReport, FrameStatus, error::error_chain};
use horizon_pipeline::PipelineConfig;
use log::LevelFilter;

/// Horizon line detection for directories of frames.
///
/// Segments each frame into sky and land, fits Hough line candidates to
/// the boundary and keeps the candidate that best agrees with the
/// segmentation.
#[derive(Parser)]
#[command(name = "horizon", version)]
struct Cli {
    /// Directory holding `frame*` images.
    #[arg(long, short)]
    input: PathBuf,

    /// Directory for annotated frames (created if missing).
    #[arg(long, short)]
    output: PathBuf,

    /// Ground-truth JSON file [default: <INPUT>/ground_truth.json].
    #[arg(long)]
    ground_truth: Option<PathBuf>,

    /// Gaussian blur kernel size (odd).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_KERNEL_SIZE)]
    blur_kernel_size: u32,

    /// Gaussian blur sigma.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Radius of the square morphology element (0 disables).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MORPHOLOGY_RADIUS)]
    morphology_radius: u8,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Contour smoothing tolerance as a fraction of the contour perimeter.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SIMPLIFY_EPSILON_RATIO)]
    simplify_epsilon_ratio: f64,

    /// Minimum Hough votes for a candidate line.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_HOUGH_VOTE_THRESHOLD)]
    hough_vote_threshold: u32,

    /// Hough neighbourhood suppression radius in cells (0 disables).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_HOUGH_SUPPRESSION_RADIUS)]
    hough_suppression_radius: u32,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// Missing fields take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Print the batch report as JSON.
    #[arg(long)]
    json: bool,

    /// Collect and print per-stage diagnostics for every frame.
    #[arg(long)]
    diagnostics: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        blur_kernel_size: cli.blur_kernel_size,
        blur_sigma: cli.blur_sigma,
        morphology_radius: cli.morphology_radius,
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        simplify_epsilon_ratio: cli.simplify_epsilon_ratio,
        hough_vote_threshold: cli.hough_vote_threshold,
        hough_suppression_radius: cli.hough_suppression_radius,
        ..PipelineConfig::default()
    })
}

const fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn print_report(report: &BatchReport, cli: &Cli) -> Result<(), String> {
    if cli.json {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| format!("Error serializing report: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", report.report());
    if cli.diagnostics {
        for frame in &report.frames {
            if let FrameStatus::Processed(processed) = &frame.status
                && let Some(ref diagnostics) = processed.diagnostics
            {
                println!();
                println!("{}", frame.name);
                println!("{}", diagnostics.report());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .init();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("config: {config:?}");

    let batch = BatchConfig {
        input_path: cli.input.clone(),
        output_path: cli.output.clone(),
        ground_truth_path: cli.ground_truth.clone(),
        diagnostics: cli.diagnostics,
    };

    let report = match horizon_io::run_batch(&batch, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", error_chain(&e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(msg) = print_report(&report, &cli) {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
