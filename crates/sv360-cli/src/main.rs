//! sv360 - 360 video projection conversion CLI
//!
//! Converts raw YUV sequences between sphere projections, prints geometry
//! layouts and measures sphere-aware quality metrics.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use sv360_geometry::{GuardBandFill, ProjectionKind};

mod commands;
mod logging;
mod session;

#[derive(Parser)]
#[command(name = "sv360")]
#[command(author, version, about = "360 video projection conversion CLI")]
#[command(long_about = "
Converts omnidirectional video between sphere projections.

Input and output geometries are described by a YAML session file
(see `sv360 info --help`); flags override its values.

Examples:
  sv360 convert -c erp_to_cmp.yaml -i in.yuv -o out.yuv
  sv360 convert -c erp_to_cmp.yaml -i in.yuv -o out.yuv --yaw 90 -f 10
  sv360 info -c erp_to_cmp.yaml --yaml
  sv360 metric -c erp_to_cmp.yaml -r ref.yuv -t test.yuv --metric s-psnr
  sv360 sphere-points -c erp_to_cmp.yaml -o points.txt --side output
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a raw YUV sequence between projections
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Show the geometries of a session
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Compare two raw YUV sequences
    #[command(visible_alias = "m")]
    Metric(MetricArgs),

    /// Dump yaw/pitch of every sample of a geometry
    #[command(name = "sphere-points", visible_alias = "sp")]
    SpherePoints(SpherePointsArgs),
}

/// Overrides of a session's output geometry.
#[derive(Args, Default)]
struct OutputOverrides {
    /// Output projection (erp, cmp, eac, ohp, isp, ...)
    #[arg(long)]
    projection: Option<ProjectionKind>,

    /// Output face width and height
    #[arg(long)]
    face_size: Option<usize>,

    /// Output frame packing, e.g. "4 0 5 / 3@180 1@270 2"
    #[arg(long)]
    packing: Option<String>,

    /// Output yaw in degrees
    #[arg(long, allow_hyphen_values = true)]
    yaw: Option<f64>,

    /// Output pitch in degrees
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f64>,

    /// Output roll in degrees
    #[arg(long, allow_hyphen_values = true)]
    roll: Option<f64>,

    /// Output guard band in luma samples
    #[arg(long)]
    guard_band: Option<usize>,

    /// Output guard band fill: geometry, repetitive or neighbour
    #[arg(long)]
    guard_band_fill: Option<GuardBandFill>,
}

#[derive(Args)]
struct ConvertArgs {
    /// Session file
    #[arg(short, long)]
    config: PathBuf,

    /// Input YUV file
    #[arg(short, long)]
    input: PathBuf,

    /// Output YUV file
    #[arg(short, long)]
    output: PathBuf,

    /// Frames to convert (all by default)
    #[arg(short, long)]
    frames: Option<usize>,

    /// Frames to skip at the start of the input
    #[arg(short, long)]
    skip: Option<usize>,

    /// Undo the input's rotation instead of applying the output's
    #[arg(long)]
    inverse: bool,

    #[command(flatten)]
    overrides: OutputOverrides,
}

#[derive(Args)]
struct InfoArgs {
    /// Session file
    #[arg(short, long)]
    config: PathBuf,

    /// Print the resolved descriptors as YAML
    #[arg(long)]
    yaml: bool,

    #[command(flatten)]
    overrides: OutputOverrides,
}

/// Quality metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricKind {
    /// Plain PSNR of packed pictures
    Psnr,
    /// Latitude-weighted PSNR of equirectangular pictures
    WsPsnr,
    /// Nearest-sample PSNR on uniform sphere points
    SPsnr,
}

#[derive(Args)]
struct MetricArgs {
    /// Session file; the input geometry describes the reference, the output the test
    #[arg(short, long)]
    config: PathBuf,

    /// Reference YUV file
    #[arg(short, long)]
    reference: PathBuf,

    /// Test YUV file
    #[arg(short, long)]
    test: PathBuf,

    /// Metric
    #[arg(short, long, value_enum, default_value = "psnr")]
    metric: MetricKind,

    /// Sphere points for s-psnr
    #[arg(long, default_value_t = sv360_geometry::metrics::DEFAULT_SPHERE_POINTS)]
    points: usize,

    /// Frames to compare (all by default)
    #[arg(short, long)]
    frames: Option<usize>,
}

/// Side of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    /// The input geometry
    Input,
    /// The output geometry
    Output,
}

#[derive(Args)]
struct SpherePointsArgs {
    /// Session file
    #[arg(short, long)]
    config: PathBuf,

    /// Output text file
    #[arg(short, long)]
    output: PathBuf,

    /// Geometry to dump
    #[arg(long, value_enum, default_value = "input")]
    side: Side,

    /// Component (0 = luma)
    #[arg(long, default_value = "0")]
    comp: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Metric(args) => commands::metric::run(args, cli.verbose),
        Commands::SpherePoints(args) => commands::sphere_points::run(args, cli.verbose),
    }
}
