//! mot2yolo: SoccerNet-MOT to YOLO dataset conversion.
//!
//! Reads multi-object-tracking sequences (`gameinfo.ini`, `gt/gt.txt`,
//! `img1/`), assigns each track a class, normalizes boxes into YOLO label
//! lines and lays images and labels out as per-game train/valid/test splits.
//!
//! # Modules
//!
//! - [`mot`]: sequence inputs, track classes, box normalization, label files
//! - [`split`]: frame-to-split planning
//! - [`conversion`]: the output tree and the run report
//! - [`config`]: config file and CLI settings
//! - [`error`]: error types for mot2yolo operations

pub mod config;
pub mod conversion;
pub mod error;
pub mod mot;
pub mod split;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::{ConfigFile, ConvertConfig, PolicyKind, SplitSection};
pub use error::Mot2YoloError;
use split::Split;

/// The mot2yolo CLI application.
#[derive(Parser)]
#[command(name = "mot2yolo")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of SoccerNet-MOT sequences into a YOLO dataset.
    Convert(ConvertArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Directory containing one subdirectory per sequence.
    source: PathBuf,

    /// Output root; one subdirectory is created per game id.
    target: PathBuf,

    /// YAML config file (split settings, image extension, class table).
    #[arg(long, env = "MOT2YOLO_CONFIG")]
    config: Option<PathBuf>,

    /// Split policy.
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Target split for the single policy.
    #[arg(long, value_enum)]
    split: Option<Split>,

    /// Train ratio.
    #[arg(long)]
    train: Option<f64>,

    /// Valid ratio.
    #[arg(long)]
    valid: Option<f64>,

    /// Test ratio (chronological policy only).
    #[arg(long)]
    test: Option<f64>,

    /// Shuffle seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Frame image extension.
    #[arg(long = "image-ext")]
    image_ext: Option<String>,

    /// Output format for the report ('text' or 'json').
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the mot2yolo CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), Mot2YoloError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            println!("mot2yolo {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("SoccerNet-MOT to YOLO dataset converter.");
            println!();
            println!("Run 'mot2yolo --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
///
/// Skipped sequences and failed file operations are reported, not returned
/// as errors.
fn run_convert(args: ConvertArgs) -> Result<(), Mot2YoloError> {
    let file = match &args.config {
        Some(path) => config::load_config_file(path)?,
        None => ConfigFile::default(),
    };

    let overrides = SplitSection {
        policy: args.policy,
        train: args.train,
        valid: args.valid,
        test: args.test,
        seed: args.seed,
        split: args.split,
    };

    let config = ConvertConfig::from_parts(
        args.source,
        args.target,
        file,
        overrides,
        args.image_ext,
    );

    let report = conversion::convert_dataset(&config)?;

    match args.output {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print!("{}", report),
    }

    Ok(())
}
