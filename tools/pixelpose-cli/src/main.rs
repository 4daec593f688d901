//! PixelPose CLI: batch sprite-sheet rendering for pose datasets.
//!
//! Usage:
//!   pixelpose render <SOURCES> <TARGETS>   Render every (target, source) pair
//!   pixelpose poses <POSES_JSON>           Draw stick figures for a pose sequence
//!   pixelpose pixelate <FRAMES_DIR>        Pixelate a directory of frames
//!   pixelpose check                        Check the scene tool setup

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pixelpose_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "pixelpose",
    about = "Render retargeted sprite sheets with matching pose images",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every source motion onto every target character
    Render {
        /// Directory of source motion assets
        source_dir: PathBuf,

        /// Directory of target character assets
        target_dir: PathBuf,

        /// Output root directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Square output resolution in pixels
        #[arg(long)]
        resolution: Option<u32>,

        /// Output frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Pixelation block size
        #[arg(long)]
        pixel_size: Option<u32>,

        /// Number of parallel workers
        #[arg(short = 'n', long)]
        workers: Option<usize>,

        /// Only count frames, render nothing
        #[arg(short, long)]
        count_only: bool,

        /// Move sources that fail a job into the purge directory
        #[arg(short, long)]
        purge_errors: bool,

        /// Quarantine directory used with --purge-errors
        #[arg(long)]
        purge_dir: Option<PathBuf>,

        /// Asset file extension
        #[arg(long)]
        extension: Option<String>,

        /// Estimate frame counts from exported rigs instead of asking the scene tool
        #[arg(long)]
        native_count: bool,

        /// Scene tool command line, e.g. "blender --background --python scene_tool.py --"
        #[arg(long, value_name = "CMD")]
        scene_tool: Option<String>,
    },

    /// Draw stick figures for an existing poses.json
    Poses {
        /// Path to a pose sequence file
        poses_json: PathBuf,

        /// Output directory (defaults to the file's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image width (defaults to the sequence resolution)
        #[arg(long)]
        width: Option<u32>,

        /// Image height (defaults to the sequence resolution)
        #[arg(long)]
        height: Option<u32>,
    },

    /// Pixelate every PNG frame in a directory
    Pixelate {
        /// Directory of PNG frames
        frames_dir: PathBuf,

        /// Output directory (defaults to the frames directory's parent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pixelation block size
        #[arg(long)]
        pixel_size: Option<u32>,
    },

    /// Check that the scene tool can be launched
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    pixelpose_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Render {
            source_dir,
            target_dir,
            output,
            resolution,
            fps,
            pixel_size,
            workers,
            count_only,
            purge_errors,
            purge_dir,
            extension,
            native_count,
            scene_tool,
        } => commands::render::run(
            &config,
            commands::render::RenderArgs {
                source_dir,
                target_dir,
                output,
                resolution,
                fps,
                pixel_size,
                workers,
                count_only,
                purge_errors,
                purge_dir,
                extension,
                native_count,
                scene_tool,
            },
        ),
        Commands::Poses {
            poses_json,
            output,
            width,
            height,
        } => commands::poses::run(poses_json, output, width, height),
        Commands::Pixelate {
            frames_dir,
            output,
            pixel_size,
        } => commands::pixelate::run(
            frames_dir,
            output,
            pixel_size.unwrap_or(config.batch.pixel_size),
        ),
        Commands::Check => commands::check::run(&config),
    }
}
