//! Loopscan CLI: find repetitions and sets in workout videos.
//!
//! Usage:
//!   loopscan analyze <VIDEO>   Detect reps or sets in a video
//!   loopscan info <VIDEO>      Show probed media information
//!   loopscan check             Check that ffmpeg tooling is available

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use loopscan_analysis_model::loops::DetectionMode;

mod commands;

#[derive(Parser)]
#[command(
    name = "loopscan",
    about = "Offline repetition and set detection for workout videos",
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
    /// Detect repetitions or sets in a video
    Analyze {
        /// Path to the video file
        video: PathBuf,

        /// JSON file with analysis settings; flags below override it
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Peak threshold strictness [1, 100] (higher = stricter)
        #[arg(short, long)]
        sensitivity: Option<u32>,

        /// Shortest accepted loop (seconds)
        #[arg(long)]
        min_loop: Option<f64>,

        /// Longest accepted loop (seconds)
        #[arg(long)]
        max_loop: Option<f64>,

        /// Sampling rate in frames per second [2, 30]
        #[arg(short, long)]
        rate: Option<u32>,

        /// Half-width of the peak smoothing window (samples)
        #[arg(long)]
        smoothing: Option<usize>,

        /// Detection mode: reps|sets
        #[arg(short, long)]
        mode: Option<DetectionMode>,

        /// Audio weight in the fused signal [0, 100]
        #[arg(long)]
        audio_weight: Option<u32>,

        /// Do not flag scene cuts
        #[arg(long)]
        no_scene_cuts: bool,

        /// Subtract slow motion trends (pans, zooms) before peak picking
        #[arg(long)]
        ignore_steady_motion: bool,

        /// Skip audio decoding entirely
        #[arg(long)]
        no_audio: bool,

        /// Write the full result as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the result into the configured results directory
        #[arg(long)]
        save: bool,
    },

    /// Show probed media information
    Info {
        /// Path to the video file
        video: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that ffmpeg tooling is available
    Check {
        /// Write a default config file if none exists
        #[arg(long)]
        init_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = loopscan_common::config::AppConfig::load();

    // Initialize logging
    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    loopscan_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze {
            video,
            settings,
            sensitivity,
            min_loop,
            max_loop,
            rate,
            smoothing,
            mode,
            audio_weight,
            no_scene_cuts,
            ignore_steady_motion,
            no_audio,
            output,
            save,
        } => {
            let overrides = commands::analyze::SettingsOverrides {
                sensitivity,
                min_loop_duration: min_loop,
                max_loop_duration: max_loop,
                sampling_rate: rate,
                smoothing_window: smoothing,
                detection_mode: mode,
                audio_weight,
                no_scene_cuts,
                ignore_steady_motion,
                no_audio,
            };
            commands::analyze::run(&app_config, video, settings, overrides, output, save).await
        }
        Commands::Info { video, json } => commands::info::run(&app_config, video, json).await,
        Commands::Check { init_config } => commands::check::run(&app_config, init_config).await,
    }
}
