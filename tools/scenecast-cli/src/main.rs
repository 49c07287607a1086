//! scenecast CLI — render the animation scenes and combine them into one video.
//!
//! Usage:
//!   scenecast render [QUALITY]     Render every scene (l, m, h, k; default h)
//!   scenecast combine [TOKEN]      Concatenate rendered scenes (default 1080p60)
//!   scenecast build [QUALITY]      Render, then combine
//!   scenecast scenes               List scenes in video order
//!   scenecast manifest [TOKEN]     Print the concat manifest
//!   scenecast check                Check external tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use scenecast_common::config::AppConfig;
use scenecast_render_engine::runner::{DryRunRunner, ProcessRunner, ToolRunner};
use scenecast_scene_model::ResolutionToken;

mod commands;

#[derive(Parser)]
#[command(
    name = "scenecast",
    about = "Render animation scenes and stitch them into one video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./scenecast.json, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render scenes with the animation renderer
    Render {
        /// Quality token passed to the renderer: l, m, h, or k
        #[arg(default_value = "h")]
        quality: String,

        /// Render only these scenes (repeatable)
        #[arg(long = "scene")]
        scenes: Vec<String>,

        /// Scene-description source file
        #[arg(long)]
        scene_file: Option<PathBuf>,

        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Concatenate the rendered scenes without re-encoding
    Combine {
        /// Resolution directory the scenes were rendered into
        #[arg(default_value = ResolutionToken::DEFAULT)]
        token: ResolutionToken,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Probe every input and write a JSON report next to the output
        #[arg(long)]
        report: bool,

        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Render every scene, then combine them
    Build {
        /// Quality token passed to the renderer: l, m, h, or k
        #[arg(default_value = "h")]
        quality: String,

        /// Resolution directory to combine from (derived from quality by default)
        #[arg(long)]
        token: Option<ResolutionToken>,

        /// Probe every input and write a JSON report next to the output
        #[arg(long)]
        report: bool,

        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// List scenes in video order
    Scenes {
        /// Show expected video paths for this resolution directory
        #[arg(long, default_value = ResolutionToken::DEFAULT)]
        token: ResolutionToken,
    },

    /// Print the concat manifest for a resolution directory
    Manifest {
        #[arg(default_value = ResolutionToken::DEFAULT)]
        token: ResolutionToken,
    },

    /// Check that the renderer, ffmpeg and ffprobe are available
    Check,
}

fn runner(dry_run: bool) -> Box<dyn ToolRunner> {
    if dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(ProcessRunner)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    // Initialize logging
    let mut logging = loaded.config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    scenecast_common::logging::init_logging(&logging);
    loaded.log_warnings();
    if let Some(source) = &loaded.source {
        tracing::debug!(path = %source.display(), "Loaded config");
    }
    let config = loaded.config;

    match cli.command {
        Commands::Render {
            quality,
            scenes,
            scene_file,
            dry_run,
        } => commands::render::run(&config, runner(dry_run).as_ref(), quality, scenes, scene_file),
        Commands::Combine {
            token,
            output,
            report,
            dry_run,
        } => commands::combine::run(&config, runner(dry_run).as_ref(), token, output, report),
        Commands::Build {
            quality,
            token,
            report,
            dry_run,
        } => commands::build::run(&config, runner(dry_run).as_ref(), quality, token, report),
        Commands::Scenes { token } => commands::scenes::run(&config, token),
        Commands::Manifest { token } => commands::manifest::run(&config, token),
        Commands::Check => commands::check::run(&config),
    }
}
