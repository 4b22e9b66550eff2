//! `horizon` command-line tool.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use horizon::{
    compose_frame, IntroConfig, Particle, ParticleField, PixelSurface, RunOptions, SessionSeed,
    Surface, TriggerSet, Viewport,
};

#[derive(Parser)]
#[command(name = "horizon")]
#[command(about = "Black-hole intro animation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the intro in a window until it is dismissed
    Run {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Session seed (random when omitted)
        #[arg(long)]
        seed: Option<f64>,

        /// Skip the animation as if the platform asked for reduced motion
        #[arg(long)]
        reduced_motion: bool,

        /// Which inputs dismiss the intro
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        /// Auto-dismiss delay for the click variant (ms)
        #[arg(long, default_value_t = 8000.0)]
        timeout: f64,

        #[arg(long, default_value_t = 1280)]
        width: u32,

        #[arg(long, default_value_t = 720)]
        height: u32,
    },

    /// Render a single frame to a PNG file
    Snapshot {
        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 1920)]
        width: u32,

        #[arg(long, default_value_t = 1080)]
        height: u32,

        /// Elapsed animation time (ms)
        #[arg(short, long, default_value_t = 5000.0)]
        time: f32,

        #[arg(long, default_value_t = 42.0)]
        seed: f64,
    },

    /// Print generated particles as JSON
    Inspect {
        #[arg(long, default_value_t = 42.0)]
        seed: f64,

        #[arg(long, default_value_t = 1920.0)]
        width: f32,

        #[arg(long, default_value_t = 1080.0)]
        height: f32,

        /// Number of particles to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// Scroll, wheel or key press
    Scroll,
    /// Click or key press, or automatically after a timeout
    Click,
}

#[derive(Serialize)]
struct FieldReport<'a> {
    seed: SessionSeed,
    viewport: Viewport,
    total: usize,
    particles: &'a [Particle],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = log_level(cli.verbose, cli.quiet) {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Run {
            config,
            seed,
            reduced_motion,
            variant,
            timeout,
            width,
            height,
        } => {
            let mut config = load_config(config)?;
            match variant {
                Some(Variant::Scroll) => config = config.with_triggers(TriggerSet::scroll_to_enter()),
                Some(Variant::Click) => config = config.with_triggers(TriggerSet::click_or_timeout(timeout)),
                None => {}
            }
            horizon::run(RunOptions {
                config,
                seed: seed.map(SessionSeed::new),
                reduced_motion,
                width,
                height,
                ..Default::default()
            })?;
            Ok(())
        }

        Commands::Snapshot {
            out,
            config,
            width,
            height,
            time,
            seed,
        } => {
            let config = load_config(config)?;
            let viewport = Viewport::from((width, height));
            let field = ParticleField::generate(SessionSeed::new(seed), viewport, &config.field);
            let frame = compose_frame(&field, time, viewport, &config);

            let mut surface = PixelSurface::new(width, height);
            surface.draw(&frame, 1.0)?;
            surface
                .save_png(&out)
                .with_context(|| format!("writing snapshot to {}", out.display()))?;
            println!("{}", out.display());
            Ok(())
        }

        Commands::Inspect {
            seed,
            width,
            height,
            count,
        } => {
            let viewport = Viewport::new(width, height);
            let field = ParticleField::generate(SessionSeed::new(seed), viewport, &Default::default());
            let shown = count.min(field.len());
            let report = FieldReport {
                seed: field.seed(),
                viewport,
                total: field.len(),
                particles: &field.particles()[..shown],
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// Level forced by `-v`/`-q`; `None` leaves `RUST_LOG` (or `warn`) in charge.
fn log_level(verbose: u8, quiet: bool) -> Option<log::LevelFilter> {
    match verbose {
        0 if quiet => Some(log::LevelFilter::Error),
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<IntroConfig> {
    match path {
        Some(path) => Ok(IntroConfig::load(&path)?),
        None => Ok(IntroConfig::default()),
    }
}
