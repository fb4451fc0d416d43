use anyhow::{Context, Result};
use boid_driver::driver::{DriverOptions, TickDriver};
use boid_driver::settings::{build_simulation, resolve_settings, SettingsOverrides};
use boid_shared::Position;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless boid flocking simulation", long_about = None)]
struct Args {
    /// JSON settings file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// World width
    #[arg(long)]
    width: Option<f32>,

    /// World height
    #[arg(long)]
    height: Option<f32>,

    /// Number of boids (at least 2)
    #[arg(short, long)]
    boids: Option<usize>,

    /// Ticks per second, 0 runs as fast as possible
    #[arg(short, long)]
    tick_rate: Option<f64>,

    /// Seed for the initial population
    #[arg(short, long)]
    seed: Option<u64>,

    /// Attractor x coordinate (requires --attractor-y)
    #[arg(long, requires = "attractor_y")]
    attractor_x: Option<f32>,

    /// Attractor y coordinate (requires --attractor-x)
    #[arg(long, requires = "attractor_x")]
    attractor_y: Option<f32>,

    /// Stop after this many ticks
    #[arg(short = 'n', long)]
    ticks: Option<u64>,

    /// Write a JSON snapshot line every N ticks
    #[arg(long)]
    snapshot_every: Option<u64>,

    /// Snapshot output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        let attractor = match (self.attractor_x, self.attractor_y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        };

        SettingsOverrides {
            world_width: self.width,
            world_height: self.height,
            boid_count: self.boids,
            tick_rate: self.tick_rate,
            seed: self.seed,
            attractor,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Boid driver starting...");

    let settings = resolve_settings(args.config.as_deref(), &args.overrides())?;
    log::info!(
        "World: {} x {}, boids: {}",
        settings.world_width,
        settings.world_height,
        settings.boid_count
    );

    let simulation = build_simulation(&settings);
    let options = DriverOptions {
        tick_rate: settings.tick_rate,
        max_ticks: args.ticks,
        snapshot_every: args.snapshot_every,
    };

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut driver = TickDriver::new(simulation, options, sink);
    let status = driver.run().context("Driver error")?;

    log::info!("Final status: {}", serde_json::to_string(&status)?);

    Ok(())
}
