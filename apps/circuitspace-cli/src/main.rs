use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use circuitspace_common::{BlockKind, CELL_COUNT, MAX_POWER, WORLD_SIZE};
use circuitspace_kernel::{SimConfig, Simulation, World, import};
use circuitspace_tools::{MetricsRecorder, WorldInspector};

mod demos;

#[derive(Parser)]
#[command(name = "circuitspace-cli", about = "CLI driver for the circuitspace voxel simulator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print simulator version and world constants
    Info,
    /// Load a world file and step it on a fixed interval
    Run {
        /// JSON block list to load (empty world if omitted)
        #[arg(short, long)]
        world: Option<PathBuf>,
        /// JSON simulation config
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of ticks to run (overrides config)
        #[arg(short, long)]
        ticks: Option<u64>,
        /// Milliseconds between ticks (overrides config; 0 steps as fast as possible)
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// Print this Y-layer after the run
        #[arg(short, long)]
        slice: Option<i32>,
        /// Write the final world to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a built-in circuit and step it
    Demo {
        #[arg(value_enum)]
        demo: demos::Demo,
        /// Number of ticks to run
        #[arg(short, long, default_value = "12")]
        ticks: u64,
    },
    /// Print one Y-layer of a world file
    Slice {
        /// JSON block list to load
        #[arg(short, long)]
        world: PathBuf,
        /// Layer to print
        #[arg(short, long, default_value = "0")]
        y: i32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("circuitspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("world: {WORLD_SIZE}^3 = {CELL_COUNT} cells, max power {MAX_POWER}");
            let palette: Vec<&str> = BlockKind::ALL.iter().map(|k| k.name()).collect();
            println!("palette: {}", palette.join(" -> "));
            println!("defaults: {:?}", SimConfig::default());
        }
        Commands::Run {
            world,
            config,
            ticks,
            interval_ms,
            slice,
            output,
        } => {
            let mut cfg = match config {
                Some(path) => load_config(&path)?,
                None => SimConfig::default(),
            };
            if let Some(ticks) = ticks {
                cfg.max_ticks = ticks;
            }
            if let Some(ms) = interval_ms {
                cfg.tick_interval_ms = ms;
            }

            let world = match world {
                Some(path) => load_world(&path)?,
                None => World::new(),
            };
            let sim = drive(Simulation::new(world), &cfg);

            if let Some(y) = slice {
                print!("{}", WorldInspector::render_layer(sim.world(), y));
            }
            if let Some(path) = output {
                let text = import::blocks_to_json(&sim.world().get_all())?;
                std::fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(path = %path.display(), "world written");
            }
        }
        Commands::Demo { demo, ticks } => {
            let (world, editor) = demos::build(demo)?;
            tracing::info!(?demo, edits = editor.undo_count(), "demo built");
            let cfg = SimConfig {
                max_ticks: ticks,
                tick_interval_ms: 0,
                ..SimConfig::default()
            };
            let sim = drive(Simulation::new(world), &cfg);
            print!("{}", WorldInspector::render_layer(sim.world(), 0));
        }
        Commands::Slice { world, y } => {
            let world = load_world(&world)?;
            print!("{}", WorldInspector::render_layer(&world, y));
        }
    }

    Ok(())
}

/// Fixed-interval driver: one tick at a time, never overlapping.
fn drive(mut sim: Simulation, cfg: &SimConfig) -> Simulation {
    let recorder = Rc::new(RefCell::new(MetricsRecorder::new(cfg.metrics_history)));
    sim.add_sink(Rc::clone(&recorder));

    println!("{}", WorldInspector::summary(&sim));
    for _ in 0..cfg.max_ticks {
        let sample = sim.step();
        println!("{sample}");
        if cfg.tick_interval_ms > 0 {
            std::thread::sleep(cfg.tick_interval());
        }
    }
    println!("{}", WorldInspector::summary(&sim));
    println!("{}", recorder.borrow());
    sim
}

fn load_world(path: &Path) -> anyhow::Result<World> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let blocks = import::blocks_from_json(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    let mut world = World::new();
    world.replace_all(blocks);
    tracing::info!(path = %path.display(), blocks = world.len(), "world loaded");
    Ok(world)
}

fn load_config(path: &Path) -> anyhow::Result<SimConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SimConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}
