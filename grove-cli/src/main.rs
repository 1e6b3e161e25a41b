//! Command-line entry point for the grove tree simulator.
//!
//! Grows a seeded landscape of trees without a display and writes every
//! tree's draw records as JSON, either as progressive frames or as one
//! final frame per tree. Logging goes to stderr; set `RUST_LOG` to change
//! the level (default `info` for the grove crates).

mod config;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use config::SceneConfig;
use grove_core::landscape::Landscape;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Grow stochastic 2-D trees and emit their draw records")]
struct Args {
    /// Scene config (TOML); a missing file means defaults
    #[arg(short, long, default_value = "grove.toml")]
    config: PathBuf,

    /// Landscape seed; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of trees, overriding the config
    #[arg(short, long)]
    trees: Option<usize>,

    /// Growth steps per tree, overriding the config
    #[arg(long)]
    steps: Option<usize>,

    /// Steps per emitted frame, `0` for final frames only
    #[arg(long)]
    every: Option<usize>,

    /// Padding around the view box, in percent of its size
    #[arg(long, default_value_t = 10.0)]
    padding: f32,

    /// Aspect ratio of the view box, as width and height
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [1200.0, 800.0])]
    aspect: Vec<f32>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("grove=info,grove_core=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = SceneConfig::load(&args.config)?;
    if let Some(trees) = args.trees {
        config.landscape.tree_count = trees;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(every) = args.every {
        config.every = every;
    }
    let seed = args.seed.unwrap_or_else(rand::random);

    tracing::info!(
        seed,
        trees = config.landscape.tree_count,
        steps = config.steps,
        every = config.every,
        "growing landscape"
    );

    let mut landscape = Landscape::new(&config.growth, &config.landscape, seed)
        .context("invalid scene parameters")?;
    let trees = scene::grow(&mut landscape, config.steps, config.every);

    let (width, height) = match args.aspect.as_slice() {
        &[w, h] => (w, h),
        _ => (1200.0, 800.0),
    };
    let view_box = scene::view_box(&landscape, args.padding, width, height);
    let output = scene::assemble(seed, config.steps, view_box, trees);

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, &output).context("writing scene JSON")?;
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}
