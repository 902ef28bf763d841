//! Measures sublevel sets, strain residues and the Fisher like functional of a
//! field snapshot and writes the record as JSON.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use vortexsublevel::errors::*;
use vortexsublevel::measurement::{compute_all, MeasureConfig};
use vortexsublevel::output::save_json;
use vortexsublevel::settings::{read_parameter_file, Settings};
use vortexsublevel::snapshot::read_snapshot;

#[derive(Parser, Debug)]
#[command(
    name = "vortex-measure",
    about = "Measure sublevel sets, residues and the Fisher like term of a snapshot"
)]
struct Args {
    /// Input snapshot (.cbor, .bincode or .msgpack)
    #[arg(long = "in")]
    input: PathBuf,

    /// Output JSON path
    #[arg(long)]
    out: PathBuf,

    /// TOML parameter file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directional complexity threshold of the diagnostic
    #[arg(long = "M")]
    m_threshold: Option<f64>,

    /// Reconstruct a missing velocity from the vorticity
    #[arg(long)]
    reconstruct_velocity: bool,
}

fn run(args: &Args) -> Result<()> {
    let settings = match args.config {
        Some(ref p) => read_parameter_file(p)?,
        None => Settings::default(),
    };

    let snapshot = read_snapshot(&args.input)?;
    let grid = snapshot.grid()?;

    let mut config = MeasureConfig::from_settings(grid.n, grid.length, &settings.measure)?;
    if let Some(m) = args.m_threshold {
        config = config.with_m_threshold(m)?;
    }
    if args.reconstruct_velocity {
        config = config.with_reconstruct_velocity(true);
    }

    let record = compute_all(&snapshot, &config)?;
    save_json(&args.out, &record)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(ref e) = run(&args) {
        eprintln!("error: {}", e);
        for e in e.iter().skip(1) {
            eprintln!("caused by: {}", e);
        }
        process::exit(1);
    }
}
