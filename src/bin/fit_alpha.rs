//! Fits `alpha` in `m(delta) ~ C delta^alpha` from a measurement record.

use clap::Parser;
use log::warn;
use std::path::PathBuf;
use std::process;
use vortexsublevel::errors::*;
use vortexsublevel::fit::{fit_measurement, FitRange};
use vortexsublevel::measurement::MeasurementRecord;
use vortexsublevel::output::{load_json, save_json};
use vortexsublevel::settings::{read_parameter_file, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "vortex-fit",
    about = "Fit alpha in m(delta) ~ delta^alpha from measurement JSON"
)]
struct Args {
    /// Input measurement JSON
    #[arg(long = "in")]
    input: PathBuf,

    /// Output fit JSON
    #[arg(long)]
    out: PathBuf,

    /// TOML parameter file, only the `[fit]` table is used
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower end of the fit range (absolute delta)
    #[arg(long)]
    dmin: Option<f64>,

    /// Upper end of the fit range (absolute delta)
    #[arg(long)]
    dmax: Option<f64>,
}

fn run(args: &Args) -> Result<()> {
    let settings = match args.config {
        Some(ref p) => read_parameter_file(p)?,
        None => Settings::default(),
    };

    let range = match (args.dmin, args.dmax) {
        (Some(lo), Some(hi)) => Some(FitRange::new(lo, hi)?),
        (None, None) => None,
        _ => {
            warn!("Both --dmin and --dmax are needed for an explicit range, choosing one.");
            None
        }
    };

    let record: MeasurementRecord = load_json(&args.input)?;
    let fit = fit_measurement(&record, range, &settings.fit);

    save_json(&args.out, &fit)
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
