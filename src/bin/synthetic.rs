//! Generates synthetic and exact-solution snapshots.

use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::process;
use vortexsublevel::consts::{DEFAULT_DOMAIN_LENGTH, DEFAULT_VISCOSITY};
use vortexsublevel::errors::*;
use vortexsublevel::snapshot::{write_snapshot, Snapshot};
use vortexsublevel::synthetic;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    /// Random divergence free velocity
    Synthetic,
    /// Taylor-Green vortex, sheet-like zeros
    TaylorGreen,
    /// ABC flow, no zeros
    Abc,
    /// Burgers vortex tube, no zeros
    Burgers,
    /// Single vortex filament, line-like zeros
    Filament,
    /// Vortex sheet, plane-like zeros
    Sheet,
    /// Random set of filaments
    Tangle,
    /// Curl of the random velocity, generic zeros
    Smooth,
}

#[derive(Parser, Debug)]
#[command(name = "vortex-synthetic", about = "Generate a field snapshot")]
struct Args {
    /// Output snapshot (.cbor, .bincode or .msgpack)
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = Kind::Synthetic)]
    kind: Kind,

    /// Grid points per axis
    #[arg(long, default_value_t = 64)]
    n: usize,

    /// Domain length
    #[arg(long = "L", default_value_t = DEFAULT_DOMAIN_LENGTH)]
    length: f64,

    /// Viscosity, stored as metadata
    #[arg(long, default_value_t = DEFAULT_VISCOSITY)]
    nu: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Amplitude [taylor-green: 1, filament and sheet: 10, tangle: 8]
    #[arg(long)]
    amplitude: Option<f64>,

    /// Core radius [burgers: 0.2, filament: 0.1, tangle: 0.08]
    #[arg(long)]
    core_radius: Option<f64>,

    /// Circulation of the Burgers vortex
    #[arg(long, default_value_t = 10.)]
    gamma: f64,

    /// Thickness of the vortex sheet
    #[arg(long, default_value_t = 0.05)]
    thickness: f64,

    /// Number of filaments of the tangle
    #[arg(long, default_value_t = 5)]
    num_filaments: usize,

    /// ABC flow coefficients
    #[arg(long = "A", default_value_t = 1.)]
    a: f64,
    #[arg(long = "B", default_value_t = 1.)]
    b: f64,
    #[arg(long = "C", default_value_t = 1.)]
    c: f64,
}

fn generate(args: &Args) -> Result<Snapshot> {
    let (n, l) = (args.n, args.length);
    let amplitude = |default: f64| args.amplitude.unwrap_or(default);
    let core_radius = |default: f64| args.core_radius.unwrap_or(default);

    match args.kind {
        Kind::Synthetic => synthetic::synthetic_velocity(n, l, args.seed),
        Kind::TaylorGreen => synthetic::taylor_green(n, l, amplitude(1.)),
        Kind::Abc => synthetic::abc_flow(n, l, args.a, args.b, args.c),
        Kind::Burgers => synthetic::burgers_vortex(n, l, args.gamma, core_radius(0.2)),
        Kind::Filament => synthetic::vortex_filament(n, l, core_radius(0.1), amplitude(10.)),
        Kind::Sheet => synthetic::vortex_sheet(n, l, args.thickness, amplitude(10.)),
        Kind::Tangle => synthetic::vortex_tangle(
            n,
            l,
            args.num_filaments,
            core_radius(0.08),
            amplitude(8.),
            args.seed,
        ),
        Kind::Smooth => synthetic::smooth_reference(n, l, args.seed),
    }
}

fn run(args: &Args) -> Result<()> {
    let snapshot = generate(args)?.with_nu(args.nu);
    write_snapshot(&args.out, &snapshot)?;

    info!("Wrote {:?} snapshot to {}", args.kind, args.out.display());

    Ok(())
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
