//! Seeded and exact-solution field generators.
//!
//! Every generator is a pure function of its arguments. Wave numbers are
//! scaled by `2 pi / L`, so all fields are periodic on the box for any `L`.


use crate::consts::TWOPI;
use crate::errors::*;
use crate::mesh::Grid;
use crate::snapshot::Snapshot;
use crate::spectral::{SpectralDerivative, VectorField3D};
use log::debug;
use rand::distributions::Uniform;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64Mcg;
use std::f64::consts::PI;

const NUMBER_OF_MODES: usize = 6;
const MAX_WAVE_NUMBER: i32 = 4;
/// Offset of the normalisation, keeps an all-zero draw finite.
const NORM_OFFSET: f64 = 1e-12;
/// Radius below which the azimuthal direction is undefined and set to zero.
const AXIS_RADIUS: f64 = 1e-6;

/// One mode of the vector potential `A`.
#[derive(Debug, Clone, Copy)]
struct PotentialMode {
    k: [f64; 3],
    phase: f64,
    amplitude: f64,
}

fn draw_modes(seed: u64) -> Vec<PotentialMode> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let wave_number = Uniform::new_inclusive(1, MAX_WAVE_NUMBER);
    let phase = Uniform::new(0., TWOPI);

    (0..NUMBER_OF_MODES)
        .map(|_| {
            let k = [
                f64::from(rng.sample(wave_number)),
                f64::from(rng.sample(wave_number)),
                f64::from(rng.sample(wave_number)),
            ];
            let phase = rng.sample(phase);
            let amplitude: f64 = rng.sample(StandardNormal);

            PotentialMode {
                k,
                phase,
                amplitude,
            }
        })
        .collect()
}

/// Divergence free velocity `u = curl A` of a few random potential modes,
/// normalised to unit RMS. The curl is evaluated analytically.
pub fn synthetic_velocity_field(grid: Grid, seed: u64) -> VectorField3D {
    let modes = draw_modes(seed);
    let s = TWOPI / grid.length;

    let mut u = grid.sample_vector(|x, y, z| {
        let mut v = [0.; 3];
        for m in &modes {
            let [k0, k1, k2] = m.k;
            let a = m.amplitude * s;
            // A = a (sin p1, cos p2, sin p3)
            let p1 = s * (k0 * x + k1 * y + k2 * z) + m.phase;
            let p2 = s * (k0 * x - k1 * y + k2 * z) + m.phase;
            let p3 = s * (k0 * x + k1 * y - k2 * z) + m.phase;

            v[0] += a * (k1 * p3.cos() + k2 * p2.sin());
            v[1] += a * (k2 * p1.cos() - k0 * p3.cos());
            v[2] -= a * (k0 * p2.sin() + k1 * p1.cos());
        }
        v
    });

    let rms = (u.iter().map(|v| v * v).sum::<f64>() / u.len() as f64).sqrt();
    u /= rms + NORM_OFFSET;

    u
}

/// Snapshot holding a synthetic divergence free velocity field.
pub fn synthetic_velocity(n: usize, length: f64, seed: u64) -> Result<Snapshot> {
    let grid = Grid::new(n, length)?;
    debug!("Drawing synthetic velocity with seed {}.", seed);

    Snapshot::from_velocity(synthetic_velocity_field(grid, seed))?.with_domain_length(length)
}

/// Smooth random vorticity, the curl of the synthetic velocity. Its zero set
/// is generic, so no velocity is stored.
pub fn smooth_reference(n: usize, length: f64, seed: u64) -> Result<Snapshot> {
    let grid = Grid::new(n, length)?;
    let u = synthetic_velocity_field(grid, seed);
    let omega = SpectralDerivative::new(grid).curl(u.view())?;

    Snapshot::from_vorticity(omega)?.with_domain_length(length)
}

/// Taylor-Green vortex, `u = A (sin x cos y cos z, -cos x sin y cos z, 0)`.
/// The vorticity vanishes on planes.
pub fn taylor_green(n: usize, length: f64, amplitude: f64) -> Result<Snapshot> {
    let grid = Grid::new(n, length)?;
    let s = TWOPI / length;

    let u = grid.sample_vector(|x, y, z| {
        let (sx, cx) = (s * x).sin_cos();
        let (sy, cy) = (s * y).sin_cos();
        let cz = (s * z).cos();
        [amplitude * sx * cy * cz, -amplitude * cx * sy * cz, 0.]
    });
    let omega = SpectralDerivative::new(grid).curl(u.view())?;

    Snapshot::new(Some(omega), Some(u))?.with_domain_length(length)
}

/// Arnold-Beltrami-Childress flow. Being a Beltrami field, `omega = (2 pi / L) u`.
pub fn abc_flow(n: usize, length: f64, a: f64, b: f64, c: f64) -> Result<Snapshot> {
    let grid = Grid::new(n, length)?;
    let s = TWOPI / length;

    let u = grid.sample_vector(|x, y, z| {
        let (x, y, z) = (s * x, s * y, s * z);
        [
            a * z.sin() + c * y.cos(),
            b * x.sin() + a * z.cos(),
            c * y.sin() + b * x.cos(),
        ]
    });
    let omega = &u * s;

    Snapshot::new(Some(omega), Some(u))?.with_domain_length(length)
}

fn check_positive(v: f64, name: &str) -> Result<()> {
    if !(v > 0. && v.is_finite()) {
        bail!(ErrorKind::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, v
        )));
    }

    Ok(())
}

/// Shortest periodic offset `a - b` on a box of side `length`.
fn periodic_offset(a: f64, b: f64, length: f64) -> f64 {
    let d = (a - b) % length;
    if d >= length / 2. {
        d - length
    } else if d < -length / 2. {
        d + length
    } else {
        d
    }
}

/// Azimuthal vorticity of a straight filament along `z` through `(cx, cy)`
/// with Gaussian core profile.
fn filament_at(
    x: f64,
    y: f64,
    center: (f64, f64),
    length: f64,
    core_radius: f64,
    amplitude: f64,
) -> [f64; 3] {
    let dx = periodic_offset(x, center.0, length);
    let dy = periodic_offset(y, center.1, length);
    let r = (dx * dx + dy * dy).sqrt();

    if r < AXIS_RADIUS {
        return [0.; 3];
    }

    let w = amplitude * (-(r / core_radius).powi(2)).exp();
    [-dy / r * w, dx / r * w, 0.]
}

/// Burgers vortex tube along `z` through the domain centre,
/// `omega_z = gamma / (pi a^2) exp(-r^2 / a^2)`. The vorticity has no zeros.
pub fn burgers_vortex(n: usize, length: f64, gamma: f64, core_radius: f64) -> Result<Snapshot> {
    check_positive(core_radius, "core radius")?;
    let grid = Grid::new(n, length)?;
    let c = length / 2.;
    let peak = gamma / (PI * core_radius * core_radius);

    let omega = grid.sample_vector(|x, y, _| {
        let dx = periodic_offset(x, c, length);
        let dy = periodic_offset(y, c, length);
        let r2 = dx * dx + dy * dy;
        [0., 0., peak * (-r2 / (core_radius * core_radius)).exp()]
    });

    Snapshot::from_vorticity(omega)?.with_domain_length(length)
}

/// Single straight filament along `z` through the domain centre, with
/// azimuthal vorticity. Its zero set is a line.
pub fn vortex_filament(
    n: usize,
    length: f64,
    core_radius: f64,
    amplitude: f64,
) -> Result<Snapshot> {
    check_positive(core_radius, "core radius")?;
    let grid = Grid::new(n, length)?;
    let c = (length / 2., length / 2.);

    let omega = grid.sample_vector(|x, y, _| filament_at(x, y, c, length, core_radius, amplitude));

    Snapshot::from_vorticity(omega)?.with_domain_length(length)
}

/// Planar shear layer, `omega_x = A tanh((z - L/2) / thickness)`. Its zero set
/// is a plane.
pub fn vortex_sheet(n: usize, length: f64, thickness: f64, amplitude: f64) -> Result<Snapshot> {
    check_positive(thickness, "sheet thickness")?;
    let grid = Grid::new(n, length)?;
    let c = length / 2.;

    let omega = grid.sample_vector(|_, _, z| [amplitude * ((z - c) / thickness).tanh(), 0., 0.]);

    Snapshot::from_vorticity(omega)?.with_domain_length(length)
}

/// Superposition of `num_filaments` parallel filaments at random positions.
pub fn vortex_tangle(
    n: usize,
    length: f64,
    num_filaments: usize,
    core_radius: f64,
    amplitude: f64,
    seed: u64,
) -> Result<Snapshot> {
    check_positive(core_radius, "core radius")?;
    let grid = Grid::new(n, length)?;

    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let position = Uniform::new(0., length);
    let centers: Vec<(f64, f64)> = (0..num_filaments)
        .map(|_| (rng.sample(position), rng.sample(position)))
        .collect();

    let omega = grid.sample_vector(|x, y, _| {
        let mut w = [0.; 3];
        for &c in &centers {
            let f = filament_at(x, y, c, length, core_radius, amplitude);
            for (w, f) in w.iter_mut().zip(&f) {
                *w += f;
            }
        }
        w
    });

    Snapshot::from_vorticity(omega)?.with_domain_length(length)
}
