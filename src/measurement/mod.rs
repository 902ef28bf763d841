//! Sublevel set measurement of a single snapshot.
//!
//! For every threshold `delta` the measure `m(delta)` of `{|omega| < delta}`
//! and the gradient and strain integrals over that set are collected. The
//! Fisher like functional `J(eps)` is evaluated over the whole domain for every
//! `eps` of the schedule, and the direction field diagnostic once at `eps0`.
//! Thresholds and scales are given relative to the RMS vorticity magnitude.


mod config;
mod record;

pub use self::config::{
    logspace, MeasureConfig, DEFAULT_DELTA_EXPONENTS, DEFAULT_EPS0_REL, DEFAULT_EPS_EXPONENTS,
    DEFAULT_M_THRESHOLD,
};
pub use self::record::{
    DirectionDiagnostic, FisherSchedule, Meta, MeasurementRecord, SublevelCurves,
};

use crate::direction::{magnitude_squared, mean, DirectionField};
use crate::errors::*;
use crate::snapshot::Snapshot;
use crate::spectral::tensor::symmetric_operator_norm_field;
use crate::spectral::{ScalarField3D, SpectralDerivative};
use log::{debug, info, warn};
use ndarray::Zip;
use rayon::prelude::*;
use std::borrow::Cow;

const NOTE_MISSING_VELOCITY: &str = "u not provided: strain residue R(delta) over \
     {|omega| < delta} cannot be computed. Provide the velocity dataset `u` for the full \
     measurement.";
const NOTE_RECONSTRUCTED_VELOCITY: &str = "u not provided: strain residue R(delta) uses the \
     divergence free velocity reconstructed from omega.";

/// Integrals over one sublevel set.
struct SublevelIntegrals {
    count: usize,
    grad_load_l1: f64,
    grad_load_l2: f64,
    strain_residue: Option<f64>,
}

/// Sums over `{|omega| < delta}` in fixed index order.
fn sublevel_integrals(
    delta: f64,
    om: &ScalarField3D,
    grad_load: &ScalarField3D,
    strain_norm: Option<&ScalarField3D>,
    dv: f64,
) -> SublevelIntegrals {
    let mut count = 0;
    let mut q1 = 0.;
    let mut q2 = 0.;

    Zip::from(om).and(grad_load).for_each(|&o, &g| {
        if o < delta {
            count += 1;
            q1 += g.sqrt();
            q2 += g;
        }
    });

    let strain_residue = strain_norm.map(|s| {
        let mut r = 0.;
        Zip::from(om).and(s).for_each(|&o, &s| {
            if o < delta {
                r += s;
            }
        });
        r * dv
    });

    SublevelIntegrals {
        count,
        grad_load_l1: q1 * dv,
        grad_load_l2: q2 * dv,
        strain_residue,
    }
}

/// `J(eps) = sum grad_load / (|omega|^2 + eps^2) dV` over the whole domain.
fn fisher_integral(eps: f64, om2: &ScalarField3D, grad_load: &ScalarField3D, dv: f64) -> f64 {
    let eps2 = eps * eps;
    let mut j = 0.;

    Zip::from(om2)
        .and(grad_load)
        .for_each(|&o2, &g| j += g / (o2 + eps2));

    j * dv
}

/// Runs the full measurement of `snapshot`.
///
/// Fails only on malformed snapshots or if the snapshot's grid size differs
/// from the configured one. A missing velocity degrades the strain residue to
/// `None` and adds a note. If the domain lengths differ, the snapshot's is
/// used.
pub fn compute_all(snapshot: &Snapshot, config: &MeasureConfig) -> Result<MeasurementRecord> {
    let grid = snapshot.grid()?;

    if grid.n != config.grid_size() {
        bail!(ErrorKind::MalformedField(format!(
            "snapshot has {} grid points per axis, configuration expects {}",
            grid.n,
            config.grid_size()
        )));
    }

    if (grid.length - config.domain_length()).abs() > 1e-12 * grid.length {
        warn!(
            "Domain length of snapshot ({}) differs from configuration ({}). Using the \
             snapshot's.",
            grid.length,
            config.domain_length()
        );
    }

    info!("Measuring snapshot on {}^3 grid, L = {}.", grid.n, grid.length);

    let ops = SpectralDerivative::new(grid);
    let omega = snapshot.vorticity(&ops)?;

    let om2 = magnitude_squared(omega.view());
    let om = om2.mapv(f64::sqrt);
    let omega_rms = mean(&om2).sqrt();
    let scale = if omega_rms > 0. { omega_rms } else { 1. };
    info!("RMS vorticity magnitude {:e}.", omega_rms);

    let mut notes = Vec::new();

    let velocity = match snapshot.velocity() {
        Some(u) => Some(Cow::Borrowed(u)),
        None if config.reconstruct_velocity() => {
            info!("Reconstructing velocity from vorticity.");
            notes.push(NOTE_RECONSTRUCTED_VELOCITY.to_string());
            Some(Cow::Owned(ops.velocity_from_vorticity(omega.view())?))
        }
        None => {
            warn!("No velocity given, skipping strain residue.");
            notes.push(NOTE_MISSING_VELOCITY.to_string());
            None
        }
    };

    let strain_norm = match velocity {
        Some(u) => {
            let s = ops.strain(u.view())?;
            Some(symmetric_operator_norm_field(s.view())?)
        }
        None => None,
    };

    let grad_load = ops.grad_norm_squared(omega.view())?;
    let dv = grid.cell_volume();
    let npoints = grid.number_of_points() as f64;

    // sublevel curves
    let delta_rel = config.deltas().to_vec();
    let delta_abs: Vec<f64> = delta_rel.iter().map(|d| d * scale).collect();

    let integrals: Vec<SublevelIntegrals> = delta_abs
        .par_iter()
        .map(|&d| sublevel_integrals(d, &om, &grad_load, strain_norm.as_ref(), dv))
        .collect();

    for (d, i) in delta_abs.iter().zip(&integrals) {
        debug!(
            "delta = {:e}: m = {:e}, Q1 = {:e}, Q2 = {:e}, R = {:?}",
            d,
            i.count as f64 / npoints,
            i.grad_load_l1,
            i.grad_load_l2,
            i.strain_residue
        );
    }

    let sublevel = SublevelCurves {
        m: integrals.iter().map(|i| i.count as f64 / npoints).collect(),
        grad_load_l1: integrals.iter().map(|i| i.grad_load_l1).collect(),
        grad_load_l2: integrals.iter().map(|i| i.grad_load_l2).collect(),
        strain_residue: integrals.iter().map(|i| i.strain_residue).collect(),
        delta_abs,
        delta_rel,
    };

    // Fisher schedule
    let eps_rel = config.eps_schedule().to_vec();
    let eps_abs: Vec<f64> = eps_rel.iter().map(|e| e * scale).collect();
    let j: Vec<f64> = eps_abs
        .par_iter()
        .map(|&e| fisher_integral(e, &om2, &grad_load, dv))
        .collect();

    for (e, j) in eps_abs.iter().zip(&j) {
        debug!("eps = {:e}: J = {:e}", e, j);
    }

    let fisher = FisherSchedule { eps_abs, eps_rel, j };

    // direction field diagnostic
    let eps0 = config.eps0_rel() * scale;
    let direction = DirectionField::new(&ops, omega.view(), eps0)?;

    let mut saturated_energy = 0.;
    Zip::from(&om2)
        .and(&direction.saturated)
        .for_each(|&o2, &p| saturated_energy += o2 * p);

    let m_threshold = config.m_threshold();
    let above = direction
        .grad_energy
        .iter()
        .filter(|&&g| g > m_threshold)
        .count();

    let nspcm = DirectionDiagnostic {
        eps0_abs: eps0,
        saturated_energy: saturated_energy * dv,
        mean_psi: direction.mean_saturated(),
        mean_g: direction.mean_grad_energy(),
        m_threshold,
        frac_g_above_m: above as f64 / npoints,
    };
    debug!("Direction field diagnostic at eps0 = {:e}: {:?}", eps0, nspcm);

    Ok(MeasurementRecord {
        meta: Meta {
            n: grid.n,
            domain_length: grid.length,
            nu: snapshot.nu,
            t: snapshot.t,
            omega_rms,
        },
        sublevel,
        fisher,
        nspcm,
        notes,
    })
}
