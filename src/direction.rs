//! Regularized unit direction of a vector field and the energy of its spatial
//! variation.

// Move unit test into own file
#[cfg(test)]
#[path = "./direction_test.rs"]
mod direction_test;

use crate::errors::*;
use crate::spectral::{ScalarField3D, SpectralDerivative, VectorField3D};
use ndarray::{Array, ArrayView, Axis, Ix3, Ix4, Zip};

/// Pointwise `|v|^2` of a vector field, summed over components in order.
pub fn magnitude_squared(v: ArrayView<f64, Ix4>) -> ScalarField3D {
    let sh = v.shape();
    let mut res = Array::zeros((sh[1], sh[2], sh[3]));

    for c in v.outer_iter() {
        Zip::from(&mut res).and(&c).for_each(|r, &c| *r += c * c);
    }

    res
}

/// Pointwise `|v|`.
pub fn magnitude(v: ArrayView<f64, Ix4>) -> ScalarField3D {
    let mut res = magnitude_squared(v);
    res.par_mapv_inplace(f64::sqrt);
    res
}

/// Returns `(xi, r)` with `r = sqrt(|v|^2 + eps^2)` and `xi = v / r`.
///
/// `eps` must be strictly positive, which keeps `r > 0` on the zero set of `v`.
pub fn regularized_direction(
    v: ArrayView<f64, Ix4>,
    eps: f64,
) -> Result<(VectorField3D, ScalarField3D)> {
    if !(eps > 0.) {
        bail!(ErrorKind::InvalidConfig(format!(
            "regularization scale must be positive, got {}",
            eps
        )));
    }

    let mut r = magnitude_squared(v);
    let eps2 = eps * eps;
    r.par_mapv_inplace(|m2| (m2 + eps2).sqrt());

    let mut xi = v.to_owned();
    for mut c in xi.axis_iter_mut(Axis(0)) {
        Zip::from(&mut c).and(&r).par_for_each(|x, &r| *x /= r);
    }

    Ok((xi, r))
}

/// Saturated energy `Psi = G / (1 + G)`, which lies in `[0, 1)` for `G >= 0`.
pub fn saturate(g: ArrayView<f64, Ix3>) -> ScalarField3D {
    g.mapv(|g| g / (1. + g))
}

/// Regularized direction field of a vorticity field at scale `epsilon`,
/// together with its gradient energy `G = sum_{i,j} (d xi_i / d x_j)^2` and
/// the saturated energy `Psi`.
pub struct DirectionField {
    pub epsilon: f64,
    pub xi: VectorField3D,
    pub r: ScalarField3D,
    pub grad_energy: ScalarField3D,
    pub saturated: ScalarField3D,
}

impl DirectionField {
    pub fn new(
        ops: &SpectralDerivative,
        omega: ArrayView<f64, Ix4>,
        epsilon: f64,
    ) -> Result<DirectionField> {
        ops.check_vector(&omega)?;

        let (xi, r) = regularized_direction(omega, epsilon)?;
        let grad_energy = ops.grad_norm_squared(xi.view())?;
        let saturated = saturate(grad_energy.view());

        Ok(DirectionField {
            epsilon,
            xi,
            r,
            grad_energy,
            saturated,
        })
    }

    /// Spatial mean of `Psi`.
    pub fn mean_saturated(&self) -> f64 {
        mean(&self.saturated)
    }

    /// Spatial mean of `G`.
    pub fn mean_grad_energy(&self) -> f64 {
        mean(&self.grad_energy)
    }
}

/// Sequential mean, so repeated runs give bitwise identical results.
pub(crate) fn mean(f: &ScalarField3D) -> f64 {
    if f.is_empty() {
        return 0.;
    }

    f.iter().sum::<f64>() / f.len() as f64
}
