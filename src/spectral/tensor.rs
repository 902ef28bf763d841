//! Pointwise reductions of rank-2 tensor fields.

use super::ScalarField3D;
use crate::errors::*;
use nalgebra::Matrix3;
use ndarray::{s, Array, ArrayView, Ix5, Zip};

fn check_tensor(t: &ArrayView<f64, Ix5>) -> Result<usize> {
    let sh = t.shape();
    if sh[0] != 3 || sh[1] != 3 {
        bail!(ErrorKind::MalformedField(format!(
            "expected a 3x3 tensor field, got {}x{} components",
            sh[0], sh[1]
        )));
    }

    if sh[2] != sh[3] || sh[3] != sh[4] {
        bail!(ErrorKind::MalformedField(format!(
            "grid must be cubic, got shape {:?}",
            &sh[2..]
        )));
    }

    Ok(sh[2])
}

/// Operator norm of a symmetric 3x3 matrix, its largest absolute eigenvalue.
///
/// Only the lower triangle of `m` is read. Symmetry is a precondition and is
/// not checked.
pub fn symmetric_operator_norm(m: &Matrix3<f64>) -> f64 {
    m.symmetric_eigenvalues()
        .iter()
        .fold(0., |acc: f64, l| acc.max(l.abs()))
}

/// Operator norm of a symmetric tensor field at every grid point.
pub fn symmetric_operator_norm_field(s: ArrayView<f64, Ix5>) -> Result<ScalarField3D> {
    let n = check_tensor(&s)?;

    let mut res = Array::zeros((n, n, n));
    Zip::indexed(&mut res).par_for_each(|(x, y, z), o| {
        let m = Matrix3::from_fn(|i, j| s[[i, j, x, y, z]]);
        *o = symmetric_operator_norm(&m);
    });

    Ok(res)
}

/// Squared Frobenius norm at every grid point, `sum_{i,j} t_ij^2`, summed in
/// fixed index order.
pub fn frobenius_norm_squared(t: ArrayView<f64, Ix5>) -> ScalarField3D {
    let sh = t.shape();
    let mut res = Array::zeros((sh[2], sh[3], sh[4]));

    for i in 0..sh[0] {
        for j in 0..sh[1] {
            Zip::from(&mut res)
                .and(t.slice(s![i, j, .., .., ..]))
                .for_each(|r, &v| *r += v * v);
        }
    }

    res
}
