// Move unit test into own file
#[cfg(test)]
#[path = "./fft_helper_test.rs"]
mod fft_helper_test;

use super::{mesh3d, Grid};
use crate::consts::TWOPI;
use ndarray::{s, Array, ArrayView, Axis, Ix1, Ix3, Ix4};

/// Returns the angular wave numbers along one grid axis in FFT standard order.
///
/// For a grid size of `n`, the 0th-mode is at index `0`. For even n the index
/// `n/2` represents both the largest positive and negative frequency and is
/// assigned the negative one. For odd `n` index `(n-1)/2` is the largest
/// positive frequency and `(n+1)/2` the largest negative frequency.
///
/// Example:
///     n = 10 => k = [0, 1, 2, 3, 4, -5, -4, -3, -2, -1] * 2 pi / L
///     n = 11 => k = [0, 1, 2, 3, 4, 5, -5, -4, -3, -2, -1] * 2 pi / L
///
pub fn get_k_sampling(grid: Grid) -> Array<f64, Ix1> {
    let n = grid.n;
    let a = n / 2;
    let b = if n % 2 == 0 { n / 2 } else { n / 2 + 1 };
    let step = TWOPI / grid.length;

    let values: Array<f64, Ix1> = (-(a as i64)..(b as i64))
        .map(|i| (i as f64) * step)
        .collect();

    let mut k = Array::zeros(n);

    k.slice_mut(s![..b]).assign(&values.slice(s![a..]));
    k.slice_mut(s![b..]).assign(&values.slice(s![..a]));

    k
}

/// Returns a meshgrid of k values for FFT.
///
/// The first axis denotes the components of the k-vector:
///     `res[c, i, j, m] -> k_c[i, j, m]`
pub fn get_k_mesh(grid: Grid) -> Array<f64, Ix4> {
    let k = get_k_sampling(grid);
    mesh3d::<f64>(&[k.clone(), k.clone(), k])
}

/// Returns scalar field of inversed norm squared of k-vector-values.
///
/// The inverse norm of k=0 is set to zero, i.e. 1/(k=0)^2 == 0
pub fn get_inverse_norm_squared(k_mesh: ArrayView<f64, Ix4>) -> Array<f64, Ix3> {
    let squared = &k_mesh * &k_mesh;

    let mut inorm = squared.sum_axis(Axis(0)).map(|v| 1. / v);
    inorm[[0, 0, 0]] = 0.;

    inorm
}
