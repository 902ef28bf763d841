//! Description of the periodic cubic grid and of coordinate meshes on it.

pub mod fft_helper;

use crate::errors::*;
use ndarray::{Array, Axis, Ix1, Ix3, Ix4};
use serde::{Deserialize, Serialize};

/// Cubic periodic grid with `n` sample points per axis on a box of side
/// length `length`. The first sample sits on the box border, `x_i = i L / n`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Grid {
    pub n: usize,
    pub length: f64,
}

impl Grid {
    pub fn new(n: usize, length: f64) -> Result<Grid> {
        if n == 0 {
            bail!(ErrorKind::MalformedField(
                "grid needs at least one point per axis".to_string()
            ));
        }

        if !(length > 0. && length.is_finite()) {
            bail!(ErrorKind::InvalidConfig(format!(
                "domain length must be positive and finite, got {}",
                length
            )));
        }

        Ok(Grid { n, length })
    }

    /// Width of a grid cell.
    pub fn width(&self) -> f64 {
        self.length / self.n as f64
    }

    /// Volume element `ΔV = (L/n)^3`.
    pub fn cell_volume(&self) -> f64 {
        self.width().powi(3)
    }

    pub fn number_of_points(&self) -> usize {
        self.n * self.n * self.n
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        (self.n, self.n, self.n)
    }

    /// Sample coordinates along one axis.
    pub fn coordinates(&self) -> Array<f64, Ix1> {
        let w = self.width();
        Array::from_shape_fn(self.n, |i| i as f64 * w)
    }

    /// Evaluates `f(x, y, z)` at every sample point.
    pub fn sample<F>(&self, f: F) -> Array<f64, Ix3>
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let x = self.coordinates();
        Array::from_shape_fn(self.dim(), |(i, j, k)| f(x[i], x[j], x[k]))
    }

    /// Evaluates a vector valued `f(x, y, z)` at every sample point. The first
    /// axis of the result holds the components.
    pub fn sample_vector<F>(&self, f: F) -> Array<f64, Ix4>
    where
        F: Fn(f64, f64, f64) -> [f64; 3],
    {
        let x = self.coordinates();
        let mut res = Array::zeros((3, self.n, self.n, self.n));

        for ((i, j, k), v) in Array::from_shape_fn(self.dim(), |(i, j, k)| f(x[i], x[j], x[k]))
            .indexed_iter()
        {
            for c in 0..3 {
                res[[c, i, j, k]] = v[c];
            }
        }

        res
    }
}

/// Builds a 3D meshgrid from one sampling per axis.
///
/// The first axis denotes the component: `res[c, i, j, m] -> k_c[i, j, m]`,
/// where component `c` only varies along spatial axis `c`.
pub fn mesh3d<T: Clone + Default>(k: &[Array<T, Ix1>]) -> Array<T, Ix4> {
    let sh_x = k[0].len();
    let sh_y = k[1].len();
    let sh_z = k[2].len();

    let mut res = Array::from_elem([3, sh_x, sh_y, sh_z], T::default());

    for (c, kc) in k.iter().enumerate().take(3) {
        for (v, mut plane) in kc
            .iter()
            .zip(res.index_axis_mut(Axis(0), c).axis_iter_mut(Axis(c)))
        {
            plane.fill(v.clone());
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TWOPI;
    use crate::test_helper::equal_floats;

    #[test]
    fn test_grid_measures() {
        let g = Grid::new(4, 2.).unwrap();

        assert!(equal_floats(g.width(), 0.5));
        assert!(equal_floats(g.cell_volume(), 0.125));
        assert_eq!(g.number_of_points(), 64);
        assert_eq!(g.coordinates().to_vec(), vec![0., 0.5, 1., 1.5]);
    }

    #[test]
    fn test_grid_rejects_degenerate_input() {
        assert!(Grid::new(0, TWOPI).is_err());
        assert!(Grid::new(8, 0.).is_err());
        assert!(Grid::new(8, -1.).is_err());
        assert!(Grid::new(8, ::std::f64::NAN).is_err());
    }

    #[test]
    fn test_sample_orders_axes() {
        let g = Grid::new(3, 3.).unwrap();
        let f = g.sample(|x, y, z| 100. * x + 10. * y + z);

        assert_eq!(f[[1, 2, 0]], 120.);
        assert_eq!(f[[0, 1, 2]], 12.);

        let v = g.sample_vector(|x, y, z| [x, y, z]);
        assert_eq!(v[[0, 2, 1, 0]], 2.);
        assert_eq!(v[[1, 2, 1, 0]], 1.);
        assert_eq!(v[[2, 2, 1, 0]], 0.);
    }

    #[test]
    fn test_mesh3d() {
        let k = vec![
            Array::from_vec(vec![1, 2]),
            Array::from_vec(vec![3, 4, 5]),
            Array::from_vec(vec![6]),
        ];

        let m = mesh3d(&k);

        assert_eq!(m.shape(), &[3, 2, 3, 1]);
        assert_eq!(m[[0, 1, 2, 0]], 2);
        assert_eq!(m[[1, 1, 2, 0]], 5);
        assert_eq!(m[[2, 1, 2, 0]], 6);
    }
}
