//! Spectral differential operators on a periodic cubic grid.
//!
//! Derivatives are exact up to floating point precision for band-limited
//! fields: a field is transformed to Fourier space, every mode is multiplied
//! by `i k_j` with the angular wave number `k_j = 2 pi m_j / L`, and the
//! real part of the backward transform is returned.


pub mod fft;
pub mod tensor;

use self::fft::FFT3D;
use crate::errors::*;
use crate::mesh::fft_helper::{get_inverse_norm_squared, get_k_mesh, get_k_sampling};
use crate::mesh::Grid;
use ndarray::{s, Array, ArrayView, Axis, Ix1, Ix3, Ix4, Ix5, Zip};
use num_complex::Complex;
use rayon::prelude::*;

pub type ScalarField3D = Array<f64, Ix3>;
pub type VectorField3D = Array<f64, Ix4>;
/// Rank-2 tensor field. Entry `t[[i, j, x, y, z]]` is the derivative of
/// component `i` along spatial axis `j`.
pub type TensorField3D = Array<f64, Ix5>;

type Spectrum = Array<Complex<f64>, Ix3>;

/// Index pairs `(a, b)` of the cross product, `(k x w)_c = k_a w_b - k_b w_a`.
const CROSS: [(usize, usize); 3] = [(1, 2), (2, 0), (0, 1)];

/// Differential operators for one grid. Holds the FFT plans and the wave
/// number sampling, so it can be reused for every derivative of a run.
pub struct SpectralDerivative {
    grid: Grid,
    fft: FFT3D,
    k: Array<f64, Ix1>,
}

impl SpectralDerivative {
    pub fn new(grid: Grid) -> SpectralDerivative {
        SpectralDerivative {
            grid,
            fft: FFT3D::new(grid.n),
            k: get_k_sampling(grid),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Fails, if `f` is not sampled on this operator's grid.
    pub fn check_scalar(&self, f: &ArrayView<f64, Ix3>) -> Result<()> {
        let n = self.grid.n;
        if f.shape() != [n, n, n] {
            bail!(ErrorKind::MalformedField(format!(
                "expected a {n}x{n}x{n} scalar field, got shape {:?}",
                f.shape(),
                n = n
            )));
        }

        Ok(())
    }

    /// Fails, if `v` has not exactly 3 components sampled on this operator's
    /// grid.
    pub fn check_vector(&self, v: &ArrayView<f64, Ix4>) -> Result<()> {
        let n = self.grid.n;
        if v.shape()[0] != 3 {
            bail!(ErrorKind::MalformedField(format!(
                "expected 3 vector components, got {}",
                v.shape()[0]
            )));
        }

        if v.shape()[1..] != [n, n, n] {
            bail!(ErrorKind::MalformedField(format!(
                "expected a {n}x{n}x{n} grid, got shape {:?}",
                &v.shape()[1..],
                n = n
            )));
        }

        Ok(())
    }

    fn spectrum(&self, f: ArrayView<f64, Ix3>) -> Spectrum {
        let mut s = f.map(|v| Complex::new(*v, 0.));
        self.fft.forward(&mut s);
        s
    }

    fn spectra(&self, v: &ArrayView<f64, Ix4>) -> Vec<Spectrum> {
        (0..3)
            .into_par_iter()
            .map(|c| self.spectrum(v.index_axis(Axis(0), c)))
            .collect()
    }

    fn real_space(&self, mut s: Spectrum) -> ScalarField3D {
        self.fft.backward(&mut s);
        s.map(|v| v.re)
    }

    /// Derivative along `axis` of the field with Fourier coefficients
    /// `spectrum`.
    fn derivative(&self, spectrum: &Spectrum, axis: usize) -> ScalarField3D {
        let k = &self.k;
        let mut d = spectrum.clone();

        Zip::indexed(&mut d).for_each(|(ix, iy, iz), v| {
            let kj = match axis {
                0 => k[ix],
                1 => k[iy],
                _ => k[iz],
            };
            *v *= Complex::new(0., kj);
        });

        self.real_space(d)
    }

    /// Spectral gradient of a scalar field, `res[j] = d f / d x_j`.
    pub fn gradient_scalar(&self, f: ArrayView<f64, Ix3>) -> Result<VectorField3D> {
        self.check_scalar(&f)?;

        let s = self.spectrum(f);
        let parts: Vec<ScalarField3D> = (0..3)
            .into_par_iter()
            .map(|j| self.derivative(&s, j))
            .collect();

        let n = self.grid.n;
        let mut res = Array::zeros((3, n, n, n));
        for (j, p) in parts.iter().enumerate() {
            res.index_axis_mut(Axis(0), j).assign(p);
        }

        Ok(res)
    }

    /// Spectral gradient of a vector field, `res[[i, j]] = d v_i / d x_j`.
    pub fn gradient_vector(&self, v: ArrayView<f64, Ix4>) -> Result<TensorField3D> {
        self.check_vector(&v)?;

        let spectra = self.spectra(&v);
        let parts: Vec<ScalarField3D> = (0..9)
            .into_par_iter()
            .map(|ij| self.derivative(&spectra[ij / 3], ij % 3))
            .collect();

        let n = self.grid.n;
        let mut res = Array::zeros((3, 3, n, n, n));
        for (ij, p) in parts.iter().enumerate() {
            res.slice_mut(s![ij / 3, ij % 3, .., .., ..]).assign(p);
        }

        Ok(res)
    }

    /// Curl of a velocity field `u`, i.e. the vorticity.
    ///
    /// `ω = (d_y u_z - d_z u_y, d_z u_x - d_x u_z, d_x u_y - d_y u_x)`
    pub fn curl(&self, u: ArrayView<f64, Ix4>) -> Result<VectorField3D> {
        let g = self.gradient_vector(u)?;

        let n = self.grid.n;
        let mut omega = Array::zeros((3, n, n, n));
        for (c, &(a, b)) in CROSS.iter().enumerate() {
            // d_a u_b - d_b u_a
            let mut o = omega.index_axis_mut(Axis(0), c);
            o.assign(&g.slice(s![b, a, .., .., ..]));
            o -= &g.slice(s![a, b, .., .., ..]);
        }

        Ok(omega)
    }

    /// Strain tensor, the symmetric part of the velocity gradient,
    /// `S = (∇u + ∇u^T) / 2`.
    pub fn strain(&self, u: ArrayView<f64, Ix4>) -> Result<TensorField3D> {
        let g = self.gradient_vector(u)?;

        let mut s = g.clone();
        s += &g.view().permuted_axes([1, 0, 2, 3, 4]);
        s *= 0.5;

        Ok(s)
    }

    /// Pointwise squared Frobenius norm of the gradient,
    /// `sum_{i,j} (d v_i / d x_j)^2`.
    pub fn grad_norm_squared(&self, v: ArrayView<f64, Ix4>) -> Result<ScalarField3D> {
        let g = self.gradient_vector(v)?;
        Ok(tensor::frobenius_norm_squared(g.view()))
    }

    /// Divergence of a vector field, `sum_j d v_j / d x_j`.
    pub fn divergence(&self, v: ArrayView<f64, Ix4>) -> Result<ScalarField3D> {
        self.check_vector(&v)?;

        let spectra = self.spectra(&v);
        let parts: Vec<ScalarField3D> = (0..3)
            .into_par_iter()
            .map(|j| self.derivative(&spectra[j], j))
            .collect();

        let mut res = parts[0].clone();
        res += &parts[1];
        res += &parts[2];

        Ok(res)
    }

    /// Reconstructs the divergence free, zero mean velocity field whose curl is
    /// `omega` (Biot-Savart law in Fourier space),
    /// `u_k = i k x omega_k / |k|^2`.
    ///
    /// The result is only meaningful if `omega` itself is divergence free.
    pub fn velocity_from_vorticity(&self, omega: ArrayView<f64, Ix4>) -> Result<VectorField3D> {
        self.check_vector(&omega)?;

        let w = self.spectra(&omega);
        let k = get_k_mesh(self.grid);
        let inorm = get_inverse_norm_squared(k.view());

        let n = self.grid.n;
        let mut u = Array::zeros((3, n, n, n));

        let parts: Vec<ScalarField3D> = (0..3)
            .into_par_iter()
            .map(|c| {
                let (a, b) = CROSS[c];
                let mut uk = Array::from_elem((n, n, n), Complex::new(0., 0.));
                Zip::from(&mut uk)
                    .and(k.index_axis(Axis(0), a))
                    .and(k.index_axis(Axis(0), b))
                    .and(&w[a])
                    .and(&w[b])
                    .and(&inorm)
                    .for_each(|v, &ka, &kb, &wa, &wb, &i| {
                        *v = (wb * ka - wa * kb) * Complex::new(0., i);
                    });
                self.real_space(uk)
            })
            .collect();

        for (c, p) in parts.iter().enumerate() {
            u.index_axis_mut(Axis(0), c).assign(p);
        }

        Ok(u)
    }
}

/// Infers the cubic grid a vector field is sampled on.
fn grid_of_vector(v: &ArrayView<f64, Ix4>, length: f64) -> Result<Grid> {
    let sh = v.shape();
    if sh[1] != sh[2] || sh[2] != sh[3] {
        bail!(ErrorKind::MalformedField(format!(
            "grid must be cubic, got shape {:?}",
            &sh[1..]
        )));
    }

    Grid::new(sh[1], length)
}

/// Spectral gradient of a scalar field `f` on a periodic box of side `length`.
pub fn gradient_scalar(f: ArrayView<f64, Ix3>, length: f64) -> Result<VectorField3D> {
    let (a, b, c) = f.dim();
    if a != b || b != c {
        bail!(ErrorKind::MalformedField(format!(
            "grid must be cubic, got shape {:?}",
            f.shape()
        )));
    }

    SpectralDerivative::new(Grid::new(a, length)?).gradient_scalar(f)
}

/// Spectral gradient of a vector field, `res[[i, j]] = d v_i / d x_j`.
pub fn gradient_vector(v: ArrayView<f64, Ix4>, length: f64) -> Result<TensorField3D> {
    SpectralDerivative::new(grid_of_vector(&v, length)?).gradient_vector(v)
}

/// Curl of a velocity field on a periodic box of side `length`.
pub fn curl(u: ArrayView<f64, Ix4>, length: f64) -> Result<VectorField3D> {
    SpectralDerivative::new(grid_of_vector(&u, length)?).curl(u)
}

/// Strain tensor of a velocity field on a periodic box of side `length`.
pub fn strain(u: ArrayView<f64, Ix4>, length: f64) -> Result<TensorField3D> {
    SpectralDerivative::new(grid_of_vector(&u, length)?).strain(u)
}

/// `sum_{i,j} (d v_i / d x_j)^2` on a periodic box of side `length`.
pub fn grad_norm_squared(v: ArrayView<f64, Ix4>, length: f64) -> Result<ScalarField3D> {
    SpectralDerivative::new(grid_of_vector(&v, length)?).grad_norm_squared(v)
}
