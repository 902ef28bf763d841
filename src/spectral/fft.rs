//! Three dimensional complex-to-complex FFT on cubic arrays, assembled from
//! one dimensional transforms along every axis.

use ndarray::{Array, Axis, Ix3};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Holds forward and backward plans for `n x n x n` arrays.
///
/// WARNING: The forward transform is unnormalized. The backward transform
/// divides by `n^3`, so a forward followed by a backward transformation is an
/// identity operation.
pub struct FFT3D {
    n: usize,
    plan_forward: Arc<dyn Fft<f64>>,
    plan_backward: Arc<dyn Fft<f64>>,
}

impl FFT3D {
    pub fn new(n: usize) -> FFT3D {
        let mut planner = FftPlanner::new();

        FFT3D {
            n,
            plan_forward: planner.plan_fft_forward(n),
            plan_backward: planner.plan_fft_inverse(n),
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn forward(&self, data: &mut Array<Complex<f64>, Ix3>) {
        execute(self.n, &self.plan_forward, data);
    }

    pub fn backward(&self, data: &mut Array<Complex<f64>, Ix3>) {
        execute(self.n, &self.plan_backward, data);

        let norm = 1. / (self.n * self.n * self.n) as f64;
        data.mapv_inplace(|v| v * norm);
    }
}

/// Applies the 1D `plan` to every lane along every axis. Lanes are copied into
/// a contiguous buffer, so the memory layout of `data` does not matter.
fn execute(n: usize, plan: &Arc<dyn Fft<f64>>, data: &mut Array<Complex<f64>, Ix3>) {
    debug_assert_eq!(data.dim(), (n, n, n));

    let zero = Complex::new(0., 0.);
    let mut buffer = vec![zero; n];
    let mut scratch = vec![zero; plan.get_inplace_scratch_len()];

    for axis in 0..3 {
        for mut lane in data.lanes_mut(Axis(axis)) {
            for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                *b = *v;
            }

            plan.process_with_scratch(&mut buffer, &mut scratch);

            for (v, b) in lane.iter_mut().zip(buffer.iter()) {
                *v = *b;
            }
        }
    }
}
