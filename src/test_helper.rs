use std::f64::{EPSILON, MAX};

pub fn equal_floats(a: f64, b: f64) -> bool {
    if a == 0. && b == 0. {
        return true;
    }

    let diff = (a - b).abs();

    if a == 0. || b == 0. {
        return diff < EPSILON;
    }

    diff / (a.abs() + b.abs()).min(MAX) < EPSILON
}

/// Absolute comparison for quantities that went through a forward and a
/// backward FFT, where round-off scales with the grid size.
pub fn close_floats(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
