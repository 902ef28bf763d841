use super::*;
use crate::consts::TWOPI;
use crate::mesh::Grid;
use crate::test_helper::{close_floats, equal_floats};

#[test]
fn test_magnitude() {
    let grid = Grid::new(4, TWOPI).unwrap();
    let v = grid.sample_vector(|x, _, _| [3. * x, 0., -4. * x]);

    let m = magnitude(v.view());
    let x = grid.coordinates();
    for i in 0..4 {
        assert!(equal_floats(m[[i, 1, 2]], 5. * x[i]), "{} != {}", m[[i, 1, 2]], 5. * x[i]);
    }
}

#[test]
fn test_direction_of_zero_field() {
    let v = Array::<f64, _>::zeros((3, 4, 4, 4));
    let (xi, r) = regularized_direction(v.view(), 0.5).unwrap();

    assert!(xi.iter().all(|&x| x == 0.));
    assert!(r.iter().all(|&r| r == 0.5));
}

#[test]
fn test_direction_is_shorter_than_one() {
    let grid = Grid::new(6, TWOPI).unwrap();
    let v = grid.sample_vector(|x, y, z| [x.sin(), y.cos(), (x + z).sin()]);

    let (xi, r) = regularized_direction(v.view(), 1e-3).unwrap();
    let m = magnitude(xi.view());

    assert!(m.iter().all(|&m| m < 1.));
    assert!(r.iter().all(|&r| r >= 1e-3));
}

#[test]
fn test_direction_rejects_non_positive_epsilon() {
    let v = Array::<f64, _>::zeros((3, 2, 2, 2));
    assert!(regularized_direction(v.view(), 0.).is_err());
    assert!(regularized_direction(v.view(), -1.).is_err());
    assert!(regularized_direction(v.view(), ::std::f64::NAN).is_err());
}

#[test]
fn test_saturate() {
    let g = Array::from_shape_vec((1, 1, 4), vec![0., 1., 3., 1e12]).unwrap();
    let psi = saturate(g.view());

    assert_eq!(psi[[0, 0, 0]], 0.);
    assert!(equal_floats(psi[[0, 0, 1]], 0.5));
    assert!(equal_floats(psi[[0, 0, 2]], 0.75));
    assert!(psi[[0, 0, 3]] < 1.);
}

#[test]
fn test_uniform_field_has_no_direction_energy() {
    let grid = Grid::new(8, TWOPI).unwrap();
    let ops = SpectralDerivative::new(grid);
    let omega = grid.sample_vector(|_, _, _| [1., -2., 0.5]);

    let d = DirectionField::new(&ops, omega.view(), 1e-3).unwrap();

    assert!(close_floats(d.mean_grad_energy(), 0., 1e-20));
    assert!(close_floats(d.mean_saturated(), 0., 1e-20));
}

#[test]
fn test_direction_energy_is_bounded_after_saturation() {
    let grid = Grid::new(8, TWOPI).unwrap();
    let ops = SpectralDerivative::new(grid);
    let omega = grid.sample_vector(|x, y, z| [x.sin(), y.sin(), z.sin()]);

    let d = DirectionField::new(&ops, omega.view(), 1e-2).unwrap();

    assert!(d.grad_energy.iter().all(|&g| g >= 0.));
    assert!(d.saturated.iter().all(|&p| p >= 0. && p < 1.));
    assert!(d.mean_grad_energy() > 0.);
    assert_eq!(d.epsilon, 1e-2);
}

#[test]
fn test_direction_field_rejects_wrong_grid() {
    let ops = SpectralDerivative::new(Grid::new(4, TWOPI).unwrap());
    let omega = Array::<f64, _>::zeros((3, 6, 6, 6));

    assert!(DirectionField::new(&ops, omega.view(), 1.).is_err());
}
