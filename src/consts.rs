use std::f64::consts::PI;

pub const TWOPI: f64 = 2. * PI;

/// Side length of the periodic box, if a snapshot does not carry one.
pub const DEFAULT_DOMAIN_LENGTH: f64 = TWOPI;
/// Kinematic viscosity, if a snapshot does not carry one.
pub const DEFAULT_VISCOSITY: f64 = 1.0;
/// Simulation time, if a snapshot does not carry one.
pub const DEFAULT_TIME: f64 = 0.0;
