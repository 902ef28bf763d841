//! This crate characterizes the geometry of near-zero-vorticity regions of
//! three-dimensional periodic flow fields.
//!
//! For a single field snapshot it computes spectral derivatives, the measure of
//! the sublevel sets `{|ω| < δ}`, gradient-load and strain-residue integrals on
//! those sets, a regularized Fisher-like functional `J(ε)` and a saturated
//! direction-field energy. The `fit` module turns the resulting `m(δ)` curve
//! into a power-law exponent `α`, which classifies the codimension of the
//! vorticity zero set (sheets `α≈1`, filaments `α≈2`, generic `α≈3`).

#![recursion_limit = "1024"]
#![allow(clippy::many_single_char_names)]

#[macro_use]
extern crate error_chain;
#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod consts;
pub mod direction;
pub mod errors;
pub mod fit;
pub mod measurement;
pub mod mesh;
pub mod output;
pub mod settings;
pub mod snapshot;
pub mod spectral;
pub mod synthetic;

#[cfg(test)]
mod test_helper;

pub use crate::mesh::Grid;
