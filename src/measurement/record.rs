//! Typed measurement record. Field names follow the JSON layout consumed by
//! the fit and by plotting scripts.

use serde::{Deserialize, Serialize};

/// Provenance of a measurement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    pub n: usize,
    #[serde(rename = "L")]
    pub domain_length: f64,
    pub nu: f64,
    pub t: f64,
    pub omega_rms: f64,
}

/// Integrals over the sublevel sets `{|omega| < delta}`, one entry per delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SublevelCurves {
    pub delta_abs: Vec<f64>,
    pub delta_rel: Vec<f64>,
    pub m: Vec<f64>,
    #[serde(rename = "Q1_grad_omega")]
    pub grad_load_l1: Vec<f64>,
    #[serde(rename = "Q2_grad_omega2")]
    pub grad_load_l2: Vec<f64>,
    /// `None` where no velocity was available.
    #[serde(rename = "R_strain_opnorm")]
    pub strain_residue: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FisherSchedule {
    pub eps_abs: Vec<f64>,
    pub eps_rel: Vec<f64>,
    #[serde(rename = "J")]
    pub j: Vec<f64>,
}

/// Direction field diagnostic at the single scale `eps0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DirectionDiagnostic {
    pub eps0_abs: f64,
    #[serde(rename = "S_eps0")]
    pub saturated_energy: f64,
    #[serde(rename = "mean_Psi")]
    pub mean_psi: f64,
    #[serde(rename = "mean_G")]
    pub mean_g: f64,
    #[serde(rename = "M_threshold", default)]
    pub m_threshold: f64,
    /// Fraction of grid points with `G > M`.
    #[serde(rename = "frac_G_above_M", default)]
    pub frac_g_above_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementRecord {
    pub meta: Meta,
    pub sublevel: SublevelCurves,
    pub fisher: FisherSchedule,
    pub nspcm: DirectionDiagnostic,
    #[serde(default)]
    pub notes: Vec<String>,
}
