//! Power law fit `m(delta) ~ C delta^alpha` of a sublevel measure curve.
//!
//! The fit is an ordinary least squares line in log-log coordinates. If no
//! range is given, one is picked by a heuristic that prefers the band where
//! `m` is neither at the numerical floor nor close to saturation. The band
//! limits are a convention and can be tuned through `FitPolicy`.

// Move unit test into own file
#[cfg(test)]
#[path = "./fit_test.rs"]
mod fit_test;

use crate::errors::*;
use crate::measurement::{MeasurementRecord, Meta};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const DEFAULT_MIN_POINTS: usize = 5;
const DEFAULT_BAND_LOW: f64 = 1e-6;
const DEFAULT_BAND_HIGH: f64 = 0.3;
const DEFAULT_MIN_BAND_POINTS: usize = 6;
const DEFAULT_FALLBACK_LOW_QUANTILE: f64 = 0.2;
const DEFAULT_FALLBACK_HIGH_QUANTILE: f64 = 0.8;

/// Thresholds of the fit and of the automatic range selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FitPolicy {
    /// Smallest number of points a fit is attempted with.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
    /// Open band `(band_low, band_high)` of `m` the automatic range is taken from.
    #[serde(default = "default_band_low")]
    pub band_low: f64,
    #[serde(default = "default_band_high")]
    pub band_high: f64,
    /// If fewer points fall into the band, the range falls back to index
    /// quantiles of the delta sequence.
    #[serde(default = "default_min_band_points")]
    pub min_band_points: usize,
    #[serde(default = "default_fallback_low_quantile")]
    pub fallback_low_quantile: f64,
    #[serde(default = "default_fallback_high_quantile")]
    pub fallback_high_quantile: f64,
}

fn default_min_points() -> usize {
    DEFAULT_MIN_POINTS
}

fn default_band_low() -> f64 {
    DEFAULT_BAND_LOW
}

fn default_band_high() -> f64 {
    DEFAULT_BAND_HIGH
}

fn default_min_band_points() -> usize {
    DEFAULT_MIN_BAND_POINTS
}

fn default_fallback_low_quantile() -> f64 {
    DEFAULT_FALLBACK_LOW_QUANTILE
}

fn default_fallback_high_quantile() -> f64 {
    DEFAULT_FALLBACK_HIGH_QUANTILE
}

impl Default for FitPolicy {
    fn default() -> FitPolicy {
        FitPolicy {
            min_points: DEFAULT_MIN_POINTS,
            band_low: DEFAULT_BAND_LOW,
            band_high: DEFAULT_BAND_HIGH,
            min_band_points: DEFAULT_MIN_BAND_POINTS,
            fallback_low_quantile: DEFAULT_FALLBACK_LOW_QUANTILE,
            fallback_high_quantile: DEFAULT_FALLBACK_HIGH_QUANTILE,
        }
    }
}

impl FitPolicy {
    pub fn check(&self) -> Result<()> {
        if self.min_points < 2 {
            bail!(ErrorKind::InvalidConfig(format!(
                "a line needs at least 2 points, min_points = {}",
                self.min_points
            )));
        }

        if !(self.band_low >= 0. && self.band_low < self.band_high) {
            bail!(ErrorKind::InvalidConfig(format!(
                "fit band must satisfy 0 <= band_low < band_high, got ({}, {})",
                self.band_low, self.band_high
            )));
        }

        let (lq, hq) = (self.fallback_low_quantile, self.fallback_high_quantile);
        if !(0. <= lq && lq <= hq && hq <= 1.) {
            bail!(ErrorKind::InvalidConfig(format!(
                "fallback quantiles must satisfy 0 <= low <= high <= 1, got ({}, {})",
                lq, hq
            )));
        }

        Ok(())
    }
}

/// Closed interval `[min, max]` of delta. Serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct FitRange {
    pub min: f64,
    pub max: f64,
}

impl FitRange {
    pub fn new(min: f64, max: f64) -> Result<FitRange> {
        if !(min <= max && min.is_finite() && max.is_finite()) {
            bail!(ErrorKind::InvalidConfig(format!(
                "invalid fit range [{}, {}]",
                min, max
            )));
        }

        Ok(FitRange { min, max })
    }

    pub fn contains(&self, d: f64) -> bool {
        self.min <= d && d <= self.max
    }
}

impl From<[f64; 2]> for FitRange {
    fn from(r: [f64; 2]) -> FitRange {
        FitRange {
            min: r[0],
            max: r[1],
        }
    }
}

impl From<FitRange> for [f64; 2] {
    fn from(r: FitRange) -> [f64; 2] {
        [r.min, r.max]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PowerLawFit {
    pub alpha: f64,
    #[serde(rename = "C")]
    pub c: f64,
    #[serde(rename = "logC")]
    pub log_c: f64,
    pub r2: f64,
    pub npts: usize,
    pub fit_range: FitRange,
}

/// A missing fit is a regular outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    Fitted(PowerLawFit),
    Infeasible { reason: String },
}

impl FitOutcome {
    pub fn is_ok(&self) -> bool {
        match *self {
            FitOutcome::Fitted(_) => true,
            FitOutcome::Infeasible { .. } => false,
        }
    }
}

/// Fits `log m = alpha log delta + log C` over the points with `delta` in
/// `range` and `m > 0`.
pub fn fit_powerlaw(delta: &[f64], m: &[f64], range: FitRange, policy: &FitPolicy) -> FitOutcome {
    if delta.len() != m.len() {
        return FitOutcome::Infeasible {
            reason: format!(
                "delta and m differ in length ({} != {})",
                delta.len(),
                m.len()
            ),
        };
    }

    let (x, y): (Vec<f64>, Vec<f64>) = delta
        .iter()
        .zip(m)
        .filter(|&(&d, &m)| range.contains(d) && d > 0. && m > 0. && m.is_finite())
        .map(|(d, m)| (d.ln(), m.ln()))
        .unzip();

    let npts = x.len();
    let min_points = policy.min_points.max(2);
    if npts < min_points {
        return FitOutcome::Infeasible {
            reason: format!(
                "insufficient points: {} with m > 0 in [{:e}, {:e}], need at least {}",
                npts, range.min, range.max, min_points
            ),
        };
    }

    if x.iter().all(|&v| v == x[0]) {
        return FitOutcome::Infeasible {
            reason: "degenerate fit range: all selected delta coincide".to_string(),
        };
    }

    let nf = npts as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.;
    let mut sxy = 0.;
    for (x, y) in x.iter().zip(&y) {
        sxx += (x - x_mean) * (x - x_mean);
        sxy += (x - x_mean) * (y - y_mean);
    }

    let alpha = sxy / sxx;
    let log_c = y_mean - alpha * x_mean;

    let mut ss_res = 0.;
    let mut ss_tot = 0.;
    for (x, y) in x.iter().zip(&y) {
        let r = y - (alpha * x + log_c);
        ss_res += r * r;
        ss_tot += (y - y_mean) * (y - y_mean);
    }

    // constant response is fitted exactly
    let r2 = if ss_tot > 0. { 1. - ss_res / ss_tot } else { 1. };

    debug!(
        "Fitted {} points: alpha = {}, logC = {}, r2 = {}",
        npts, alpha, log_c, r2
    );

    FitOutcome::Fitted(PowerLawFit {
        alpha,
        c: log_c.exp(),
        log_c,
        r2,
        npts,
        fit_range: range,
    })
}

/// Picks a fit range: the delta span of the points with `m` inside the
/// policy's band, or, if the band holds too few points, the delta values at
/// the fallback index quantiles. Returns `None` for an empty curve.
pub fn suggest_fit_range(delta: &[f64], m: &[f64], policy: &FitPolicy) -> Option<FitRange> {
    if delta.is_empty() {
        return None;
    }

    let band: Vec<f64> = delta
        .iter()
        .zip(m)
        .filter(|&(_, &m)| m > policy.band_low && m < policy.band_high)
        .map(|(&d, _)| d)
        .collect();

    if band.len() < policy.min_band_points {
        warn!(
            "Only {} points with m in ({:e}, {}), falling back to index quantiles.",
            band.len(),
            policy.band_low,
            policy.band_high
        );

        let last = delta.len() - 1;
        let at = |q: f64| delta[((q * delta.len() as f64) as usize).min(last)];
        let (lo, hi) = (
            at(policy.fallback_low_quantile),
            at(policy.fallback_high_quantile),
        );

        return Some(FitRange {
            min: lo.min(hi),
            max: lo.max(hi),
        });
    }

    let min = band.iter().cloned().fold(::std::f64::INFINITY, f64::min);
    let max = band.iter().cloned().fold(::std::f64::NEG_INFINITY, f64::max);

    Some(FitRange { min, max })
}

/// Output record of a fit. On success the fit's fields sit next to `ok`,
/// otherwise `reason` explains the failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitRecord {
    pub ok: bool,
    #[serde(flatten)]
    pub fit: Option<PowerLawFit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub meta: Meta,
}

impl FitRecord {
    pub fn new(outcome: FitOutcome, meta: Meta) -> FitRecord {
        match outcome {
            FitOutcome::Fitted(fit) => FitRecord {
                ok: true,
                fit: Some(fit),
                reason: None,
                meta,
            },
            FitOutcome::Infeasible { reason } => FitRecord {
                ok: false,
                fit: None,
                reason: Some(reason),
                meta,
            },
        }
    }
}

/// Fits the absolute sublevel curve of a measurement. Without an explicit
/// range the range is chosen by `suggest_fit_range`.
pub fn fit_measurement(
    record: &MeasurementRecord,
    range: Option<FitRange>,
    policy: &FitPolicy,
) -> FitRecord {
    let delta = &record.sublevel.delta_abs;
    let m = &record.sublevel.m;

    let range = match range {
        Some(r) => Some(r),
        None => suggest_fit_range(delta, m, policy),
    };

    let outcome = match range {
        Some(r) => {
            info!("Fitting over delta in [{:e}, {:e}].", r.min, r.max);
            fit_powerlaw(delta, m, r, policy)
        }
        None => FitOutcome::Infeasible {
            reason: "insufficient points: empty sublevel curve".to_string(),
        },
    };

    match outcome {
        FitOutcome::Fitted(ref f) => info!("alpha = {}, C = {}, r2 = {}", f.alpha, f.c, f.r2),
        FitOutcome::Infeasible { ref reason } => warn!("No fit: {}", reason),
    }

    FitRecord::new(outcome, record.meta)
}
