//! This module handles a TOML settings file.

use crate::errors::*;
use crate::fit::FitPolicy;
use crate::measurement::{
    logspace, DEFAULT_DELTA_EXPONENTS, DEFAULT_EPS0_REL, DEFAULT_EPS_EXPONENTS,
    DEFAULT_M_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

/// Structure that holds settings, which are defined externally in a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub measure: MeasureSettings,
    #[serde(default)]
    pub fit: FitPolicy,
}

/// `count` values from `10^start_exp` to `10^end_exp`, evenly spaced in log
/// space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LogSpacing {
    pub start_exp: f64,
    pub end_exp: f64,
    pub count: usize,
}

impl LogSpacing {
    pub fn values(&self) -> Vec<f64> {
        logspace(self.start_exp, self.end_exp, self.count)
    }
}

/// Holds measurement specific settings. Sequences are relative to the RMS
/// vorticity magnitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MeasureSettings {
    #[serde(default = "default_m_threshold")]
    pub m_threshold: f64,
    #[serde(default = "default_eps0_rel")]
    pub eps0_rel: f64,
    #[serde(default)]
    pub reconstruct_velocity: bool,
    // tables last, TOML cannot emit plain values after them
    #[serde(default = "default_delta_rel")]
    pub delta_rel: LogSpacing,
    #[serde(default = "default_eps_rel")]
    pub eps_rel: LogSpacing,
}

fn default_delta_rel() -> LogSpacing {
    let (start_exp, end_exp, count) = DEFAULT_DELTA_EXPONENTS;
    LogSpacing {
        start_exp,
        end_exp,
        count,
    }
}

fn default_eps_rel() -> LogSpacing {
    let (start_exp, end_exp, count) = DEFAULT_EPS_EXPONENTS;
    LogSpacing {
        start_exp,
        end_exp,
        count,
    }
}

fn default_m_threshold() -> f64 {
    DEFAULT_M_THRESHOLD
}

fn default_eps0_rel() -> f64 {
    DEFAULT_EPS0_REL
}

impl Default for MeasureSettings {
    fn default() -> MeasureSettings {
        MeasureSettings {
            m_threshold: DEFAULT_M_THRESHOLD,
            eps0_rel: DEFAULT_EPS0_REL,
            reconstruct_velocity: false,
            delta_rel: default_delta_rel(),
            eps_rel: default_eps_rel(),
        }
    }
}

/// Reads the content of a file `filename` into an string and return it.
fn read_from_file(filename: &Path) -> Result<String> {
    let mut f = File::open(filename)
        .chain_err(|| format!("Unable to open file '{}'.", filename.display()))?;
    let mut content = String::new();

    f.read_to_string(&mut content)
        .chain_err(|| "Unable to read file.")?;

    Ok(content)
}

/// Parses and checks settings given as TOML.
pub fn from_toml_str(s: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(s).chain_err(|| "Unable to parse parameter file.")?;

    check_settings(&settings)?;

    Ok(settings)
}

/// Reads content of a file `param_file`, that should point to a valid TOML
/// file, and parses it.
/// Then returns the deserialized data in form of a Settings struct.
pub fn read_parameter_file<P: AsRef<Path>>(param_file: P) -> Result<Settings> {
    // read .toml file into string
    let toml_string =
        read_from_file(param_file.as_ref()).chain_err(|| "Unable to read parameter file.")?;

    from_toml_str(&toml_string)
}

fn check_spacing(s: &LogSpacing, name: &str) -> Result<()> {
    if s.count == 0 {
        bail!(ErrorKind::InvalidConfig(format!("`{}` needs at least one value", name)));
    }

    if !(s.start_exp.is_finite() && s.end_exp.is_finite()) {
        bail!(ErrorKind::InvalidConfig(format!(
            "`{}` exponents must be finite",
            name
        )));
    }

    if s.count > 1 && s.end_exp <= s.start_exp {
        bail!(ErrorKind::InvalidConfig(format!(
            "`{}` must be increasing, got exponents {} to {}",
            name, s.start_exp, s.end_exp
        )));
    }

    Ok(())
}

pub fn check_settings(s: &Settings) -> Result<()> {
    let m = &s.measure;

    check_spacing(&m.delta_rel, "delta_rel")?;
    check_spacing(&m.eps_rel, "eps_rel")?;

    if !(m.m_threshold >= 0.) {
        bail!(ErrorKind::InvalidConfig(format!(
            "`m_threshold` must be non-negative, got {}",
            m.m_threshold
        )));
    }

    if !(m.eps0_rel > 0.) {
        bail!(ErrorKind::InvalidConfig(format!(
            "`eps0_rel` must be positive, got {}",
            m.eps0_rel
        )));
    }

    s.fit.check()
}

impl Settings {
    /// Writes the settings as TOML, e.g. to record the parameters of a run.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let s = toml::to_string(self).chain_err(|| "Unable to serialize settings.")?;

        let mut f = File::create(path)
            .chain_err(|| format!("Cannot create settings file '{}'.", path.display()))?;
        f.write_all(s.as_bytes())
            .chain_err(|| "Unable to write settings.")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn read_settings() {
        let settings = read_parameter_file("./test/parameter.toml").unwrap();
        let settings_default = read_parameter_file("./test/parameter_no_defaults.toml").unwrap();

        assert_eq!(settings_default, Settings::default());

        assert_eq!(
            settings.measure.delta_rel,
            LogSpacing {
                start_exp: -3.,
                end_exp: 0.,
                count: 16,
            }
        );
        assert_eq!(settings.measure.delta_rel.values().len(), 16);
        assert_eq!(settings.measure.eps_rel, default_eps_rel());
        assert_eq!(settings.measure.m_threshold, 2.5);
        assert_eq!(settings.measure.eps0_rel, 1e-2);
        assert_eq!(settings.measure.reconstruct_velocity, true);
        assert_eq!(settings_default.measure.reconstruct_velocity, false);

        assert_eq!(settings.fit.min_points, 4);
        assert_eq!(settings.fit.band_low, 1e-5);
        assert_eq!(settings.fit.band_high, 0.5);
        assert_eq!(settings.fit.min_band_points, FitPolicy::default().min_band_points);
        assert_eq!(settings.fit.fallback_low_quantile, 0.1);
        assert_eq!(settings.fit.fallback_high_quantile, 0.9);
    }

    #[test]
    #[should_panic]
    fn test_settings_unused_keys() {
        read_parameter_file("./test/parameter_unused.toml").unwrap();
    }

    #[test]
    fn test_settings_are_checked() {
        assert!(from_toml_str("[measure]\neps0_rel = 0.0\n").is_err());
        assert!(from_toml_str("[measure]\nm_threshold = -1.0\n").is_err());
        assert!(
            from_toml_str("[measure]\ndelta_rel = { start_exp = 0.0, end_exp = -1.0, count = 4 }\n")
                .is_err()
        );
        assert!(from_toml_str("[fit]\nband_low = 0.5\nband_high = 0.1\n").is_err());
        assert!(from_toml_str("").is_ok());
    }

    #[test]
    fn test_save_settings() {
        let path = env::temp_dir().join(format!("vortexsublevel-settings-{}.toml", std::process::id()));
        let settings = read_parameter_file("./test/parameter.toml").unwrap();

        settings.save_to_file(&path).unwrap();
        let back = read_parameter_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(back, settings);
    }
}
