use crate::errors::*;
use crate::settings::MeasureSettings;

/// Relative sublevel thresholds, `10^-4 ... 10^-0.3`.
pub const DEFAULT_DELTA_EXPONENTS: (f64, f64, usize) = (-4., -0.3, 28);
/// Relative regularisation scales of the Fisher schedule, `10^-6 ... 10^-1`.
pub const DEFAULT_EPS_EXPONENTS: (f64, f64, usize) = (-6., -1., 18);
pub const DEFAULT_M_THRESHOLD: f64 = 1.0;
/// `eps0` of the direction field diagnostic relative to the RMS vorticity.
pub const DEFAULT_EPS0_REL: f64 = 1e-3;

/// `count` values spaced evenly in log space from `10^start_exp` to
/// `10^end_exp`, both ends included.
pub fn logspace(start_exp: f64, end_exp: f64, count: usize) -> Vec<f64> {
    match count {
        0 => return Vec::new(),
        1 => return vec![10f64.powf(start_exp)],
        _ => {}
    }

    let step = (end_exp - start_exp) / (count - 1) as f64;
    (0..count)
        .map(|i| {
            let e = if i == count - 1 {
                end_exp
            } else {
                start_exp + i as f64 * step
            };
            10f64.powf(e)
        })
        .collect()
}

fn check_sequence(v: &[f64], name: &str) -> Result<()> {
    if v.is_empty() {
        bail!(ErrorKind::InvalidConfig(format!("{} sequence is empty", name)));
    }

    if let Some(x) = v.iter().find(|x| !(**x > 0. && x.is_finite())) {
        bail!(ErrorKind::InvalidConfig(format!(
            "{} sequence must be strictly positive, found {}",
            name, x
        )));
    }

    if v.windows(2).any(|w| w[0] >= w[1]) {
        bail!(ErrorKind::InvalidConfig(format!(
            "{} sequence must be strictly increasing",
            name
        )));
    }

    Ok(())
}

/// Immutable configuration of one measurement run.
///
/// `deltas` and `eps_schedule` are relative to the RMS vorticity magnitude of
/// the measured field.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureConfig {
    grid_size: usize,
    domain_length: f64,
    deltas: Vec<f64>,
    eps_schedule: Vec<f64>,
    m_threshold: f64,
    eps0_rel: f64,
    reconstruct_velocity: bool,
}

impl MeasureConfig {
    pub fn new(
        grid_size: usize,
        domain_length: f64,
        deltas: Vec<f64>,
        eps_schedule: Vec<f64>,
    ) -> Result<MeasureConfig> {
        if grid_size == 0 {
            bail!(ErrorKind::InvalidConfig("grid size must be positive".to_string()));
        }

        if !(domain_length > 0. && domain_length.is_finite()) {
            bail!(ErrorKind::InvalidConfig(format!(
                "domain length must be positive, got {}",
                domain_length
            )));
        }

        check_sequence(&deltas, "delta")?;
        check_sequence(&eps_schedule, "epsilon")?;

        Ok(MeasureConfig {
            grid_size,
            domain_length,
            deltas,
            eps_schedule,
            m_threshold: DEFAULT_M_THRESHOLD,
            eps0_rel: DEFAULT_EPS0_REL,
            reconstruct_velocity: false,
        })
    }

    /// 28 relative thresholds in `[1e-4, 10^-0.3]` and 18 relative
    /// regularisation scales in `[1e-6, 1e-1]`.
    pub fn default_for(grid_size: usize, domain_length: f64) -> Result<MeasureConfig> {
        let (ds, de, dc) = DEFAULT_DELTA_EXPONENTS;
        let (es, ee, ec) = DEFAULT_EPS_EXPONENTS;

        MeasureConfig::new(
            grid_size,
            domain_length,
            logspace(ds, de, dc),
            logspace(es, ee, ec),
        )
    }

    pub fn from_settings(
        grid_size: usize,
        domain_length: f64,
        s: &MeasureSettings,
    ) -> Result<MeasureConfig> {
        Ok(MeasureConfig::new(
            grid_size,
            domain_length,
            s.delta_rel.values(),
            s.eps_rel.values(),
        )?
        .with_m_threshold(s.m_threshold)?
        .with_eps0_rel(s.eps0_rel)?
        .with_reconstruct_velocity(s.reconstruct_velocity))
    }

    /// Threshold `M` of the direction energy diagnostic, must be non-negative.
    pub fn with_m_threshold(mut self, m: f64) -> Result<MeasureConfig> {
        if !(m >= 0. && m.is_finite()) {
            bail!(ErrorKind::InvalidConfig(format!(
                "threshold M must be non-negative, got {}",
                m
            )));
        }

        self.m_threshold = m;
        Ok(self)
    }

    pub fn with_eps0_rel(mut self, eps0_rel: f64) -> Result<MeasureConfig> {
        if !(eps0_rel > 0. && eps0_rel.is_finite()) {
            bail!(ErrorKind::InvalidConfig(format!(
                "eps0 must be positive, got {}",
                eps0_rel
            )));
        }

        self.eps0_rel = eps0_rel;
        Ok(self)
    }

    /// If set, a missing velocity is reconstructed from the vorticity instead
    /// of skipping the strain residue.
    pub fn with_reconstruct_velocity(mut self, reconstruct: bool) -> MeasureConfig {
        self.reconstruct_velocity = reconstruct;
        self
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn domain_length(&self) -> f64 {
        self.domain_length
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    pub fn eps_schedule(&self) -> &[f64] {
        &self.eps_schedule
    }

    pub fn m_threshold(&self) -> f64 {
        self.m_threshold
    }

    pub fn eps0_rel(&self) -> f64 {
        self.eps0_rel
    }

    pub fn reconstruct_velocity(&self) -> bool {
        self.reconstruct_velocity
    }
}
