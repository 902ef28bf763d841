use super::*;
use crate::measurement::{
    logspace, DirectionDiagnostic, FisherSchedule, MeasurementRecord, Meta, SublevelCurves,
};
use crate::test_helper::close_floats;
use quickcheck::TestResult;

fn power_law(delta: &[f64], c: f64, alpha: f64) -> Vec<f64> {
    delta.iter().map(|d| c * d.powf(alpha)).collect()
}

fn meta() -> Meta {
    Meta {
        n: 16,
        domain_length: 6.,
        nu: 0.5,
        t: 1.,
        omega_rms: 2.,
    }
}

fn record(delta: Vec<f64>, m: Vec<f64>) -> MeasurementRecord {
    let k = delta.len();
    MeasurementRecord {
        meta: meta(),
        sublevel: SublevelCurves {
            delta_rel: delta.iter().map(|d| d / 2.).collect(),
            delta_abs: delta,
            m,
            grad_load_l1: vec![0.; k],
            grad_load_l2: vec![0.; k],
            strain_residue: vec![None; k],
        },
        fisher: FisherSchedule {
            eps_abs: vec![],
            eps_rel: vec![],
            j: vec![],
        },
        nspcm: DirectionDiagnostic {
            eps0_abs: 1e-3,
            saturated_energy: 0.,
            mean_psi: 0.,
            mean_g: 0.,
            m_threshold: 1.,
            frac_g_above_m: 0.,
        },
        notes: vec![],
    }
}

fn fitted(o: FitOutcome) -> PowerLawFit {
    match o {
        FitOutcome::Fitted(f) => f,
        FitOutcome::Infeasible { reason } => panic!("fit failed: {}", reason),
    }
}

#[test]
fn test_recovers_power_law() {
    let delta = logspace(-3., 0., 20);
    let m = power_law(&delta, 0.5, 2.3);
    let range = FitRange::new(delta[0], delta[19]).unwrap();

    let f = fitted(fit_powerlaw(&delta, &m, range, &FitPolicy::default()));

    assert!(close_floats(f.alpha, 2.3, 1e-10), "{}", f.alpha);
    assert!(close_floats(f.c, 0.5, 1e-10), "{}", f.c);
    assert!(close_floats(f.log_c, 0.5f64.ln(), 1e-10));
    assert!(close_floats(f.r2, 1., 1e-12));
    assert_eq!(f.npts, 20);
    assert_eq!(f.fit_range, range);
}

#[test]
fn test_range_and_positivity_select_points() {
    let delta = logspace(-3., 0., 13);
    let mut m = power_law(&delta, 1., 1.);
    m[6] = 0.;
    m[7] = 0.;

    let f = fitted(fit_powerlaw(
        &delta,
        &m,
        FitRange::new(delta[2], delta[10]).unwrap(),
        &FitPolicy::default(),
    ));

    assert_eq!(f.npts, 7);
    assert!(close_floats(f.alpha, 1., 1e-10));
}

#[test]
fn test_insufficient_points() {
    let delta = logspace(-3., 0., 10);
    let m = power_law(&delta, 1., 2.);

    // only 3 points in range
    let o = fit_powerlaw(
        &delta,
        &m,
        FitRange::new(delta[3], delta[5]).unwrap(),
        &FitPolicy::default(),
    );

    match o {
        FitOutcome::Infeasible { ref reason } => assert!(reason.contains("insufficient points")),
        _ => panic!("fit should be infeasible"),
    }
    assert!(!o.is_ok());

    let r = FitRecord::new(o, meta());
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["ok"], false);
    assert!(json["reason"]
        .as_str()
        .unwrap()
        .contains("insufficient points"));
    assert!(json.get("alpha").is_none());
    assert_eq!(json["meta"]["n"], 16);
}

#[test]
fn test_constant_response() {
    let delta = logspace(-2., 0., 8);
    let m = vec![1.; 8];

    let f = fitted(fit_powerlaw(
        &delta,
        &m,
        FitRange::new(0., 1.).unwrap(),
        &FitPolicy::default(),
    ));

    assert!(close_floats(f.alpha, 0., 1e-12));
    assert!(close_floats(f.c, 1., 1e-12));
    assert_eq!(f.r2, 1.);
}

#[test]
fn test_degenerate_input() {
    let policy = FitPolicy::default();
    let range = FitRange::new(0., 1.).unwrap();

    assert!(!fit_powerlaw(&[1.; 6], &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], range, &policy).is_ok());
    assert!(!fit_powerlaw(&[0.1, 0.2], &[0.1], range, &policy).is_ok());
    assert!(FitRange::new(1., 0.5).is_err());
}

#[test]
fn test_suggest_fit_range_band() {
    let delta = logspace(-4., 0., 40);
    let m = power_law(&delta, 1., 3.);

    let r = suggest_fit_range(&delta, &m, &FitPolicy::default()).unwrap();

    // m = delta^3 lies in (1e-6, 0.3) for delta in (1e-2, 0.3^(1/3))
    assert!(r.min > 1e-2 && r.min < 1.3e-2, "{}", r.min);
    assert!(r.max < 0.3f64.powf(1. / 3.) && r.max > 0.6, "{}", r.max);
}

#[test]
fn test_suggest_fit_range_fallback() {
    let delta = logspace(-4., 0., 10);
    // saturated curve, nothing in the band
    let m = vec![1.; 10];

    let r = suggest_fit_range(&delta, &m, &FitPolicy::default()).unwrap();

    assert_eq!(r.min, delta[2]);
    assert_eq!(r.max, delta[8]);
    assert!(suggest_fit_range(&[], &[], &FitPolicy::default()).is_none());
}

#[test]
fn test_fit_measurement() {
    let delta = logspace(-4., 0., 28);
    let m = power_law(&delta, 2., 2.);
    let rec = record(delta, m);
    let policy = FitPolicy::default();

    let auto = fit_measurement(&rec, None, &policy);
    assert!(auto.ok);
    assert_eq!(auto.meta, meta());
    let f = auto.fit.unwrap();
    assert!(close_floats(f.alpha, 2., 1e-10));

    let explicit = fit_measurement(&rec, Some(FitRange::new(1e-4, 3e-4).unwrap()), &policy);
    assert!(!explicit.ok);
    assert!(explicit.fit.is_none());

    let empty = fit_measurement(&record(vec![], vec![]), None, &policy);
    assert!(!empty.ok);
}

#[test]
fn test_fit_record_layout() {
    let delta = logspace(-3., 0., 10);
    let m = power_law(&delta, 1., 2.);
    let r = FitRecord::new(
        fit_powerlaw(
            &delta,
            &m,
            FitRange::new(1e-3, 1.).unwrap(),
            &FitPolicy::default(),
        ),
        meta(),
    );

    let json = serde_json::to_value(&r).unwrap();
    for key in &["ok", "alpha", "C", "logC", "r2", "npts", "fit_range", "meta"] {
        assert!(json.get(*key).is_some(), "missing key {}", key);
    }
    assert!(json.get("reason").is_none());
    assert_eq!(json["fit_range"][0], 1e-3);
    assert_eq!(json["meta"]["L"], 6.);

    let back: FitRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, r);
}

#[test]
fn test_policy_check() {
    assert!(FitPolicy::default().check().is_ok());

    let mut p = FitPolicy::default();
    p.min_points = 1;
    assert!(p.check().is_err());

    let mut p = FitPolicy::default();
    p.band_high = p.band_low;
    assert!(p.check().is_err());

    let mut p = FitPolicy::default();
    p.fallback_low_quantile = 0.9;
    assert!(p.check().is_err());
}

quickcheck! {
    fn recovers_exponent_and_prefactor(a: u8, c: u8) -> TestResult {
        let alpha = f64::from(a) / 50. + 0.1;
        let c = (f64::from(c) + 1.) / 64.;
        let delta = logspace(-4., -0.3, 28);
        let m = power_law(&delta, c, alpha);

        if m.iter().any(|&m| m == 0.) {
            return TestResult::discard();
        }

        let range = FitRange::new(delta[0], delta[27]).unwrap();
        match fit_powerlaw(&delta, &m, range, &FitPolicy::default()) {
            FitOutcome::Fitted(f) => TestResult::from_bool(
                (f.alpha - alpha).abs() < 1e-9
                    && (f.c - c).abs() < 1e-9 * c
                    && f.r2 > 1. - 1e-9,
            ),
            FitOutcome::Infeasible { .. } => TestResult::failed(),
        }
    }
}
