use std::f64::consts::LN_10;

use crate::chemistry::{
    PhysicalConstants, fluoride_total, kf_perez_fraga1987, ks_dickson1990, sulfate_total,
};
use crate::error::{CalcError, CalcResult};
use crate::models::{
    ALKALINITY_UNIT, AlkalinityResult, FitDiagnostics, FitMethod, FitOptions, TitrationSample,
};
use crate::numerics::{LmSettings, levenberg_marquardt, linear_regression};

/// Per-step quantities shared by the Gran and non-linear stages.
#[derive(Clone, Copy, Debug)]
struct Point {
    /// Acid mass added (g).
    mass: f64,
    /// Electrode potential (V).
    e_volts: f64,
    temp_c: f64,
    /// Nernst slope `R·Tk/F` (V).
    slope: f64,
}

/// Outcome of the Gran stage, reused to seed the non-linear fit.
struct GranStage {
    points: Vec<Point>,
    alkalinity: f64,
}

impl GranStage {
    fn linear_result(&self) -> AlkalinityResult {
        AlkalinityResult {
            alkalinity: self.alkalinity,
            method: FitMethod::Linear,
            unit: ALKALINITY_UNIT.to_string(),
            points_used: self.points.len(),
            diagnostics: None,
        }
    }
}

/// Total alkalinity from a potentiometric titration, using the default fit options.
///
/// See [`estimate_alkalinity_with`].
pub fn estimate_alkalinity(
    sample: &TitrationSample,
    constants: &PhysicalConstants,
) -> CalcResult<AlkalinityResult> {
    estimate_alkalinity_with(sample, constants, &FitOptions::default())
}

/// Total alkalinity (mol/kg-soln) from a potentiometric titration.
///
/// The pipeline converts temperatures to Kelvin, optionally restricts the
/// titration to the pH window using the TRIS calibration, computes a Gran
/// estimate by ordinary least squares, and refines it with a two-parameter
/// non-linear fit (alkalinity `At` and scale factor `f`) that accounts for
/// bisulfate and hydrogen fluoride.
///
/// # Errors
/// - [`CalcError::Domain`] / [`CalcError::InvalidSample`] for bad inputs
/// - [`CalcError::InsufficientData`] when fewer than two steps survive the
///   pH window or lie past the equivalence point
/// - [`CalcError::Convergence`] when the non-linear fit fails; the caller may
///   fall back to [`gran_estimate`]
pub fn estimate_alkalinity_with(
    sample: &TitrationSample,
    constants: &PhysicalConstants,
    options: &FitOptions,
) -> CalcResult<AlkalinityResult> {
    let gran = gran_stage(sample, constants, options)?;
    refine(sample, &gran, options)
}

/// Linear Gran estimate of total alkalinity, without the non-linear refinement.
pub fn gran_estimate(
    sample: &TitrationSample,
    constants: &PhysicalConstants,
    options: &FitOptions,
) -> CalcResult<AlkalinityResult> {
    gran_stage(sample, constants, options).map(|gran| gran.linear_result())
}

/// Non-linear estimate, falling back to the Gran estimate when the fit does
/// not converge. Every other error is returned unchanged.
pub fn estimate_alkalinity_or_linear(
    sample: &TitrationSample,
    constants: &PhysicalConstants,
    options: &FitOptions,
) -> CalcResult<AlkalinityResult> {
    let gran = gran_stage(sample, constants, options)?;
    match refine(sample, &gran, options) {
        Err(err @ CalcError::Convergence { .. }) => {
            log::warn!("{err}; reporting the linear Gran estimate instead");
            Ok(gran.linear_result())
        }
        other => other,
    }
}

/// Stages 1-3: Kelvin conversion, pH window, Gran regression.
fn gran_stage(
    sample: &TitrationSample,
    constants: &PhysicalConstants,
    options: &FitOptions,
) -> CalcResult<GranStage> {
    sample.validate()?;

    let mut points: Vec<Point> = sample
        .steps
        .iter()
        .map(|step| Point {
            mass: step.volume_ml * sample.acid_density,
            e_volts: step.potential_mv / 1000.0,
            temp_c: step.temperature_c,
            slope: constants.nernst_slope(step.temperature_c),
        })
        .collect();

    if let Some(cal) = &sample.calibration {
        let e_tris = cal.e_tris_mv / 1000.0;
        points.retain(|p| {
            let ph = cal.ph_tris + (e_tris - p.e_volts) / (p.slope * LN_10);
            (options.ph_min..=options.ph_max).contains(&ph)
        });
        log::debug!(
            "pH window [{}, {}] kept {} of {} steps",
            options.ph_min,
            options.ph_max,
            points.len(),
            sample.steps.len()
        );
        if points.len() < 2 {
            return Err(CalcError::InsufficientData {
                available: points.len(),
                required: 2,
            });
        }
    }

    let w = sample.sample_mass_g;
    let masses: Vec<f64> = points.iter().map(|p| p.mass).collect();
    let gran: Vec<f64> = points
        .iter()
        .map(|p| (w + p.mass) * (p.e_volts / p.slope).exp())
        .collect();

    let fit = linear_regression(&gran, &masses)?;
    let alkalinity = fit.intercept * sample.acid_molarity / w;
    if !alkalinity.is_finite() {
        return Err(CalcError::InvalidSample(
            "Gran regression produced a non-finite alkalinity".into(),
        ));
    }
    log::debug!("Gran estimate: {alkalinity:e} {ALKALINITY_UNIT}");

    Ok(GranStage { points, alkalinity })
}

/// Stage 4: least-squares fit of `m/m0` for `At` and `f`.
fn refine(
    sample: &TitrationSample,
    gran: &GranStage,
    options: &FitOptions,
) -> CalcResult<AlkalinityResult> {
    let w = sample.sample_mass_g;
    let c = sample.acid_molarity;
    let s = sample.salinity;
    let points = &gran.points;

    // Apparent E0 from the points past the equivalence point.
    let e0_samples: Vec<f64> = points
        .iter()
        .filter_map(|p| {
            let excess = (c * p.mass - gran.alkalinity * w) / (w + p.mass);
            (excess > 0.0).then(|| p.e_volts - p.slope * excess.ln())
        })
        .collect();
    if e0_samples.len() < points.len() {
        log::warn!(
            "{} step(s) before the equivalence point ignored when estimating E0",
            points.len() - e0_samples.len()
        );
    }
    if e0_samples.len() < 2 {
        return Err(CalcError::InsufficientData {
            available: e0_samples.len(),
            required: 2,
        });
    }
    let e0 = e0_samples.iter().sum::<f64>() / e0_samples.len() as f64;
    log::debug!("mean E0 = {e0:.6} V over {} step(s)", e0_samples.len());

    let st = sulfate_total(s);
    let ft = fluoride_total(s);
    let terms: Vec<ModelTerm> = points
        .iter()
        .map(|p| {
            let ks = ks_dickson1990(s, p.temp_c);
            ModelTerm {
                h_prime: ((p.e_volts - e0) / p.slope).exp(),
                ks,
                kf: kf_perez_fraga1987(s, p.temp_c),
                z: 1.0 + st / ks,
                dilution: (w + p.mass) / w,
            }
        })
        .collect();

    let observed: Vec<f64> = points.iter().map(|p| p.mass / w).collect();
    let settings = LmSettings {
        max_iter: options.max_iter,
        tol: options.tol,
        lambda0: options.lambda0,
    };
    let fit = levenberg_marquardt(
        &observed,
        [gran.alkalinity, 1.0],
        &settings,
        |p, i| terms[i].acid_ratio(p[0], p[1], st, ft, c),
        |p| p[1] > 0.0,
    )?;

    let [alkalinity, f] = fit.params;
    if !alkalinity.is_finite() {
        return Err(CalcError::Convergence {
            iterations: fit.iterations,
            reason: "fit diverged to a non-finite alkalinity".into(),
        });
    }
    log::debug!(
        "non-linear fit: At = {alkalinity:e}, f = {f:.6} after {} iteration(s)",
        fit.iterations
    );

    Ok(AlkalinityResult {
        alkalinity,
        method: FitMethod::NonLinear,
        unit: ALKALINITY_UNIT.to_string(),
        points_used: points.len(),
        diagnostics: Some(FitDiagnostics {
            f,
            e0_volts: e0,
            iterations: fit.iterations,
            rms_residual: (fit.ssr / observed.len() as f64).sqrt(),
            linear_estimate: gran.alkalinity,
        }),
    })
}

/// Per-step constants of the non-linear model.
#[derive(Clone, Copy, Debug)]
struct ModelTerm {
    h_prime: f64,
    ks: f64,
    kf: f64,
    z: f64,
    /// `(m0 + m) / m0`.
    dilution: f64,
}

impl ModelTerm {
    /// Predicted `m/m0` for alkalinity `at` and scale factor `f`.
    ///
    /// Acid added balances the sample alkalinity plus the protons held as
    /// free H+, HSO4- and HF.
    fn acid_ratio(&self, at: f64, f: f64, st: f64, ft: f64, c: f64) -> f64 {
        let h = f * self.h_prime;
        let bisulfate = st / (1.0 + self.ks * self.z / h);
        let hydrogen_fluoride = ft / (1.0 + self.kf / h);
        (at + bisulfate + hydrogen_fluoride) / c + self.dilution * (h / self.z) / c
    }
}
