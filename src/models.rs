use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Unit of the reported alkalinity.
pub const ALKALINITY_UNIT: &str = "mol/kg-soln";

/// One titration step: acid added so far and the cell reading after it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitrationStep {
    /// Cumulative acid volume added (mL).
    pub volume_ml: f64,
    /// Electrode potential (mV).
    pub potential_mv: f64,
    /// Cell temperature (°C, ITS-90).
    pub temperature_c: f64,
}

impl TitrationStep {
    pub fn new(volume_ml: f64, potential_mv: f64, temperature_c: f64) -> Self {
        Self {
            volume_ml,
            potential_mv,
            temperature_c,
        }
    }
}

/// Electrode calibration against a TRIS buffer of known pH.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrisCalibration {
    /// pH of the TRIS buffer on the total scale.
    pub ph_tris: f64,
    /// Potential read in the TRIS buffer (mV).
    pub e_tris_mv: f64,
}

/// A complete titration of one seawater sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitrationSample {
    pub steps: Vec<TitrationStep>,
    /// Practical salinity of the sample.
    pub salinity: f64,
    /// Sample mass (g).
    pub sample_mass_g: f64,
    /// Titrant concentration (mol/kg).
    pub acid_molarity: f64,
    /// Titrant density (g/mL).
    pub acid_density: f64,
    #[serde(default)]
    pub calibration: Option<TrisCalibration>,
}

impl TitrationSample {
    /// Build a sample from column vectors, the layout titrators usually export.
    ///
    /// `temperature_c` may hold a single value that applies to every step.
    ///
    /// # Errors
    /// [`CalcError::InvalidSample`] when the columns disagree in length.
    pub fn from_columns(
        volume_ml: &[f64],
        potential_mv: &[f64],
        temperature_c: &[f64],
        salinity: f64,
        sample_mass_g: f64,
        acid_molarity: f64,
        acid_density: f64,
    ) -> CalcResult<Self> {
        let n = volume_ml.len();
        if potential_mv.len() != n {
            return Err(CalcError::InvalidSample(format!(
                "{} volume(s) but {} potential(s)",
                n,
                potential_mv.len()
            )));
        }
        let broadcast = match temperature_c.len() {
            1 => true,
            len if len == n => false,
            len => {
                return Err(CalcError::InvalidSample(format!(
                    "{n} volume(s) but {len} temperature(s)"
                )));
            }
        };
        let steps = volume_ml
            .iter()
            .zip(potential_mv)
            .enumerate()
            .map(|(i, (&v, &e))| {
                let t = temperature_c[if broadcast { 0 } else { i }];
                TitrationStep::new(v, e, t)
            })
            .collect();

        Ok(Self {
            steps,
            salinity,
            sample_mass_g,
            acid_molarity,
            acid_density,
            calibration: None,
        })
    }

    pub fn with_calibration(mut self, ph_tris: f64, e_tris_mv: f64) -> Self {
        self.calibration = Some(TrisCalibration { ph_tris, e_tris_mv });
        self
    }

    /// Check the physical domain and completeness of the sample.
    ///
    /// # Errors
    /// - [`CalcError::Domain`] for negative salinity or non-positive sample
    ///   mass / acid molarity
    /// - [`CalcError::InvalidSample`] for non-finite readings, non-positive
    ///   volumes or acid density
    /// - [`CalcError::InsufficientData`] for fewer than two steps
    pub fn validate(&self) -> CalcResult<()> {
        if !self.salinity.is_finite() || self.salinity < 0.0 {
            return Err(CalcError::Domain(format!(
                "salinity must be >= 0, got {}",
                self.salinity
            )));
        }
        if !self.sample_mass_g.is_finite() || self.sample_mass_g <= 0.0 {
            return Err(CalcError::Domain(format!(
                "sample mass must be > 0, got {}",
                self.sample_mass_g
            )));
        }
        if !self.acid_molarity.is_finite() || self.acid_molarity <= 0.0 {
            return Err(CalcError::Domain(format!(
                "acid molarity must be > 0, got {}",
                self.acid_molarity
            )));
        }
        if !self.acid_density.is_finite() || self.acid_density <= 0.0 {
            return Err(CalcError::InvalidSample(format!(
                "acid density must be > 0, got {}",
                self.acid_density
            )));
        }
        if let Some(cal) = &self.calibration {
            if !cal.ph_tris.is_finite() || !cal.e_tris_mv.is_finite() {
                return Err(CalcError::InvalidSample(
                    "calibration values must be finite".into(),
                ));
            }
        }
        for (i, step) in self.steps.iter().enumerate() {
            if !step.volume_ml.is_finite()
                || !step.potential_mv.is_finite()
                || !step.temperature_c.is_finite()
            {
                return Err(CalcError::InvalidSample(format!(
                    "step {i} is missing volume, potential or temperature"
                )));
            }
            if step.volume_ml <= 0.0 {
                return Err(CalcError::InvalidSample(format!(
                    "step {i} has non-positive acid volume {}",
                    step.volume_ml
                )));
            }
        }
        if self.steps.len() < 2 {
            return Err(CalcError::InsufficientData {
                available: self.steps.len(),
                required: 2,
            });
        }
        Ok(())
    }
}

/// Tuning for the alkalinity pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Lower bound of the pH window, inclusive.
    pub ph_min: f64,
    /// Upper bound of the pH window, inclusive.
    pub ph_max: f64,
    /// Iteration bound of the non-linear fit.
    pub max_iter: usize,
    /// Relative parameter tolerance of the non-linear fit.
    pub tol: f64,
    /// Initial Levenberg-Marquardt damping.
    pub lambda0: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            ph_min: 3.0,
            ph_max: 3.5,
            max_iter: 100,
            tol: 1e-10,
            lambda0: 1e-3,
        }
    }
}

/// Which stage produced an alkalinity value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMethod {
    Linear,
    NonLinear,
}

/// Details of a converged non-linear fit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    /// Fitted activity-coefficient-like factor `f`.
    pub f: f64,
    /// Mean apparent standard potential (V).
    pub e0_volts: f64,
    pub iterations: usize,
    /// Root-mean-square residual of `m/m0`.
    pub rms_residual: f64,
    /// Gran estimate the fit was seeded with (mol/kg-soln).
    pub linear_estimate: f64,
}

/// Total alkalinity of one sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlkalinityResult {
    /// Total alkalinity (mol/kg-soln).
    pub alkalinity: f64,
    pub method: FitMethod,
    pub unit: String,
    /// Titration steps that entered the regression.
    pub points_used: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<FitDiagnostics>,
}

impl AlkalinityResult {
    pub fn micromol_per_kg(&self) -> f64 {
        self.alkalinity * 1e6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TitrationSample {
        TitrationSample::from_columns(
            &[5.0, 5.5, 6.0],
            &[190.0, 200.0, 210.0],
            &[25.0],
            35.0,
            200.0,
            0.1,
            1.02,
        )
        .unwrap()
    }

    #[test]
    fn from_columns_broadcasts_single_temperature() {
        let s = sample();
        assert_eq!(s.steps.len(), 3);
        assert!(s.steps.iter().all(|st| st.temperature_c == 25.0));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn from_columns_rejects_ragged_columns() {
        let err =
            TitrationSample::from_columns(&[5.0, 5.5], &[190.0], &[25.0], 35.0, 200.0, 0.1, 1.02)
                .unwrap_err();
        assert!(matches!(err, CalcError::InvalidSample(_)));

        let err = TitrationSample::from_columns(
            &[5.0, 5.5, 6.0],
            &[190.0, 200.0, 210.0],
            &[25.0, 25.0],
            35.0,
            200.0,
            0.1,
            1.02,
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::InvalidSample(_)));
    }

    #[test]
    fn validate_classifies_errors() {
        let mut s = sample();
        s.salinity = -1.0;
        assert!(matches!(s.validate(), Err(CalcError::Domain(_))));

        let mut s = sample();
        s.acid_molarity = 0.0;
        assert!(matches!(s.validate(), Err(CalcError::Domain(_))));

        let mut s = sample();
        s.sample_mass_g = -200.0;
        assert!(matches!(s.validate(), Err(CalcError::Domain(_))));

        let mut s = sample();
        s.steps[1].potential_mv = f64::NAN;
        assert!(matches!(s.validate(), Err(CalcError::InvalidSample(_))));

        let mut s = sample();
        s.steps[0].volume_ml = 0.0;
        assert!(matches!(s.validate(), Err(CalcError::InvalidSample(_))));

        for density in [0.0, -1.02, f64::NAN, f64::INFINITY] {
            let mut s = sample();
            s.acid_density = density;
            assert!(
                matches!(s.validate(), Err(CalcError::InvalidSample(_))),
                "acid density {density}"
            );
        }

        let mut s = sample();
        s.steps.truncate(1);
        assert!(matches!(
            s.validate(),
            Err(CalcError::InsufficientData { available: 1, required: 2 })
        ));
    }

    #[test]
    fn fit_options_fill_missing_fields() {
        let opts: FitOptions = serde_json::from_str(r#"{"max_iter": 5}"#).unwrap();
        assert_eq!(opts.max_iter, 5);
        assert_eq!(opts.ph_min, 3.0);
        assert_eq!(opts.ph_max, 3.5);
    }
}
