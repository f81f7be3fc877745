//! Chemistry module: physical constants and seawater acid-base constants used by
//! the alkalinity titration fit.
//!
//! This module provides:
//! - Physical constants (gas constant, Faraday constant, Kelvin offset) bundled in
//!   [`PhysicalConstants`] so callers can override them for testing
//! - Total sulfate and fluoride from practical salinity (standard seawater ratios)
//! - Bisulfate dissociation constant `Ks` (Dickson 1990) on the free scale
//! - Hydrogen fluoride dissociation constant `Kf` (Perez & Fraga 1987)
//!
//! Units conventions:
//! - Salinity is practical salinity (PSS-78)
//! - Temperatures are °C (ITS-90) unless a name says Kelvin
//! - Concentrations and constants are mol/kg-soln
//!
//! # Limitations
//! Dissociation constants are evaluated at zero gauge pressure only; the titration
//! cell is open to the atmosphere.
//!
//! # Examples
//! ```rust
//! use alkalinity_rs::chemistry::{ks_dickson1990, sulfate_total};
//!
//! let st = sulfate_total(35.0);
//! let ks = ks_dickson1990(35.0, 25.0);
//! assert!(st > 0.028 && st < 0.029);
//! assert!(ks > 0.09 && ks < 0.11);
//! ```
use serde::{Deserialize, Serialize};

/// Molar gas constant (J mol⁻¹ K⁻¹).
pub const GAS_CONSTANT: f64 = 8.31451;
/// Faraday constant (C mol⁻¹).
pub const FARADAY: f64 = 96485.34;
/// Offset between °C and K.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Ratio of chlorinity to practical salinity (S = 1.80655 Cl).
pub const SALINITY_PER_CHLORINITY: f64 = 1.80655;
/// Sulfate mass per unit chlorinity (g/kg per ‰ Cl).
pub const SO4_PER_CHLORINITY: f64 = 0.14;
/// Fluoride mass per unit chlorinity (g/kg per ‰ Cl).
pub const F_PER_CHLORINITY: f64 = 0.000_067;
/// Molar mass of sulfate SO4^2- (g/mol).
pub const M_SO4: f64 = 96.062;
/// Molar mass of fluorine (g/mol).
pub const M_F: f64 = 18.998_4;

/// Physical constants used to turn electrode potentials into proton activities.
///
/// These are immutable once built; the estimator reads them through a shared
/// reference, so overriding a value only affects the call it is passed to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Gas constant R (J mol⁻¹ K⁻¹).
    pub r: f64,
    /// Faraday constant F (C mol⁻¹).
    pub f: f64,
    /// Absolute-zero offset K so that T(K) = T(°C) + K.
    pub k: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            r: GAS_CONSTANT,
            f: FARADAY,
            k: KELVIN_OFFSET,
        }
    }
}

impl PhysicalConstants {
    /// Absolute temperature (K) for a Celsius reading.
    pub fn kelvin(&self, temp_c: f64) -> f64 {
        temp_c + self.k
    }

    /// Nernst slope `R·T/F` in volts for a Celsius reading.
    pub fn nernst_slope(&self, temp_c: f64) -> f64 {
        self.r * self.kelvin(temp_c) / self.f
    }
}

/// Total sulfate (mol/kg-soln) from practical salinity.
pub fn sulfate_total(salinity: f64) -> f64 {
    (SO4_PER_CHLORINITY / M_SO4) * (salinity / SALINITY_PER_CHLORINITY)
}

/// Total fluoride (mol/kg-soln) from practical salinity.
pub fn fluoride_total(salinity: f64) -> f64 {
    (F_PER_CHLORINITY / M_F) * (salinity / SALINITY_PER_CHLORINITY)
}

/// Ionic strength (mol/kg-H2O) of seawater from practical salinity.
pub fn ionic_strength(salinity: f64) -> f64 {
    19.924 * salinity / (1000.0 - 1.005 * salinity)
}

/// Bisulfate dissociation constant `Ks` (Dickson 1990), free hydrogen ion scale.
///
/// Evaluated at zero gauge pressure and converted from mol/kg-H2O to mol/kg-soln.
/// Inputs: `salinity` (PSS-78), `temp_c` in °C.
pub fn ks_dickson1990(salinity: f64, temp_c: f64) -> f64 {
    let tk = temp_c + KELVIN_OFFSET;
    let ln_t = tk.ln();
    let i = ionic_strength(salinity);
    let sqrt_i = i.sqrt();

    let ln_ks = -4276.1 / tk + 141.328 - 23.093 * ln_t
        + (-13856.0 / tk + 324.57 - 47.986 * ln_t) * sqrt_i
        + (35474.0 / tk - 771.54 + 114.723 * ln_t) * i
        - 2698.0 / tk * i * sqrt_i
        + 1776.0 / tk * i * i;

    ln_ks.exp() * (1.0 - 0.001_005 * salinity)
}

/// Hydrogen fluoride dissociation constant `Kf` (Perez & Fraga 1987).
pub fn kf_perez_fraga1987(salinity: f64, temp_c: f64) -> f64 {
    let tk = temp_c + KELVIN_OFFSET;
    (874.0 / tk - 9.68 + 0.111 * salinity.sqrt()).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nernst_slope_at_25c() {
        let c = PhysicalConstants::default();
        let k = c.nernst_slope(25.0);
        assert!((k - 0.025_693).abs() < 1e-5, "slope {k}");
    }

    #[test]
    fn sulfate_and_fluoride_scale_with_salinity() {
        assert_eq!(sulfate_total(0.0), 0.0);
        let st = sulfate_total(35.0);
        assert!((st - 0.028_24).abs() < 1e-4, "St {st}");
        let ft = fluoride_total(35.0);
        assert!((ft - 6.83e-5).abs() < 1e-6, "Ft {ft}");
        assert!((sulfate_total(17.5) * 2.0 - st).abs() < 1e-15);
    }

    #[test]
    fn dissociation_constants_near_literature_values() {
        let ks = ks_dickson1990(35.0, 25.0);
        assert!((ks - 0.1003).abs() < 1e-3, "Ks {ks}");
        let kf = kf_perez_fraga1987(35.0, 25.0);
        assert!((kf - 2.261e-3).abs() < 1e-5, "Kf {kf}");
    }
}
