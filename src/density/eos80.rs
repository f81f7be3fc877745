//! UNESCO 1983 (EOS-80) one-atmosphere density of pure water and seawater.
//!
//! References:
//! - Fofonoff, P. and Millard, R.C. Jr (1983). Algorithms for computation of
//!   fundamental properties of seawater. UNESCO Tech. Pap. in Mar. Sci. 44.
//! - Millero, F.J. and Poisson, A. (1981). International one-atmosphere
//!   equation of state of seawater. Deep-Sea Res. 28A(6), 625-629.
//!
//! Inputs are ITS-90 temperatures; the polynomials are defined on IPTS-68 and
//! the conversion happens internally.

use crate::error::{CalcError, CalcResult};

/// IPTS-68 / ITS-90 temperature ratio.
pub const T68_PER_T90: f64 = 1.00024;

// Standard Mean Ocean Water, UNESCO 1983 eqn (14).
const A0: f64 = 999.842_594;
const A1: f64 = 6.793_952e-2;
const A2: f64 = -9.095_290e-3;
const A3: f64 = 1.001_685e-4;
const A4: f64 = -1.120_083e-6;
const A5: f64 = 6.536_332e-9;

// Salinity terms, UNESCO 1983 eqn (13).
const B0: f64 = 8.244_93e-1;
const B1: f64 = -4.089_9e-3;
const B2: f64 = 7.643_8e-5;
const B3: f64 = -8.246_7e-7;
const B4: f64 = 5.387_5e-9;

const C0: f64 = -5.724_66e-3;
const C1: f64 = 1.022_7e-4;
const C2: f64 = -1.654_6e-6;

const D0: f64 = 4.831_4e-4;

/// Convert an ITS-90 temperature to IPTS-68.
pub fn t68_from_t90(t90: f64) -> f64 {
    t90 * T68_PER_T90
}

/// Convert an IPTS-68 temperature to ITS-90.
pub fn t90_from_t68(t68: f64) -> f64 {
    t68 / T68_PER_T90
}

/// Density of Standard Mean Ocean Water (pure water) in kg/m³.
///
/// `temp_c` is in-situ temperature in °C (ITS-90). Defined for every real
/// input; accuracy is only certified over the oceanographic range.
pub fn pure_water_density(temp_c: f64) -> f64 {
    let t = t68_from_t90(temp_c);
    A0 + (A1 + (A2 + (A3 + (A4 + A5 * t) * t) * t) * t) * t
}

/// Element-wise [`pure_water_density`].
pub fn pure_water_density_all(temps_c: &[f64]) -> Vec<f64> {
    temps_c.iter().map(|&t| pure_water_density(t)).collect()
}

/// Density of seawater at zero gauge pressure, normalized by 1000
/// (i.e. kg/m³ ÷ 1000, numerically g/cm³).
///
/// `salinity` is practical salinity (PSS-78) and must be non-negative;
/// `temp_c` is °C (ITS-90).
///
/// # Errors
/// [`CalcError::Domain`] for negative or non-finite salinity, where the
/// `S^1.5` term is undefined.
pub fn seawater_density(salinity: f64, temp_c: f64) -> CalcResult<f64> {
    if !salinity.is_finite() || salinity < 0.0 {
        return Err(CalcError::Domain(format!(
            "salinity must be a finite value >= 0, got {salinity}"
        )));
    }
    let t = t68_from_t90(temp_c);
    let a = B0 + (B1 + (B2 + (B3 + B4 * t) * t) * t) * t;
    let b = C0 + (C1 + C2 * t) * t;

    let rho = pure_water_density(temp_c)
        + a * salinity
        + b * salinity * salinity.sqrt()
        + D0 * salinity * salinity;
    Ok(rho / 1000.0)
}

/// Element-wise [`seawater_density`]. A slice of length 1 is broadcast
/// against the other argument.
pub fn seawater_density_all(salinity: &[f64], temps_c: &[f64]) -> CalcResult<Vec<f64>> {
    let n = broadcast_len(salinity.len(), temps_c.len())?;
    (0..n)
        .map(|i| {
            let s = salinity[if salinity.len() == 1 { 0 } else { i }];
            let t = temps_c[if temps_c.len() == 1 { 0 } else { i }];
            seawater_density(s, t)
        })
        .collect()
}

/// Mass (g) of a seawater sample dispensed by volume (mL) at `temp_c`.
pub fn sample_mass_from_volume(volume_ml: f64, salinity: f64, temp_c: f64) -> CalcResult<f64> {
    if !volume_ml.is_finite() || volume_ml <= 0.0 {
        return Err(CalcError::Domain(format!(
            "sample volume must be positive, got {volume_ml}"
        )));
    }
    Ok(volume_ml * seawater_density(salinity, temp_c)?)
}

fn broadcast_len(left: usize, right: usize) -> CalcResult<usize> {
    match (left, right) {
        (l, r) if l == r => Ok(l),
        (1, r) => Ok(r),
        (l, 1) => Ok(l),
        (l, r) => Err(CalcError::ShapeMismatch { left: l, right: r }),
    }
}
