use gsw as gsw_teos10;

use crate::error::{CalcError, CalcResult};

/// Reference Salinity SR (g/kg) from Practical Salinity.
///
/// SR stands in for Absolute Salinity: the composition anomaly is ignored, so
/// SA = SR for standard seawater.
pub fn sr_from_sp(sp: f64) -> f64 {
    gsw_teos10::conversions::sr_from_sp(sp)
}

/// TEOS-10 density (kg/m³) at zero gauge pressure, for comparison with the
/// EOS-80 polynomial.
///
/// At the surface potential temperature equals in-situ temperature, so
/// Conservative Temperature is derived from `temp_c` as a potential
/// temperature. CT differs from θ by more than 1 °C in fresh water.
///
/// # Errors
/// [`CalcError::Domain`] for negative salinity or if `gsw` rejects the state.
pub fn rho_surface(sp: f64, temp_c: f64) -> CalcResult<f64> {
    if !sp.is_finite() || sp < 0.0 {
        return Err(CalcError::Domain(format!(
            "salinity must be a finite value >= 0, got {sp}"
        )));
    }
    let undefined = |_| {
        CalcError::Domain(format!(
            "TEOS-10 density undefined for SP = {sp}, t = {temp_c} °C"
        ))
    };
    let sa = sr_from_sp(sp);
    let ct = gsw_teos10::conversions::ct_from_pt(sa, temp_c).map_err(undefined)?;
    gsw_teos10::volume::rho(sa, ct, 0.0).map_err(undefined)
}
