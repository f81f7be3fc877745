pub mod adapters;
pub mod alkalinity;
pub mod chemistry;
pub mod density;
pub mod error;
pub mod models;
pub mod numerics;

pub use crate::alkalinity::{
    estimate_alkalinity, estimate_alkalinity_or_linear, estimate_alkalinity_with, gran_estimate,
};
pub use crate::chemistry::PhysicalConstants;
pub use crate::density::eos80::{
    pure_water_density, pure_water_density_all, sample_mass_from_volume, seawater_density,
    seawater_density_all,
};
pub use crate::error::{CalcError, CalcResult};
#[cfg(feature = "cli")]
pub use crate::error::AppError;
pub use crate::models::{
    AlkalinityResult, FitDiagnostics, FitMethod, FitOptions, TitrationSample, TitrationStep,
    TrisCalibration,
};
