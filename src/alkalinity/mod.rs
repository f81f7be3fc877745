//! Total alkalinity from open-cell potentiometric titrations (Gran estimate
//! refined by a non-linear least-squares fit).
pub mod estimator;

pub use estimator::{
    estimate_alkalinity, estimate_alkalinity_or_linear, estimate_alkalinity_with, gran_estimate,
};
