//! Least-squares primitives used by the titration fit.
//!
//! - [`linear_regression`]: ordinary least squares for `y = intercept + slope·x`
//! - [`levenberg_marquardt`]: damped Gauss-Newton for models with two free
//!   parameters and a forward-difference Jacobian
//!
//! Both solve 2x2 normal equations directly; there is no general matrix layer.

use crate::error::{CalcError, CalcResult};

/// Determinant magnitude below which a 2x2 system is treated as singular.
const DET_MIN: f64 = 1e-300;
/// Relative step used for the finite-difference Jacobian.
const JACOBIAN_STEP: f64 = 1e-8;
/// Damping growth/shrink factor between trial steps.
const LAMBDA_FACTOR: f64 = 10.0;
/// Damping beyond which no descent direction is considered reachable.
const LAMBDA_MAX: f64 = 1e16;

/// Fitted line `y = intercept + slope·x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

/// Ordinary least squares fit of `y` on `x`.
///
/// Sums are taken about the means to keep large abscissae well conditioned.
///
/// # Errors
/// - [`CalcError::ShapeMismatch`] if `x` and `y` differ in length
/// - [`CalcError::InsufficientData`] for fewer than two points, or when all
///   `x` are identical (the slope is undetermined)
pub fn linear_regression(x: &[f64], y: &[f64]) -> CalcResult<LinearFit> {
    if x.len() != y.len() {
        return Err(CalcError::ShapeMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(CalcError::InsufficientData {
            available: n,
            required: 2,
        });
    }
    let x_mean = x.iter().sum::<f64>() / n as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let (sxx, sxy) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxx, sxy), (&xi, &yi)| {
            let dx = xi - x_mean;
            (sxx + dx * dx, sxy + dx * (yi - y_mean))
        });

    if !sxx.is_finite() || sxx <= 0.0 {
        // all abscissae coincide
        return Err(CalcError::InsufficientData {
            available: 1,
            required: 2,
        });
    }
    let slope = sxy / sxx;
    Ok(LinearFit {
        intercept: y_mean - slope * x_mean,
        slope,
    })
}

/// Stopping rules for [`levenberg_marquardt`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LmSettings {
    /// Maximum number of accepted iterations.
    pub max_iter: usize,
    /// Relative parameter-step tolerance.
    pub tol: f64,
    /// Initial damping factor.
    pub lambda0: f64,
}

impl Default for LmSettings {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-10,
            lambda0: 1e-3,
        }
    }
}

/// Converged two-parameter fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LmFit {
    pub params: [f64; 2],
    pub iterations: usize,
    /// Residual sum of squares at `params`.
    pub ssr: f64,
}

/// Levenberg-Marquardt least squares for a two-parameter model.
///
/// `model(p, i)` predicts observation `i` for parameters `p`; the fit
/// minimizes `Σ (observed[i] - model(p, i))²` starting from `initial`.
/// `admissible(p)` rejects trial points outside the model's domain (for
/// example a scale factor that must stay positive).
///
/// # Errors
/// [`CalcError::Convergence`] when `max_iter` is exceeded, the residuals stop
/// being finite, or no trial step lowers the residual sum of squares.
pub fn levenberg_marquardt<M, A>(
    observed: &[f64],
    initial: [f64; 2],
    settings: &LmSettings,
    model: M,
    admissible: A,
) -> CalcResult<LmFit>
where
    M: Fn(&[f64; 2], usize) -> f64,
    A: Fn(&[f64; 2]) -> bool,
{
    let ssr = |p: &[f64; 2]| -> f64 {
        observed
            .iter()
            .enumerate()
            .map(|(i, &obs)| {
                let r = obs - model(p, i);
                r * r
            })
            .sum()
    };

    let mut p = initial;
    let mut current = ssr(&p);
    if !current.is_finite() {
        return Err(CalcError::Convergence {
            iterations: 0,
            reason: "residuals are not finite at the initial guess".into(),
        });
    }
    let mut lambda = settings.lambda0;

    for iter in 1..=settings.max_iter {
        // Normal equations J^T J and gradient J^T r.
        let (mut a11, mut a12, mut a22, mut g1, mut g2) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for (i, &obs) in observed.iter().enumerate() {
            let base = model(&p, i);
            let r = obs - base;
            let mut jac = [0.0; 2];
            for (j, dj) in jac.iter_mut().enumerate() {
                let h = JACOBIAN_STEP * p[j].abs().max(JACOBIAN_STEP);
                let mut q = p;
                q[j] += h;
                *dj = (model(&q, i) - base) / h;
            }
            a11 += jac[0] * jac[0];
            a12 += jac[0] * jac[1];
            a22 += jac[1] * jac[1];
            g1 += jac[0] * r;
            g2 += jac[1] * r;
        }

        let mut accepted = None;
        while lambda <= LAMBDA_MAX {
            let damped = solve_2x2(a11 * (1.0 + lambda), a12, a22 * (1.0 + lambda), g1, g2);
            if let Some(step) = damped {
                let trial = [p[0] + step[0], p[1] + step[1]];
                if admissible(&trial) {
                    let trial_ssr = ssr(&trial);
                    if trial_ssr.is_finite() && trial_ssr <= current {
                        lambda = (lambda / LAMBDA_FACTOR).max(f64::MIN_POSITIVE);
                        accepted = Some((trial, trial_ssr, step));
                        break;
                    }
                }
            }
            lambda *= LAMBDA_FACTOR;
        }

        let Some((trial, trial_ssr, step)) = accepted else {
            return Err(CalcError::Convergence {
                iterations: iter,
                reason: "no step reduces the residual sum of squares".into(),
            });
        };

        let converged = step
            .iter()
            .zip(&p)
            .all(|(d, pj)| d.abs() <= settings.tol * (pj.abs() + settings.tol));
        p = trial;
        current = trial_ssr;
        log::trace!("lm iteration {iter}: p = {p:?}, ssr = {current:e}, lambda = {lambda:e}");

        if converged {
            return Ok(LmFit {
                params: p,
                iterations: iter,
                ssr: current,
            });
        }
    }

    Err(CalcError::Convergence {
        iterations: settings.max_iter,
        reason: "iteration limit reached".into(),
    })
}

/// Solve the symmetric system `[a11 a12; a12 a22] x = [b1 b2]`.
fn solve_2x2(a11: f64, a12: f64, a22: f64, b1: f64, b2: f64) -> Option<[f64; 2]> {
    let det = a11 * a22 - a12 * a12;
    if !det.is_finite() || det.abs() < DET_MIN {
        return None;
    }
    Some([(b1 * a22 - a12 * b2) / det, (a11 * b2 - a12 * b1) / det])
}
