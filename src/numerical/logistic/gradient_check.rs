use crate::numerical::logistic::dual_numbers::ad_gradient;
use crate::numerical::logistic::logreg_errors::{LogRegError, ensure_finite};
use crate::numerical::logistic::loss_functions::{gradient, loss};
use crate::numerical::logistic::problem::LogRegProblem;
use log::{info, warn};
use nalgebra::DVector;
use rayon::prelude::*;

/// default tolerance for agreement of analytic and reference gradients
pub const GRAD_CHECK_TOL: f64 = 1e-5;

/// Central finite-difference approximation of the gradient of `f` at `w`.
/// Step for coordinate j is `h * max(1, |w_j|)`; coordinates are evaluated in parallel.
pub fn approx_fprime<F>(f: &F, w: &DVector<f64>, h: f64) -> DVector<f64>
where
    F: Fn(&DVector<f64>) -> f64 + Sync,
{
    let n = w.len();
    let partials: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|j| {
            let step = h * w[j].abs().max(1.0);
            let mut w_plus = w.clone();
            w_plus[j] += step;
            let mut w_minus = w.clone();
            w_minus[j] -= step;
            (f(&w_plus) - f(&w_minus)) / (2.0 * step)
        })
        .collect();
    DVector::from_vec(partials)
}

/// Euclidean norm of the difference between `grad(w0)` and the central finite-difference
/// gradient of `f` at `w0`
pub fn check_grad_fn<F, G>(f: &F, grad: &G, w0: &DVector<f64>) -> f64
where
    F: Fn(&DVector<f64>) -> f64 + Sync,
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    // cube root of machine epsilon balances truncation against rounding for central differences
    let h = f64::EPSILON.cbrt();
    let numerical = approx_fprime(f, w0, h);
    (grad(w0) - numerical).norm()
}

/// Gradient check of the regularized logistic loss against central finite differences
pub fn check_grad(problem: &LogRegProblem, w0: &DVector<f64>) -> Result<f64, LogRegError> {
    problem.check_params(w0)?;
    let analytic = gradient(problem, w0)?;
    let f = |w: &DVector<f64>| loss(problem, w).unwrap_or(f64::NAN);
    let numerical = approx_fprime(&f, w0, f64::EPSILON.cbrt());
    ensure_finite(numerical.as_slice(), "finite-difference gradient")?;
    Ok((analytic - numerical).norm())
}

/// Gradient check of the regularized logistic loss against forward-mode automatic differentiation
pub fn check_grad_ad(problem: &LogRegProblem, w0: &DVector<f64>) -> Result<f64, LogRegError> {
    let analytic = gradient(problem, w0)?;
    let ad = ad_gradient(problem, w0)?;
    Ok((analytic - ad).norm())
}

/// Both checks at one point
#[derive(Debug, Clone)]
pub struct GradientCheckReport {
    pub analytic: DVector<f64>,
    pub finite_difference: DVector<f64>,
    pub automatic: DVector<f64>,
    pub fd_error: f64,
    pub ad_error: f64,
}

impl GradientCheckReport {
    pub fn passed(&self, tol: f64) -> bool {
        self.fd_error < tol && self.ad_error < tol
    }
}

pub fn gradient_check_report(
    problem: &LogRegProblem,
    w0: &DVector<f64>,
) -> Result<GradientCheckReport, LogRegError> {
    let analytic = gradient(problem, w0)?;
    let f = |w: &DVector<f64>| loss(problem, w).unwrap_or(f64::NAN);
    let finite_difference = approx_fprime(&f, w0, f64::EPSILON.cbrt());
    ensure_finite(finite_difference.as_slice(), "finite-difference gradient")?;
    let automatic = ad_gradient(problem, w0)?;
    let fd_error = (&analytic - &finite_difference).norm();
    let ad_error = (&analytic - &automatic).norm();
    if fd_error < GRAD_CHECK_TOL && ad_error < GRAD_CHECK_TOL {
        info!(
            "gradient check passed: finite differences {:.3e}, automatic differentiation {:.3e}",
            fd_error, ad_error
        );
    } else {
        warn!(
            "gradient check failed: finite differences {:.3e}, automatic differentiation {:.3e}",
            fd_error, ad_error
        );
    }
    Ok(GradientCheckReport {
        analytic,
        finite_difference,
        automatic,
        fd_error,
        ad_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Examples::synthetic_data::{random_design, random_vector};
    use approx::assert_relative_eq;

    #[test]
    fn test_approx_fprime_quadratic() {
        let f = |w: &DVector<f64>| w[0] * w[0] + 3.0 * w[0] * w[1];
        let w = DVector::from_vec(vec![1.5, -2.0]);
        let g = approx_fprime(&f, &w, 1e-5);
        assert_relative_eq!(g[0], 2.0 * 1.5 + 3.0 * -2.0, epsilon = 1e-7);
        assert_relative_eq!(g[1], 3.0 * 1.5, epsilon = 1e-7);
    }

    #[test]
    fn test_check_grad_fn_detects_wrong_gradient() {
        let f = |w: &DVector<f64>| w.norm_squared();
        let good = |w: &DVector<f64>| w * 2.0;
        let bad = |w: &DVector<f64>| w * 3.0;
        let w = DVector::from_vec(vec![0.4, -1.0, 2.0]);
        assert!(check_grad_fn(&f, &good, &w) < 1e-7);
        assert!(check_grad_fn(&f, &bad, &w) > 1.0);
    }

    #[test]
    fn test_gradient_matches_finite_differences_and_automatic_differentiation() {
        for seed in [0_u64, 1, 2] {
            for lambd in [0.0, 0.1] {
                for fit_intercept in [false, true] {
                    let (X, y) = random_design(50, 5, seed);
                    let p = LogRegProblem::new(X, y, lambd, fit_intercept).unwrap();
                    let w0 = random_vector(p.n_params(), seed + 100);
                    let fd_err = check_grad(&p, &w0).unwrap();
                    let ad_err = check_grad_ad(&p, &w0).unwrap();
                    assert!(
                        fd_err < GRAD_CHECK_TOL && ad_err < GRAD_CHECK_TOL,
                        "seed {} lambda {} intercept {}: finite differences {}, automatic {}",
                        seed,
                        lambd,
                        fit_intercept,
                        fd_err,
                        ad_err
                    );
                }
            }
        }
    }

    #[test]
    fn test_report() {
        let (X, y) = random_design(30, 3, 11);
        let p = LogRegProblem::new(X, y, 0.1, false).unwrap();
        let w0 = random_vector(3, 12);
        let report = gradient_check_report(&p, &w0).unwrap();
        assert!(report.passed(GRAD_CHECK_TOL));
        assert_eq!(report.automatic.len(), 3);
    }

    #[test]
    fn test_check_grad_shape_error() {
        let (X, y) = random_design(10, 3, 0);
        let p = LogRegProblem::new(X, y, 0.1, false).unwrap();
        assert!(check_grad(&p, &DVector::zeros(4)).is_err());
    }
}
