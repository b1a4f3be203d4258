use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::logistic::loss_functions::{gradient, loss};
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::monitor::Monitor;
use crate::numerical::optimization::solver_config::{
    GDConfig, OptimResult, SolverMethod, TerminationReason,
};
use crate::somelinalg::linear_sys_diagnostics::spectral_norm_squared;
use log::{info, warn};
use nalgebra::DVector;

/// Lipschitz constant of the gradient: `||X||_2^2 / 4 + lambd`.
/// The logistic curvature sigma'(z) never exceeds 1/4; the design includes the intercept column when fitted.
pub fn lipschitz_logreg(problem: &LogRegProblem) -> f64 {
    spectral_norm_squared(problem.design()) / 4.0 + problem.lambd()
}

/// Batch gradient descent `w <- w - step * grad f(w)` for a fixed number of iterations
pub fn gradient_descent(
    problem: &LogRegProblem,
    w0: &DVector<f64>,
    config: &GDConfig,
    monitor: &mut dyn Monitor,
) -> Result<OptimResult, LogRegError> {
    problem.check_params(w0)?;
    let L = lipschitz_logreg(problem);
    if !(L > 0.0) {
        return Err(LogRegError::ZeroLipschitz { coordinate: None });
    }
    let step = config.step.unwrap_or(1.0 / L);
    if !(step.is_finite() && step > 0.0) {
        return Err(LogRegError::InvalidInput(format!(
            "step size must be positive and finite, got {}",
            step
        )));
    }
    if step > 2.0 / L {
        warn!(
            "step {:.3e} exceeds 2/L = {:.3e}, gradient descent may diverge",
            step,
            2.0 / L
        );
    }
    info!(
        "gradient descent: L = {:.6e}, step = {:.6e}, iterations = {}",
        L, step, config.n_iter
    );

    let mut w = w0.clone();
    let mut pobj = Vec::with_capacity(config.n_iter);
    for k in 0..config.n_iter {
        let grad = gradient(problem, &w)?;
        w.axpy(-step, &grad, 1.0);
        let f = loss(problem, &w)?;
        monitor.record(k, f);
        pobj.push(f);
    }
    Ok(OptimResult::new(
        problem,
        w,
        pobj,
        config.n_iter,
        TerminationReason::IterationsCompleted,
        SolverMethod::GradientDescent,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Examples::synthetic_data::random_design;
    use crate::numerical::optimization::monitor::{NoMonitor, ObjectiveTrace};
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn test_lipschitz_constant() {
        // orthogonal columns with norms 2 and 1: ||X||^2 = 4
        let X = DMatrix::from_row_slice(3, 2, &[2.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let y = DVector::from_vec(vec![1.0, -1.0, 1.0]);
        let p = LogRegProblem::new(X, y, 0.5, false).unwrap();
        assert_relative_eq!(lipschitz_logreg(&p), 4.0 / 4.0 + 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_step_one_over_L_does_not_diverge() {
        let (X, y) = random_design(100, 4, 21);
        let p = LogRegProblem::new(X, y, 0.1, true).unwrap();
        let mut trace = ObjectiveTrace::new("gd");
        let config = GDConfig {
            n_iter: 300,
            step: None,
        };
        let res = gradient_descent(&p, &p.zeros(), &config, &mut trace).unwrap();
        assert_eq!(res.pobj.len(), 300);
        assert_eq!(trace.objectives, res.pobj);
        let f0 = loss(&p, &p.zeros()).unwrap();
        assert!(res.pobj[0] <= f0);
        assert!(trace.is_non_increasing(1e-12));
    }

    #[test]
    fn test_step_above_two_over_L_diverges() {
        // strong ridge term: the objective is almost quadratic with curvature close to L
        let (X, y) = random_design(30, 3, 8);
        let X = X * 0.1;
        let p = LogRegProblem::new(X, y, 50.0, false).unwrap();
        let L = lipschitz_logreg(&p);
        let config = GDConfig {
            n_iter: 20,
            step: Some(2.5 / L),
        };
        let w0 = DVector::from_element(3, 1.0);
        let res = gradient_descent(&p, &w0, &config, &mut NoMonitor).unwrap();
        let increases = res.pobj.windows(2).filter(|pair| pair[1] > pair[0]).count();
        assert!(increases >= 1);
        assert!(res.pobj.last().unwrap() > &res.pobj[0]);
    }

    #[test]
    fn test_zero_design_without_ridge_has_zero_lipschitz() {
        let X = DMatrix::zeros(4, 2);
        let y = DVector::from_vec(vec![1.0, -1.0, 1.0, -1.0]);
        let p = LogRegProblem::new(X, y, 0.0, false).unwrap();
        let err = gradient_descent(&p, &p.zeros(), &GDConfig::default(), &mut NoMonitor)
            .unwrap_err();
        assert_eq!(err, LogRegError::ZeroLipschitz { coordinate: None });
    }
}
