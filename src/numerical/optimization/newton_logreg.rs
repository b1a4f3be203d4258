use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::logistic::loss_functions::{gradient, hessian, loss};
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::monitor::Monitor;
use crate::numerical::optimization::solver_config::{
    NewtonConfig, OptimResult, SolverMethod, TerminationReason,
};
use crate::somelinalg::linear_solvers::solve_linear_system;
use crate::somelinalg::linear_sys_diagnostics::poorly_conditioned;
use log::{debug, error, info};

/// Newton's method `w <- w - H^{-1} g` started from zero.
///
/// Runs exactly `config.max_iter` steps unless `config.tol` is set, in which case it stops as soon
/// as the norm of the Newton step is below the tolerance. There is no line search.
pub fn newton_logistic(
    problem: &LogRegProblem,
    config: &NewtonConfig,
    monitor: &mut dyn Monitor,
) -> Result<OptimResult, LogRegError> {
    let mut w = problem.zeros();
    let mut pobj = Vec::with_capacity(config.max_iter);
    let mut termination = TerminationReason::IterationsCompleted;
    let mut iterations = 0;
    for k in 0..config.max_iter {
        let grad = gradient(problem, &w)?;
        let hess = hessian(problem, &w)?;
        if let Some(threshold) = config.cond_threshold {
            poorly_conditioned(&hess, threshold);
        }
        let delta = match solve_linear_system(config.linear_sys_method, &hess, &grad) {
            Some(delta) => delta,
            None => {
                error!(
                    "Newton step failed at iteration {}: {} solve of the Hessian",
                    k, config.linear_sys_method
                );
                return Err(LogRegError::SingularHessian { iteration: k });
            }
        };
        w -= &delta;
        let f = loss(problem, &w)?;
        monitor.record(k, f);
        pobj.push(f);
        iterations = k + 1;
        let step_norm = delta.norm();
        debug!("iteration = {}, objective = {}, step = {:.3e}", k, f, step_norm);
        if let Some(tol) = config.tol {
            if step_norm < tol {
                termination = TerminationReason::StepTolerance;
                break;
            }
        }
    }
    if let Some(f_min) = pobj.last() {
        info!("Global minimum : {}", f_min);
    }
    Ok(OptimResult::new(
        problem,
        w,
        pobj,
        iterations,
        termination,
        SolverMethod::Newton,
    ))
}
