use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::logistic::loss_functions::loss_and_gradient;
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::monitor::Monitor;
use crate::numerical::optimization::solver_config::{
    LBFGSConfig, OptimResult, SolverMethod, TerminationReason,
};
use log::{debug, info, warn};
use nalgebra::DVector;
use std::collections::VecDeque;

const ARMIJO_C1: f64 = 1e-4;
const BACKTRACK: f64 = 0.5;
// correction pairs with smaller curvature s^T y are skipped
const CURVATURE_EPS: f64 = 1e-10;

/// stored correction pair s = x_{k+1} - x_k, y = g_{k+1} - g_k, rho = 1 / (y^T s)
struct CorrectionPair {
    s: DVector<f64>,
    y: DVector<f64>,
    rho: f64,
}

/// L-BFGS two-loop recursion: returns the search direction -H_k g
fn two_loop_direction(history: &VecDeque<CorrectionPair>, grad: &DVector<f64>) -> DVector<f64> {
    let mut q = grad.clone();
    if history.is_empty() {
        return -q;
    }
    let mut alpha = vec![0.0; history.len()];
    for (i, pair) in history.iter().enumerate().rev() {
        alpha[i] = pair.rho * pair.s.dot(&q);
        q.axpy(-alpha[i], &pair.y, 1.0);
    }
    // initial Hessian approximation gamma * I
    let last = &history[history.len() - 1];
    let gamma = last.s.dot(&last.y) / last.y.norm_squared();
    q *= gamma;
    for (i, pair) in history.iter().enumerate() {
        let beta = pair.rho * pair.y.dot(&q);
        q.axpy(alpha[i] - beta, &pair.s, 1.0);
    }
    -q
}

/// Limited-memory BFGS with backtracking (Armijo) line search.
///
/// Stops when `max |g_i| <= pgtol`, when the relative decrease of the objective
/// `(f_k - f_{k+1}) / max(|f_k|, |f_{k+1}|, 1)` drops to `factr * eps`, or after `max_iter` iterations.
pub fn lbfgs(
    problem: &LogRegProblem,
    w0: &DVector<f64>,
    config: &LBFGSConfig,
    monitor: &mut dyn Monitor,
) -> Result<OptimResult, LogRegError> {
    if config.history_size == 0 {
        return Err(LogRegError::InvalidInput(
            "L-BFGS history size must be positive".to_string(),
        ));
    }
    let mut x = w0.clone();
    let (mut f, mut g) = loss_and_gradient(problem, &x)?;
    let mut history: VecDeque<CorrectionPair> = VecDeque::with_capacity(config.history_size);
    let mut pobj = Vec::new();
    let mut termination = TerminationReason::MaxIterationsReached;
    let mut k = 0;
    while k < config.max_iter {
        if g.amax() <= config.pgtol {
            termination = TerminationReason::GradientTolerance;
            break;
        }
        let mut direction = two_loop_direction(&history, &g);
        let mut slope = g.dot(&direction);
        if !(slope < 0.0) {
            warn!("L-BFGS direction is not a descent direction, history reset");
            history.clear();
            direction = -&g;
            slope = -g.norm_squared();
        }
        // first step is scaled so that it has unit length
        let mut t = if history.is_empty() {
            (1.0 / g.norm()).min(1.0)
        } else {
            1.0
        };
        let mut accepted = None;
        for _ in 0..config.max_linesearch {
            let x_trial = &x + &direction * t;
            match loss_and_gradient(problem, &x_trial) {
                Ok((f_trial, g_trial)) if f_trial <= f + ARMIJO_C1 * t * slope => {
                    accepted = Some((x_trial, f_trial, g_trial));
                    break;
                }
                // overflow far along the direction is handled as a failed trial
                Ok(_) | Err(LogRegError::NumericOverflow(_)) => t *= BACKTRACK,
                Err(e) => return Err(e),
            }
        }
        let (x_new, f_new, g_new) = match accepted {
            Some(step) => step,
            None => {
                termination = TerminationReason::LineSearchFailed;
                debug!("line search failed at iteration {}", k);
                break;
            }
        };
        let s = &x_new - &x;
        let y = &g_new - &g;
        let sy = s.dot(&y);
        if sy > CURVATURE_EPS {
            if history.len() == config.history_size {
                history.pop_front();
            }
            history.push_back(CorrectionPair { s, y, rho: 1.0 / sy });
        }
        let rel_decrease = (f - f_new) / f.abs().max(f_new.abs()).max(1.0);
        x = x_new;
        f = f_new;
        g = g_new;
        monitor.record(k, f);
        pobj.push(f);
        k += 1;
        if rel_decrease <= config.factr * f64::EPSILON {
            termination = TerminationReason::ObjectiveTolerance;
            break;
        }
    }
    if pobj.is_empty() {
        // already optimal at w0
        monitor.record(0, f);
        pobj.push(f);
    }
    info!(
        "L-BFGS finished after {} iterations: objective = {}, max |g| = {:.3e}, {:?}",
        k,
        f,
        g.amax(),
        termination
    );
    Ok(OptimResult::new(problem, x, pobj, k, termination, SolverMethod::LBFGS))
}
