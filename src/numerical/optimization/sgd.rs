use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::logistic::loss_functions::{loss, sample_gradient};
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::monitor::Monitor;
use crate::numerical::optimization::solver_config::{
    OptimResult, SGDConfig, SolverMethod, StepSchedule, TerminationReason,
};
use log::info;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `count` sample indices drawn uniformly with replacement from `0..n_samples`
pub fn draw_indices(n_samples: usize, count: usize, seed: Option<u64>) -> Vec<usize> {
    match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..count).map(|_| rng.random_range(0..n_samples)).collect()
        }
        None => {
            let mut rng = rand::rng();
            (0..count).map(|_| rng.random_range(0..n_samples)).collect()
        }
    }
}

fn step_size(schedule: StepSchedule, step0: f64, t: usize) -> f64 {
    match schedule {
        StepSchedule::Constant => step0,
        StepSchedule::InverseSqrt => step0 / ((t + 1) as f64).sqrt(),
    }
}

/// Stochastic gradient descent.
///
/// Performs one update `w <- w - step_t * g_i(w)` per entry of `indices`; when no indices are given,
/// `n_iter * n_samples` of them are drawn uniformly with replacement. The objective is evaluated once
/// per epoch, i.e. every `n_samples` updates.
pub fn sgd(
    problem: &LogRegProblem,
    w0: &DVector<f64>,
    indices: Option<&[usize]>,
    config: &SGDConfig,
    monitor: &mut dyn Monitor,
) -> Result<OptimResult, LogRegError> {
    problem.check_params(w0)?;
    if !(config.step0.is_finite() && config.step0 > 0.0) {
        return Err(LogRegError::InvalidInput(format!(
            "step0 must be positive and finite, got {}",
            config.step0
        )));
    }
    let n_samples = problem.n_samples();
    let drawn;
    let iis: &[usize] = match indices {
        Some(iis) => {
            if let Some(&bad) = iis.iter().find(|&&i| i >= n_samples) {
                return Err(LogRegError::InvalidInput(format!(
                    "sample index {} out of range for {} samples",
                    bad, n_samples
                )));
            }
            iis
        }
        None => {
            drawn = draw_indices(n_samples, config.n_iter * n_samples, config.seed);
            &drawn
        }
    };
    info!(
        "stochastic gradient descent: {} updates, step0 = {}, schedule = {}",
        iis.len(),
        config.step0,
        config.schedule
    );

    let mut w = w0.clone();
    let mut pobj = Vec::with_capacity(iis.len() / n_samples + 1);
    for (t, &i) in iis.iter().enumerate() {
        let grad_i = sample_gradient(problem, &w, i)?;
        w.axpy(-step_size(config.schedule, config.step0, t), &grad_i, 1.0);
        if (t + 1) % n_samples == 0 {
            let f = loss(problem, &w)?;
            monitor.record(pobj.len(), f);
            pobj.push(f);
        }
    }
    let epochs = pobj.len();
    Ok(OptimResult::new(
        problem,
        w,
        pobj,
        epochs,
        TerminationReason::IterationsCompleted,
        SolverMethod::SGD,
    ))
}
