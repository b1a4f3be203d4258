use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::logistic::loss_functions::{loss_from_margins, sigmoid};
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::monitor::Monitor;
use crate::numerical::optimization::solver_config::{
    CDConfig, OptimResult, SolverMethod, TerminationReason,
};
use log::{debug, info};
use nalgebra::DVector;

/// Cyclic coordinate descent state.
///
/// Keeps the margins `Xw + b` cached and updates them after every coordinate step
/// with `Xw += X_j * (w_j_new - w_j_old)`, so one step costs O(n_samples).
pub struct CoordinateDescent<'a> {
    problem: &'a LogRegProblem,
    coef: DVector<f64>,
    xw: DVector<f64>,
    // per-coordinate Lipschitz constants, intercept last
    lipschitz: Vec<f64>,
}

impl<'a> CoordinateDescent<'a> {
    pub fn new(problem: &'a LogRegProblem, w0: &DVector<f64>) -> Result<Self, LogRegError> {
        let xw = problem.margins(w0)?;
        let n_features = problem.n_features();
        let mut lipschitz = Vec::with_capacity(problem.n_params());
        for (j, col) in problem.X().column_iter().enumerate() {
            let L_j = col.norm_squared() / 4.0 + problem.lambd();
            if !(L_j > 0.0) {
                return Err(LogRegError::ZeroLipschitz { coordinate: Some(j) });
            }
            lipschitz.push(L_j);
        }
        if problem.fit_intercept() {
            // column of ones, unpenalized: step 4/n_samples
            lipschitz.push(problem.n_samples() as f64 / 4.0);
        }
        debug!(
            "coordinate Lipschitz constants: min = {:.3e}, max = {:.3e} over {} features",
            lipschitz.iter().cloned().fold(f64::INFINITY, f64::min),
            lipschitz.iter().cloned().fold(0.0, f64::max),
            n_features
        );
        Ok(Self {
            problem,
            coef: w0.clone(),
            xw,
            lipschitz,
        })
    }

    // partial derivative of the objective along coordinate j, from the cached margins
    fn partial_derivative(&self, j: usize) -> f64 {
        let column = self.problem.design().column(j);
        let y = self.problem.y();
        let mut g_j = 0.0;
        for i in 0..y.len() {
            g_j -= y[i] * column[i] * sigmoid(-y[i] * self.xw[i]);
        }
        if self.problem.is_penalized(j) {
            g_j += self.problem.lambd() * self.coef[j];
        }
        g_j
    }

    fn step(&mut self, j: usize) {
        let delta = -self.partial_derivative(j) / self.lipschitz[j];
        self.coef[j] += delta;
        self.xw.axpy(delta, &self.problem.design().column(j), 1.0);
    }

    /// One step `w_j <- w_j - g_j / L_j` on feature `j`
    pub fn update_coordinate(&mut self, j: usize) -> Result<(), LogRegError> {
        if j >= self.problem.n_features() {
            return Err(LogRegError::InvalidInput(format!(
                "coordinate {} out of range for {} features",
                j,
                self.problem.n_features()
            )));
        }
        self.step(j);
        Ok(())
    }

    /// One step `b <- b - 4/n_samples * g_b` on the intercept, no-op when the intercept is not fitted
    pub fn update_intercept(&mut self) {
        if self.problem.fit_intercept() {
            self.step(self.problem.n_features());
        }
    }

    /// all features in order, then the intercept
    pub fn sweep(&mut self) {
        for j in 0..self.problem.n_features() {
            self.step(j);
        }
        self.update_intercept();
    }

    /// cached margins `Xw + b`
    pub fn cached_xw(&self) -> &DVector<f64> {
        &self.xw
    }

    pub fn coef(&self) -> &DVector<f64> {
        &self.coef
    }

    pub fn objective(&self) -> Result<f64, LogRegError> {
        loss_from_margins(self.problem, &self.xw, &self.coef)
    }

    pub fn into_coef(self) -> DVector<f64> {
        self.coef
    }
}

/// Cyclic coordinate descent from zero, objective recorded after every sweep
pub fn coordinate_descent(
    problem: &LogRegProblem,
    config: &CDConfig,
    monitor: &mut dyn Monitor,
) -> Result<OptimResult, LogRegError> {
    let mut cd = CoordinateDescent::new(problem, &problem.zeros())?;
    info!("coordinate descent: {} sweeps", config.n_iter);
    let mut pobj = Vec::with_capacity(config.n_iter);
    for k in 0..config.n_iter {
        cd.sweep();
        let f = cd.objective()?;
        monitor.record(k, f);
        pobj.push(f);
    }
    Ok(OptimResult::new(
        problem,
        cd.into_coef(),
        pobj,
        config.n_iter,
        TerminationReason::IterationsCompleted,
        SolverMethod::CoordinateDescent,
    ))
}
