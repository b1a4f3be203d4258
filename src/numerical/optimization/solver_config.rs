use crate::numerical::logistic::problem::LogRegProblem;
use crate::somelinalg::linear_solvers::LinearSysMethod;
use nalgebra::DVector;
use strum_macros::{Display, EnumIter, EnumString};

/// Enum to represent the available solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum SolverMethod {
    #[strum(to_string = "lbfgs", serialize = "l-bfgs")]
    LBFGS,
    #[strum(serialize = "newton")]
    Newton,
    #[strum(to_string = "gd", serialize = "gradient_descent")]
    GradientDescent,
    #[strum(serialize = "sgd")]
    SGD,
    #[strum(to_string = "cd", serialize = "coordinate_descent")]
    CoordinateDescent,
}

/// Configuration parameters for L-BFGS
#[derive(Debug, Clone)]
pub struct LBFGSConfig {
    pub history_size: usize, // number of stored correction pairs
    pub max_iter: usize,     // maximum number of iterations
    pub pgtol: f64,          // stop when max |g_i| <= pgtol
    pub factr: f64, // stop when relative decrease of the objective <= factr * machine epsilon
    pub max_linesearch: usize, // maximum backtracking steps per iteration
}

impl Default for LBFGSConfig {
    fn default() -> Self {
        Self {
            history_size: 10,
            max_iter: 15000,
            pgtol: 1e-5,
            factr: 1e7,
            max_linesearch: 30,
        }
    }
}

/// Configuration parameters for Newton's method
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    pub max_iter: usize, // number of Newton steps
    /// Stop early when the Newton step norm drops below this value. `None` keeps the
    /// fixed iteration count.
    pub tol: Option<f64>,
    pub linear_sys_method: LinearSysMethod,
    /// warn when the Hessian condition number exceeds this value (None: no check)
    pub cond_threshold: Option<f64>,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iter: 20,
            tol: None,
            linear_sys_method: LinearSysMethod::Cholesky,
            cond_threshold: None,
        }
    }
}

/// Configuration parameters for batch gradient descent
#[derive(Debug, Clone)]
pub struct GDConfig {
    pub n_iter: usize,
    /// fixed step; `None` means 1/L with L the Lipschitz constant of the gradient
    pub step: Option<f64>,
}

impl Default for GDConfig {
    fn default() -> Self {
        Self {
            n_iter: 100,
            step: None,
        }
    }
}

/// step size rule for stochastic gradient descent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum StepSchedule {
    /// step0 at every iteration
    #[default]
    #[strum(serialize = "constant")]
    Constant,
    /// step0 / sqrt(t + 1)
    #[strum(serialize = "inv_sqrt")]
    InverseSqrt,
}

/// Configuration parameters for stochastic gradient descent
#[derive(Debug, Clone)]
pub struct SGDConfig {
    pub n_iter: usize, // number of epochs, n_iter * n_samples updates
    pub step0: f64,
    pub schedule: StepSchedule,
    /// seed of the index generator; `None` draws from the thread generator
    pub seed: Option<u64>,
}

impl Default for SGDConfig {
    fn default() -> Self {
        Self {
            n_iter: 30,
            step0: 1e-1,
            schedule: StepSchedule::Constant,
            seed: None,
        }
    }
}

/// Configuration parameters for coordinate descent
#[derive(Debug, Clone)]
pub struct CDConfig {
    pub n_iter: usize, // number of full sweeps
}

impl Default for CDConfig {
    fn default() -> Self {
        Self { n_iter: 200 }
    }
}

/// Termination reasons for the solvers
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationReason {
    /// the requested number of iterations (epochs, sweeps) was performed
    IterationsCompleted,
    /// gradient norm below tolerance
    GradientTolerance,
    /// relative decrease of the objective below tolerance
    ObjectiveTolerance,
    /// step norm below tolerance
    StepTolerance,
    /// maximum number of iterations reached before any tolerance was met
    MaxIterationsReached,
    /// line search could not decrease the objective
    LineSearchFailed,
}

/// Result of a solver run
#[derive(Debug, Clone)]
pub struct OptimResult {
    /// full coefficient vector, intercept last when fitted
    pub coef: DVector<f64>,
    pub w: DVector<f64>,
    pub intercept: Option<f64>,
    /// objective value after every iteration (epoch for SGD, sweep for coordinate descent)
    pub pobj: Vec<f64>,
    pub iterations: usize,
    pub termination: TerminationReason,
    pub method: SolverMethod,
}

impl OptimResult {
    pub fn new(
        problem: &LogRegProblem,
        coef: DVector<f64>,
        pobj: Vec<f64>,
        iterations: usize,
        termination: TerminationReason,
        method: SolverMethod,
    ) -> Self {
        let (w, intercept) = problem.split(&coef);
        Self {
            coef,
            w,
            intercept,
            pobj,
            iterations,
            termination,
            method,
        }
    }

    pub fn final_objective(&self) -> Option<f64> {
        self.pobj.last().copied()
    }

    /// Decision boundary `x2 = slope * x1 + offset` of a two-feature model, None if w2 == 0
    pub fn decision_boundary(&self) -> Option<(f64, f64)> {
        if self.w.len() != 2 || self.w[1] == 0.0 {
            return None;
        }
        let b = self.intercept.unwrap_or(0.0);
        Some((-self.w[0] / self.w[1], -b / self.w[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_method_names() {
        assert_eq!(SolverMethod::from_str("Newton").unwrap(), SolverMethod::Newton);
        assert_eq!(SolverMethod::from_str("l-bfgs").unwrap(), SolverMethod::LBFGS);
        assert_eq!(
            SolverMethod::from_str("coordinate_descent").unwrap(),
            SolverMethod::CoordinateDescent
        );
        assert!(SolverMethod::from_str("adam").is_err());
        assert_eq!(SolverMethod::GradientDescent.to_string(), "gd");
        assert_eq!(SolverMethod::iter().count(), 5);
        assert_eq!(StepSchedule::from_str("inv_sqrt").unwrap(), StepSchedule::InverseSqrt);
    }

    #[test]
    fn test_decision_boundary() {
        let X = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let y = DVector::from_vec(vec![1.0, -1.0]);
        let p = LogRegProblem::new(X, y, 0.1, true).unwrap();
        let res = OptimResult::new(
            &p,
            DVector::from_vec(vec![2.0, 4.0, -8.0]),
            vec![1.0, 0.5],
            2,
            TerminationReason::IterationsCompleted,
            SolverMethod::Newton,
        );
        assert_eq!(res.decision_boundary(), Some((-0.5, 2.0)));
        assert_eq!(res.final_objective(), Some(0.5));
    }
}
