use crate::Utils::logger::{init_logger, parse_loglevel, save_trace_to_csv};
use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::coordinate_descent::coordinate_descent;
use crate::numerical::optimization::gradient_descent::gradient_descent;
use crate::numerical::optimization::lbfgs::lbfgs;
use crate::numerical::optimization::monitor::{LoggingMonitor, Monitor, ObjectiveTrace, TeeMonitor};
use crate::numerical::optimization::newton_logreg::newton_logistic;
use crate::numerical::optimization::sgd::sgd;
use crate::numerical::optimization::solver_config::{
    CDConfig, GDConfig, LBFGSConfig, NewtonConfig, OptimResult, SGDConfig, SolverMethod,
    StepSchedule,
};
use crate::somelinalg::linear_solvers::LinearSysMethod;
use log::{info, warn};
use nalgebra::DVector;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// Facade over the logistic regression solvers: picks the method, sets up logging,
/// runs the solver, keeps the objective trace and prints run statistics.
pub struct LogRegSolver {
    pub method: SolverMethod,
    pub lbfgs_config: LBFGSConfig,
    pub newton_config: NewtonConfig,
    pub gd_config: GDConfig,
    pub sgd_config: SGDConfig,
    pub cd_config: CDConfig,
    pub max_iter: Option<usize>, // overrides the iteration count of the selected method
    pub tol: Option<f64>,        // pgtol for L-BFGS, step tolerance for Newton
    /// Solve on centered features and map the coefficients back. Exact when the intercept is
    /// fitted; speeds up the first-order methods on data far from the origin.
    pub center_features: bool,
    pub initial_guess: Option<DVector<f64>>,
    pub sgd_indices: Option<Vec<usize>>,
    pub loglevel: Option<String>,
    pub log_file: bool,
    pub log_every: usize, // log every n-th objective value, 0 - never
    result: Option<OptimResult>,
    trace: Option<ObjectiveTrace>,
    calc_statistics: HashMap<String, String>,
}

impl LogRegSolver {
    pub fn new() -> LogRegSolver {
        LogRegSolver {
            method: SolverMethod::LBFGS,
            lbfgs_config: LBFGSConfig::default(),
            newton_config: NewtonConfig::default(),
            gd_config: GDConfig::default(),
            sgd_config: SGDConfig::default(),
            cd_config: CDConfig::default(),
            max_iter: None,
            tol: None,
            center_features: false,
            initial_guess: None,
            sgd_indices: None,
            loglevel: Some("info".to_string()),
            log_file: false,
            log_every: 0,
            result: None,
            trace: None,
            calc_statistics: HashMap::new(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn set_method(&mut self, method: SolverMethod) {
        self.method = method;
    }

    /// "lbfgs", "newton", "gd", "sgd" or "cd" (long names and any case accepted)
    pub fn set_method_from_str(&mut self, method: &str) -> Result<(), LogRegError> {
        self.method = SolverMethod::from_str(method)
            .map_err(|_| LogRegError::Config(format!("unknown solver method {}", method)))?;
        Ok(())
    }

    pub fn set_solver_params(
        &mut self,
        loglevel: Option<String>,
        linear_sys_method: Option<String>,
        max_iter: Option<usize>,
        tol: Option<f64>,
    ) -> Result<(), LogRegError> {
        if let Some(level) = loglevel {
            parse_loglevel(&level)?;
            self.loglevel = Some(level);
        }
        if let Some(method) = linear_sys_method {
            self.newton_config.linear_sys_method = LinearSysMethod::from_str(&method)
                .map_err(|_| {
                    LogRegError::Config(format!(
                        "linear_sys_method must be cholesky, lu or inv, got {}",
                        method
                    ))
                })?;
        }
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(LogRegError::InvalidInput(
                    "max_iter should be a positive number".to_string(),
                ));
            }
            self.max_iter = Some(max_iter);
        }
        if let Some(tol) = tol {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(LogRegError::InvalidInput(format!(
                    "tolerance should be positive, got {}",
                    tol
                )));
            }
            self.tol = Some(tol);
        }
        Ok(())
    }

    /// fixed step of gradient descent, None restores 1/L
    pub fn set_step(&mut self, step: Option<f64>) {
        self.gd_config.step = step;
    }

    pub fn set_sgd_params(
        &mut self,
        step0: Option<f64>,
        schedule: Option<StepSchedule>,
        seed: Option<u64>,
    ) -> Result<(), LogRegError> {
        if let Some(step0) = step0 {
            if !(step0.is_finite() && step0 > 0.0) {
                return Err(LogRegError::InvalidInput(format!(
                    "step0 should be positive, got {}",
                    step0
                )));
            }
            self.sgd_config.step0 = step0;
        }
        if let Some(schedule) = schedule {
            self.sgd_config.schedule = schedule;
        }
        if seed.is_some() {
            self.sgd_config.seed = seed;
        }
        Ok(())
    }

    pub fn set_history_size(&mut self, history_size: usize) -> Result<(), LogRegError> {
        if history_size == 0 {
            return Err(LogRegError::InvalidInput(
                "history size should be a positive number".to_string(),
            ));
        }
        self.lbfgs_config.history_size = history_size;
        Ok(())
    }

    pub fn set_center_features(&mut self, center_features: bool) {
        self.center_features = center_features;
    }

    pub fn set_initial_guess(&mut self, w0: DVector<f64>) {
        self.initial_guess = Some(w0);
    }

    /// sample order for SGD instead of random draws
    pub fn set_sgd_indices(&mut self, indices: Vec<usize>) {
        self.sgd_indices = Some(indices);
    }

    pub fn set_log_file(&mut self, log_file: bool) {
        self.log_file = log_file;
    }

    pub fn set_log_every(&mut self, every: usize) {
        self.log_every = every;
    }
    ////////////////////////////SOLVING///////////////////////////////////////////////////////////////////
    fn run_method(
        &self,
        problem: &LogRegProblem,
        w0: Option<DVector<f64>>,
        monitor: &mut dyn Monitor,
    ) -> Result<OptimResult, LogRegError> {
        if w0.is_some()
            && matches!(
                self.method,
                SolverMethod::Newton | SolverMethod::CoordinateDescent
            )
        {
            warn!("{} always starts from zero, initial guess ignored", self.method);
        }
        if self.tol.is_some()
            && !matches!(self.method, SolverMethod::LBFGS | SolverMethod::Newton)
        {
            warn!("{} runs a fixed number of iterations, tolerance ignored", self.method);
        }
        let w0 = w0.unwrap_or_else(|| problem.zeros());
        match self.method {
            SolverMethod::LBFGS => {
                let mut config = self.lbfgs_config.clone();
                if let Some(max_iter) = self.max_iter {
                    config.max_iter = max_iter;
                }
                if let Some(tol) = self.tol {
                    config.pgtol = tol;
                }
                lbfgs(problem, &w0, &config, monitor)
            }
            SolverMethod::Newton => {
                let mut config = self.newton_config.clone();
                if let Some(max_iter) = self.max_iter {
                    config.max_iter = max_iter;
                }
                config.tol = self.tol.or(config.tol);
                newton_logistic(problem, &config, monitor)
            }
            SolverMethod::GradientDescent => {
                let mut config = self.gd_config.clone();
                config.n_iter = self.max_iter.unwrap_or(config.n_iter);
                gradient_descent(problem, &w0, &config, monitor)
            }
            SolverMethod::SGD => {
                let mut config = self.sgd_config.clone();
                config.n_iter = self.max_iter.unwrap_or(config.n_iter);
                sgd(problem, &w0, self.sgd_indices.as_deref(), &config, monitor)
            }
            SolverMethod::CoordinateDescent => {
                let mut config = self.cd_config.clone();
                config.n_iter = self.max_iter.unwrap_or(config.n_iter);
                coordinate_descent(problem, &config, monitor)
            }
        }
    }

    fn solver(
        &self,
        problem: &LogRegProblem,
    ) -> Result<(OptimResult, ObjectiveTrace), LogRegError> {
        if let Some(w0) = &self.initial_guess {
            problem.check_params(w0)?;
        }
        let mut trace = ObjectiveTrace::new(&self.method.to_string());
        let mut progress = LoggingMonitor {
            every: self.log_every,
        };
        let result = {
            let mut monitor = TeeMonitor {
                first: &mut trace,
                second: &mut progress,
            };
            if self.center_features {
                let (centered, means) = problem.centered()?;
                // b_centered = b + means.w
                let w0 = self.initial_guess.as_ref().map(|w0| {
                    let n_features = problem.n_features();
                    let mut w0c = w0.clone();
                    w0c[n_features] += w0.rows(0, n_features).dot(&means);
                    w0c
                });
                let res = self.run_method(&centered, w0, &mut monitor)?;
                let coef = problem.uncenter(&res.coef, &means);
                OptimResult::new(
                    problem,
                    coef,
                    res.pobj,
                    res.iterations,
                    res.termination,
                    res.method,
                )
            } else {
                self.run_method(problem, self.initial_guess.clone(), &mut monitor)?
            }
        };
        Ok((result, trace))
    }

    /// Solves the problem with the selected method; logging is set up from `loglevel`
    pub fn solve(&mut self, problem: &LogRegProblem) -> Result<OptimResult, LogRegError> {
        let logging = init_logger(self.loglevel.as_deref(), self.log_file)?;
        if logging {
            info!(
                "\n \n solving logistic regression with {}: {} samples, {} parameters, lambda = {}",
                self.method,
                problem.n_samples(),
                problem.n_params(),
                problem.lambd()
            );
        }
        let begin = Instant::now();
        let (result, trace) = self.solver(problem)?;
        let elapsed = begin.elapsed().as_secs_f64();

        let stats = &mut self.calc_statistics;
        stats.insert("method".to_string(), result.method.to_string());
        stats.insert("number of samples".to_string(), problem.n_samples().to_string());
        stats.insert("number of parameters".to_string(), problem.n_params().to_string());
        stats.insert("number of iterations".to_string(), result.iterations.to_string());
        stats.insert("termination".to_string(), format!("{:?}", result.termination));
        stats.insert(
            "final objective".to_string(),
            result
                .final_objective()
                .map(|f| format!("{:.10e}", f))
                .unwrap_or_else(|| "-".to_string()),
        );
        stats.insert("time elapsed, s".to_string(), format!("{:.6}", elapsed));
        if logging {
            self.calc_statistics();
            info!(" \n \n Program ended");
        }
        self.result = Some(result.clone());
        self.trace = Some(trace);
        Ok(result)
    }

    pub fn get_result(&self) -> Option<OptimResult> {
        self.result.clone()
    }

    pub fn get_trace(&self) -> Option<&ObjectiveTrace> {
        self.trace.as_ref()
    }

    pub fn get_statistics(&self) -> &HashMap<String, String> {
        &self.calc_statistics
    }

    /// objective trace of the last run into a csv file
    pub fn save_trace(&self, path: &Path) -> io::Result<()> {
        match &self.trace {
            Some(trace) => save_trace_to_csv(std::slice::from_ref(trace), path),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no objective trace, run solve() first",
            )),
        }
    }

    fn calc_statistics(&self) {
        let mut rows: Vec<(&String, &String)> = self.calc_statistics.iter().collect();
        rows.sort();
        let mut builder = Builder::default();
        for (key, value) in rows {
            builder.push_record([key.as_str(), value.as_str()]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }
}

impl Default for LogRegSolver {
    fn default() -> Self {
        Self::new()
    }
}
