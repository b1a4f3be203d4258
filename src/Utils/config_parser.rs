//! Solver settings from a TOML document.
//!
//! ```toml
//! [problem]
//! lambd = 0.1
//! fit_intercept = true
//!
//! [solver]
//! method = "newton"
//! max_iter = 20
//! linear_sys_method = "lu"
//!
//! [logging]
//! loglevel = "warn"
//! log_file = false
//! ```
//! Every key is optional; unknown sections and keys are rejected.
use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::logreg_api::LogRegSolver;
use crate::numerical::optimization::solver_config::{SolverMethod, StepSchedule};
use crate::somelinalg::linear_solvers::LinearSysMethod;
use nalgebra::{DMatrix, DVector};
use std::str::FromStr;
use toml::{Table, Value};

pub const DEFAULT_LAMBD: f64 = 0.1;

const PROBLEM_KEYS: [&str; 2] = ["lambd", "fit_intercept"];
const SOLVER_KEYS: [&str; 11] = [
    "method",
    "max_iter",
    "tol",
    "step",
    "step0",
    "seed",
    "history_size",
    "linear_sys_method",
    "decay",
    "center_features",
    "log_every",
];
const LOGGING_KEYS: [&str; 2] = ["loglevel", "log_file"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverSettings {
    // [problem]
    pub lambd: Option<f64>,
    pub fit_intercept: Option<bool>,
    // [solver]
    pub method: Option<SolverMethod>,
    pub max_iter: Option<usize>,
    pub tol: Option<f64>,
    pub step: Option<f64>,
    pub step0: Option<f64>,
    pub seed: Option<u64>,
    pub history_size: Option<usize>,
    pub linear_sys_method: Option<LinearSysMethod>,
    pub decay: Option<StepSchedule>,
    pub center_features: Option<bool>,
    pub log_every: Option<usize>,
    // [logging]
    pub loglevel: Option<String>,
    pub log_file: Option<bool>,
}

fn config_error(section: &str, key: &str, expected: &str, found: &Value) -> LogRegError {
    LogRegError::Config(format!(
        "[{}] {}: expected {}, found {}",
        section, key, expected, found
    ))
}

fn get_section<'a>(
    doc: &'a Table,
    section: &str,
    known: &[&str],
) -> Result<Option<&'a Table>, LogRegError> {
    let Some(value) = doc.get(section) else {
        return Ok(None);
    };
    let table = value
        .as_table()
        .ok_or_else(|| {
            LogRegError::Config(format!(
                "section [{}] must be a table, found {}",
                section, value
            ))
        })?;
    if let Some(key) = table.keys().find(|key| !known.contains(&key.as_str())) {
        return Err(LogRegError::Config(format!(
            "unknown key {} in section [{}]",
            key, section
        )));
    }
    Ok(Some(table))
}

// integers are accepted where floats are expected: `lambd = 1`
fn get_float(table: &Table, section: &str, key: &str) -> Result<Option<f64>, LogRegError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Float(x)) => Ok(Some(*x)),
        Some(Value::Integer(i)) => Ok(Some(*i as f64)),
        Some(other) => Err(config_error(section, key, "a number", other)),
    }
}

fn get_usize(table: &Table, section: &str, key: &str) -> Result<Option<usize>, LogRegError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(i)) if *i >= 0 => Ok(Some(*i as usize)),
        Some(other) => Err(config_error(section, key, "a non-negative integer", other)),
    }
}

fn get_bool(table: &Table, section: &str, key: &str) -> Result<Option<bool>, LogRegError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(other) => Err(config_error(section, key, "a boolean", other)),
    }
}

fn get_str<'a>(table: &'a Table, section: &str, key: &str) -> Result<Option<&'a str>, LogRegError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(config_error(section, key, "a string", other)),
    }
}

fn get_enum<T: FromStr>(table: &Table, section: &str, key: &str) -> Result<Option<T>, LogRegError> {
    match get_str(table, section, key)? {
        None => Ok(None),
        Some(name) => T::from_str(name).map(Some).map_err(|_| {
            LogRegError::Config(format!("[{}] {}: unknown value {}", section, key, name))
        }),
    }
}

/// Parses the TOML text into [`SolverSettings`]
pub fn parse_solver_settings(content: &str) -> Result<SolverSettings, LogRegError> {
    let doc: Table = content
        .parse()
        .map_err(|e| LogRegError::Config(format!("failed to parse config: {}", e)))?;
    if let Some(section) = doc
        .keys()
        .find(|key| !["problem", "solver", "logging"].contains(&key.as_str()))
    {
        return Err(LogRegError::Config(format!("unknown section [{}]", section)));
    }
    let mut settings = SolverSettings::default();

    if let Some(problem) = get_section(&doc, "problem", &PROBLEM_KEYS)? {
        settings.lambd = get_float(problem, "problem", "lambd")?;
        settings.fit_intercept = get_bool(problem, "problem", "fit_intercept")?;
    }
    if let Some(solver) = get_section(&doc, "solver", &SOLVER_KEYS)? {
        settings.method = get_enum(solver, "solver", "method")?;
        settings.max_iter = get_usize(solver, "solver", "max_iter")?;
        settings.tol = get_float(solver, "solver", "tol")?;
        settings.step = get_float(solver, "solver", "step")?;
        settings.step0 = get_float(solver, "solver", "step0")?;
        settings.seed = get_usize(solver, "solver", "seed")?.map(|seed| seed as u64);
        settings.history_size = get_usize(solver, "solver", "history_size")?;
        settings.linear_sys_method = get_enum(solver, "solver", "linear_sys_method")?;
        settings.decay = get_enum(solver, "solver", "decay")?;
        settings.center_features = get_bool(solver, "solver", "center_features")?;
        settings.log_every = get_usize(solver, "solver", "log_every")?;
    }
    if let Some(logging) = get_section(&doc, "logging", &LOGGING_KEYS)? {
        settings.loglevel = get_str(logging, "logging", "loglevel")?.map(|s| s.to_string());
        settings.log_file = get_bool(logging, "logging", "log_file")?;
    }
    Ok(settings)
}

impl SolverSettings {
    /// Problem from data and the `[problem]` section (`lambd` defaults to 0.1, intercept fitted)
    pub fn build_problem(
        &self,
        X: DMatrix<f64>,
        y: DVector<f64>,
    ) -> Result<LogRegProblem, LogRegError> {
        LogRegProblem::new(
            X,
            y,
            self.lambd.unwrap_or(DEFAULT_LAMBD),
            self.fit_intercept.unwrap_or(true),
        )
    }

    /// Copies every setting that is present into the solver
    pub fn apply(&self, solver: &mut LogRegSolver) -> Result<(), LogRegError> {
        if let Some(method) = self.method {
            solver.set_method(method);
        }
        solver.set_solver_params(
            self.loglevel.clone(),
            self.linear_sys_method.map(|m| m.to_string()),
            self.max_iter,
            self.tol,
        )?;
        if self.step.is_some() {
            solver.set_step(self.step);
        }
        solver.set_sgd_params(self.step0, self.decay, self.seed)?;
        if let Some(history_size) = self.history_size {
            solver.set_history_size(history_size)?;
        }
        if let Some(center) = self.center_features {
            solver.set_center_features(center);
        }
        if let Some(every) = self.log_every {
            solver.set_log_every(every);
        }
        if let Some(log_file) = self.log_file {
            solver.set_log_file(log_file);
        }
        Ok(())
    }
}
