//! Reporting side of the solvers. Every solver pushes `(iteration, objective)` pairs into a
//! [`Monitor`]; what happens to them (kept in memory, logged, written to csv) is up to the receiver.
use log::info;
use std::time::Instant;

/// Receiver of the objective trace
pub trait Monitor {
    fn record(&mut self, iteration: usize, objective: f64);
}

impl<F> Monitor for F
where
    F: FnMut(usize, f64),
{
    fn record(&mut self, iteration: usize, objective: f64) {
        self(iteration, objective)
    }
}

/// discards everything
pub struct NoMonitor;

impl Monitor for NoMonitor {
    fn record(&mut self, _iteration: usize, _objective: f64) {}
}

/// Objective values with iteration numbers and wall-clock time since creation
#[derive(Debug, Clone)]
pub struct ObjectiveTrace {
    pub label: String,
    pub iterations: Vec<usize>,
    pub objectives: Vec<f64>,
    pub times: Vec<f64>, // seconds
    start: Instant,
}

impl ObjectiveTrace {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            iterations: Vec::new(),
            objectives: Vec::new(),
            times: Vec::new(),
            start: Instant::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// `f(w_k) - f_min`, floored at machine epsilon so it can be shown on a log scale
    pub fn suboptimality(&self, f_min: f64) -> Vec<f64> {
        self.objectives
            .iter()
            .map(|&f| (f - f_min).max(0.0) + f64::EPSILON)
            .collect()
    }

    /// true when no recorded value exceeds its predecessor by more than `slack` (relative)
    pub fn is_non_increasing(&self, slack: f64) -> bool {
        self.objectives
            .windows(2)
            .all(|pair| pair[1] <= pair[0] + slack * pair[0].abs())
    }
}

impl Monitor for ObjectiveTrace {
    fn record(&mut self, iteration: usize, objective: f64) {
        self.iterations.push(iteration);
        self.objectives.push(objective);
        self.times.push(self.start.elapsed().as_secs_f64());
    }
}

/// logs every `every`-th value at info level
pub struct LoggingMonitor {
    pub every: usize,
}

impl Monitor for LoggingMonitor {
    fn record(&mut self, iteration: usize, objective: f64) {
        if self.every > 0 && iteration % self.every == 0 {
            info!("iteration = {}, objective = {:.10e}", iteration, objective);
        }
    }
}

/// forwards every value to two receivers
pub struct TeeMonitor<'a> {
    pub first: &'a mut dyn Monitor,
    pub second: &'a mut dyn Monitor,
}

impl<'a> Monitor for TeeMonitor<'a> {
    fn record(&mut self, iteration: usize, objective: f64) {
        self.first.record(iteration, objective);
        self.second.record(iteration, objective);
    }
}
