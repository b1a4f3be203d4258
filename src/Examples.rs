//! examples of usage of RustedLogit
/// small deterministic datasets for tests, demos and benchmarks
pub mod synthetic_data;
/// logistic regression demos: solver comparison, gradient check, configuration from TOML
pub mod logreg_examples;
