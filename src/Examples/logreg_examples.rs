use crate::Examples::synthetic_data::{random_design, random_vector, two_clusters};
use crate::Utils::config_parser::parse_solver_settings;
use crate::Utils::logger::save_trace_to_csv;
use crate::numerical::logistic::gradient_check::gradient_check_report;
use crate::numerical::logistic::loss_functions::{loss, naive};
use crate::numerical::logistic::problem::LogRegProblem;
use crate::numerical::optimization::logreg_api::LogRegSolver;
use crate::numerical::optimization::solver_config::{SolverMethod, StepSchedule};
use nalgebra::DVector;
use std::path::Path;
use strum::IntoEnumIterator;

pub fn logreg_examples(example: usize) {
    match example {
        0 => {
            // all solvers on two clusters, decision boundaries and traces side by side
            let (X, y) = two_clusters(50, (6.0, 6.0), (5.0, 5.0), 0.3, 42);
            let problem = LogRegProblem::new(X, y, 0.1, true).unwrap();
            let mut traces = Vec::new();
            for method in SolverMethod::iter() {
                let mut solver = LogRegSolver::new();
                solver.set_method(method);
                solver.set_center_features(true);
                solver
                    .set_solver_params(Some("warn".to_string()), None, None, None)
                    .unwrap();
                match method {
                    SolverMethod::GradientDescent => solver.max_iter = Some(5000),
                    SolverMethod::CoordinateDescent => solver.max_iter = Some(1000),
                    SolverMethod::SGD => {
                        solver.set_sgd_params(Some(0.01), None, Some(0)).unwrap();
                        solver.max_iter = Some(100);
                    }
                    _ => {}
                }
                let res = solver.solve(&problem).unwrap();
                let (slope, offset) = res.decision_boundary().unwrap();
                println!(
                    "{:>6}: objective = {:.10}, boundary x2 = {:.6} * x1 + {:.6}, iterations = {}",
                    method.to_string(),
                    res.final_objective().unwrap(),
                    slope,
                    offset,
                    res.iterations
                );
                traces.push(solver.get_trace().unwrap().clone());
            }
            save_trace_to_csv(&traces, Path::new("logreg_traces.csv")).unwrap();
            println!("traces saved to logreg_traces.csv");
        }
        1 => {
            // analytic gradient against finite differences and dual numbers
            let (X, y) = random_design(100, 5, 0);
            let base = LogRegProblem::new(X, y, 0.0, true).unwrap();
            for lambd in [0.0, 0.1] {
                let problem = base.with_lambd(lambd).unwrap();
                let w0 = random_vector(problem.n_params(), 1);
                let report = gradient_check_report(&problem, &w0).unwrap();
                println!(
                    "lambda = {}: finite differences {:.3e}, automatic differentiation {:.3e}",
                    lambd, report.fd_error, report.ad_error
                );
            }
        }
        2 => {
            // naive formula overflows where the stable one does not
            let (X, y) = random_design(20, 2, 4);
            let problem = LogRegProblem::new(X, y, 0.1, false).unwrap();
            let w = DVector::from_vec(vec![800.0, -800.0]);
            println!("stable loss = {:?}", loss(&problem, &w));
            println!("naive loss  = {:?}", naive::loss(&problem, &w));
        }
        3 => {
            // constant against decaying SGD step
            let (X, y) = random_design(500, 10, 7);
            let problem = LogRegProblem::new(X, y, 1.0, true).unwrap();
            for schedule in [StepSchedule::Constant, StepSchedule::InverseSqrt] {
                let mut solver = LogRegSolver::new();
                solver.set_method(SolverMethod::SGD);
                solver
                    .set_solver_params(Some("warn".to_string()), None, Some(20), None)
                    .unwrap();
                solver
                    .set_sgd_params(Some(0.05), Some(schedule), Some(13))
                    .unwrap();
                let res = solver.solve(&problem).unwrap();
                println!("{}: objective per epoch {:?}", schedule, res.pobj);
            }
        }
        4 => {
            // settings from TOML
            let content = r#"
                [problem]
                lambd = 0.5

                [solver]
                method = "newton"
                linear_sys_method = "lu"
                tol = 1e-10

                [logging]
                loglevel = "info"
            "#;
            let settings = parse_solver_settings(content).unwrap();
            let (X, y) = random_design(300, 4, 21);
            let problem = settings.build_problem(X, y).unwrap();
            let mut solver = LogRegSolver::new();
            settings.apply(&mut solver).unwrap();
            let res = solver.solve(&problem).unwrap();
            println!("w = {}, intercept = {:?}", res.w, res.intercept);
        }
        _ => {}
    }
}
