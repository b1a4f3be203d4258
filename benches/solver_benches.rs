use RustedLogit::Examples::synthetic_data::random_design;
use RustedLogit::numerical::logistic::loss_functions::{gradient, hessian};
use RustedLogit::numerical::logistic::problem::LogRegProblem;
use RustedLogit::numerical::optimization::logreg_api::LogRegSolver;
use RustedLogit::numerical::optimization::solver_config::SolverMethod;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use strum::IntoEnumIterator;

fn problem() -> LogRegProblem {
    let (X, y) = random_design(1000, 20, 0);
    LogRegProblem::new(X, y, 0.1, true).unwrap()
}

fn bench_kernel(c: &mut Criterion) {
    let problem = problem();
    let w = problem.zeros();
    c.bench_function("gradient 1000x20", |b| {
        b.iter(|| gradient(black_box(&problem), black_box(&w)))
    });
    c.bench_function("hessian 1000x20", |b| {
        b.iter(|| hessian(black_box(&problem), black_box(&w)))
    });
}

fn bench_solvers(c: &mut Criterion) {
    let problem = problem();
    let mut group = c.benchmark_group("solvers 1000x20");
    for method in SolverMethod::iter() {
        group.bench_function(method.to_string(), |b| {
            b.iter(|| {
                let mut solver = LogRegSolver::new();
                solver.set_method(method);
                solver
                    .set_solver_params(Some("off".to_string()), None, None, None)
                    .unwrap();
                solver.set_sgd_params(None, None, Some(0)).unwrap();
                solver.solve(black_box(&problem))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_kernel, bench_solvers);
criterion_main!(benches);
