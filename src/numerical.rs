/// L2-regularized logistic regression: problem context, numerically stable loss, gradient and Hessian,
/// forward-mode automatic differentiation and gradient checking
/// Example#1
/// ```
/// use RustedLogit::numerical::logistic::problem::LogRegProblem;
/// use RustedLogit::numerical::logistic::gradient_check::check_grad;
/// use nalgebra::{DMatrix, DVector};
/// let X = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, -1.0, 0.5, 0.3, -2.0, 2.0, 1.0]);
/// let y = DVector::from_vec(vec![1.0, -1.0, -1.0, 1.0]);
/// let problem = LogRegProblem::new(X, y, 0.1, false).unwrap();
/// let w0 = DVector::from_vec(vec![0.3, -0.7]);
/// let err = check_grad(&problem, &w0).unwrap();
/// assert!(err < 1e-5);
/// ```
pub mod logistic;
/// solvers for the logistic regression problem: L-BFGS, Newton, gradient descent,
/// stochastic gradient descent and coordinate descent
/// Example#1
/// ```
/// use RustedLogit::numerical::logistic::problem::LogRegProblem;
/// use RustedLogit::numerical::optimization::logreg_api::LogRegSolver;
/// use nalgebra::{DMatrix, DVector};
/// let X = DMatrix::from_row_slice(6, 1, &[-2.0, -1.0, -0.5, 0.5, 1.0, 2.0]);
/// let y = DVector::from_vec(vec![-1.0, -1.0, 1.0, -1.0, 1.0, 1.0]);
/// let problem = LogRegProblem::new(X, y, 0.1, true).unwrap();
/// let mut solver = LogRegSolver::new();
/// solver.set_method_from_str("newton").unwrap();
/// solver.set_solver_params(Some("off".to_string()), None, None, None).unwrap();
/// let result = solver.solve(&problem).unwrap();
/// assert_eq!(result.pobj.len(), 20);
/// ```
pub mod optimization;
