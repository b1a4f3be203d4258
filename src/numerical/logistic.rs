#[allow(non_snake_case)]
/// immutable problem context: design matrix, labels, regularization strength, intercept flag
pub mod problem;
/// error type shared by the kernel and the solvers
pub mod logreg_errors;
/// numerically stable loss, gradient, per-sample gradient and Hessian
pub mod loss_functions;
/// forward-mode automatic differentiation with dual numbers
pub mod dual_numbers;
/// gradient checking: central finite differences and automatic differentiation
pub mod gradient_check;
