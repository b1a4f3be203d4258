/// configuration structures, results and termination reasons shared by the solvers
pub mod solver_config;
/// receivers of (iteration, objective) pairs produced by the solvers
pub mod monitor;
/// limited-memory BFGS with backtracking line search, the reference solver
#[allow(non_snake_case)]
pub mod lbfgs;
/// Newton's method with a fixed number of iterations
pub mod newton_logreg;
/// batch gradient descent with step 1/L
pub mod gradient_descent;
/// stochastic gradient descent over pre-drawn sample indices
pub mod sgd;
/// cyclic coordinate descent with cached linear predictor
pub mod coordinate_descent;
/// solver facade: method selection, logging, statistics
pub mod logreg_api;
