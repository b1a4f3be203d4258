use log::warn;
use nalgebra::DMatrix;

/// Condition number: ratio of the largest singular value to the smallest one.
/// Infinite for a matrix with a zero singular value.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        f64::INFINITY
    } else {
        max_sigma / min_sigma
    }
}

/// A system is poorly conditioned if its solution is sensitive to small changes in the data,
/// i.e. the condition number of the matrix exceeds `threshold`
pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let condition_number = condition_number(A);
    let poorly_conditioned = condition_number > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2e}",
            condition_number
        );
    }
    poorly_conditioned
}

/// Largest eigenvalue of a symmetric matrix
pub fn largest_eigenvalue_symmetric(A: &DMatrix<f64>) -> f64 {
    if A.is_empty() {
        return 0.0;
    }
    A.clone().symmetric_eigenvalues().max()
}

/// Squared spectral norm ||X||_2^2 = largest eigenvalue of X^T X (or of X X^T, whichever is smaller)
pub fn spectral_norm_squared(X: &DMatrix<f64>) -> f64 {
    let gram = if X.ncols() <= X.nrows() {
        X.tr_mul(X)
    } else {
        X * X.transpose()
    };
    largest_eigenvalue_symmetric(&gram).max(0.0)
}

/// famous example of ill-conditioned matrix
#[cfg(test)]
fn hilbert_matrix(n: usize) -> DMatrix<f64> {
    let mut A = DMatrix::zeros(n, n);
    for i in 1..n + 1 {
        for j in 1..n + 1 {
            A[(i - 1, j - 1)] = 1.0 / (i as f64 + j as f64 - 1.0);
        }
    }
    A
}
