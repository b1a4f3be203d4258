use log::debug;
use nalgebra::{DMatrix, DVector};
use strum_macros::{Display, EnumString};

/// Direct methods for the dense linear systems met by second-order solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum LinearSysMethod {
    /// symmetric positive definite matrices only
    #[default]
    #[strum(serialize = "cholesky")]
    Cholesky,
    #[strum(serialize = "lu")]
    Lu,
    /// explicit inverse, kept for comparison
    #[strum(serialize = "inv")]
    Inv,
}

/// Solve `A x = b`; `None` when the factorization or the inverse does not exist
pub fn solve_linear_system(
    method: LinearSysMethod,
    A: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Option<DVector<f64>> {
    if !A.is_square() || A.nrows() != b.len() {
        return None;
    }
    let x = match method {
        LinearSysMethod::Cholesky => A.clone().cholesky().map(|chol| chol.solve(b)),
        LinearSysMethod::Lu => A.clone().lu().solve(b),
        LinearSysMethod::Inv => A.clone().try_inverse().map(|A_inv| A_inv * b),
    };
    match x {
        Some(x) if x.iter().all(|v| v.is_finite()) => Some(x),
        Some(_) => {
            debug!("{} solve produced non-finite values", method);
            None
        }
        None => {
            debug!("{} factorization failed", method);
            None
        }
    }
}
