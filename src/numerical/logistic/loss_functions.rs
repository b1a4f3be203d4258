//! Regularized logistic loss and its derivatives.
//!
//! f(w) = sum_i log(1 + exp(-y_i * (x_i . w + b))) + lambd/2 * ||w||^2
//!
//! All formulas are evaluated in a form that stays finite for any finite margin:
//! log(1 + exp(-z)) is computed as log1p(exp(-|z|)) + max(-z, 0), and the sigmoid
//! never exponentiates a positive number. The intercept (last coefficient when fitted)
//! is not penalized.
use crate::numerical::logistic::logreg_errors::{LogRegError, ensure_finite};
use crate::numerical::logistic::problem::LogRegProblem;
use itertools::izip;
use nalgebra::{DMatrix, DVector};

/// logistic sigmoid 1/(1+exp(-t)), stable for large |t|
#[inline]
pub fn sigmoid(t: f64) -> f64 {
    if t >= 0.0 {
        1.0 / (1.0 + (-t).exp())
    } else {
        let e = t.exp();
        e / (1.0 + e)
    }
}

/// log(1 + exp(-z)) without overflow
#[inline]
pub fn log1p_exp_neg(z: f64) -> f64 {
    (-z.abs()).exp().ln_1p() + (-z).max(0.0)
}

/// data term of the objective for given margins z = Xw + b
pub fn data_loss_from_margins(y: &DVector<f64>, z: &DVector<f64>) -> f64 {
    y.iter()
        .zip(z.iter())
        .map(|(&yi, &zi)| log1p_exp_neg(yi * zi))
        .sum()
}

/// objective value from cached margins, used by solvers that keep Xw up to date
pub fn loss_from_margins(
    problem: &LogRegProblem,
    z: &DVector<f64>,
    w: &DVector<f64>,
) -> Result<f64, LogRegError> {
    if z.len() != problem.n_samples() {
        return Err(LogRegError::ShapeMismatch {
            what: "margins".to_string(),
            expected: problem.n_samples(),
            found: z.len(),
        });
    }
    let value = data_loss_from_margins(problem.y(), z) + problem.penalty(w);
    ensure_finite(&[value], "objective value")?;
    Ok(value)
}

/// regularized logistic loss
pub fn loss(problem: &LogRegProblem, w: &DVector<f64>) -> Result<f64, LogRegError> {
    let z = problem.margins(w)?;
    loss_from_margins(problem, &z, w)
}

// -y_i * sigma(-y_i z_i): derivative of the data term with respect to the margin
fn margin_derivatives(y: &DVector<f64>, z: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        y.len(),
        y.iter().zip(z.iter()).map(|(&yi, &zi)| -yi * sigmoid(-yi * zi)),
    )
}

fn add_penalty_gradient(problem: &LogRegProblem, w: &DVector<f64>, grad: &mut DVector<f64>) {
    let lambd = problem.lambd();
    for j in 0..problem.n_features() {
        grad[j] += lambd * w[j];
    }
}

/// gradient of the regularized logistic loss
pub fn gradient(problem: &LogRegProblem, w: &DVector<f64>) -> Result<DVector<f64>, LogRegError> {
    let z = problem.margins(w)?;
    let c = margin_derivatives(problem.y(), &z);
    let mut grad = problem.design().tr_mul(&c);
    add_penalty_gradient(problem, w, &mut grad);
    ensure_finite(grad.as_slice(), "gradient")?;
    Ok(grad)
}

/// objective and gradient sharing one evaluation of the margins
pub fn loss_and_gradient(
    problem: &LogRegProblem,
    w: &DVector<f64>,
) -> Result<(f64, DVector<f64>), LogRegError> {
    let z = problem.margins(w)?;
    let value = loss_from_margins(problem, &z, w)?;
    let c = margin_derivatives(problem.y(), &z);
    let mut grad = problem.design().tr_mul(&c);
    add_penalty_gradient(problem, w, &mut grad);
    ensure_finite(grad.as_slice(), "gradient")?;
    Ok((value, grad))
}

/// Gradient contribution of a single sample `i`:
/// `-y_i x_i sigma(-y_i z_i) + (lambd / n_samples) * w`, so that summing over all
/// samples gives the full gradient.
pub fn sample_gradient(
    problem: &LogRegProblem,
    w: &DVector<f64>,
    i: usize,
) -> Result<DVector<f64>, LogRegError> {
    problem.check_params(w)?;
    if i >= problem.n_samples() {
        return Err(LogRegError::InvalidInput(format!(
            "sample index {} out of range for {} samples",
            i,
            problem.n_samples()
        )));
    }
    let row = problem.design().row(i);
    let yi = problem.y()[i];
    let zi = row.transpose().dot(w);
    let ci = -yi * sigmoid(-yi * zi);
    let mut grad: DVector<f64> = row.transpose() * ci;
    let scale = problem.lambd() / problem.n_samples() as f64;
    for j in 0..problem.n_features() {
        grad[j] += scale * w[j];
    }
    Ok(grad)
}

/// Hessian `X^T diag(sigma(z)(1 - sigma(z))) X + lambd * I`, intercept entry unpenalized
pub fn hessian(problem: &LogRegProblem, w: &DVector<f64>) -> Result<DMatrix<f64>, LogRegError> {
    let z = problem.margins(w)?;
    let design = problem.design();
    let weights = z.map(|zi| {
        let s = sigmoid(zi);
        s * (1.0 - s)
    });
    let mut weighted = design.clone();
    for (mut row, &s) in izip!(weighted.row_iter_mut(), weights.iter()) {
        row *= s;
    }
    let mut hess = design.tr_mul(&weighted);
    let lambd = problem.lambd();
    for j in 0..problem.n_features() {
        hess[(j, j)] += lambd;
    }
    ensure_finite(hess.as_slice(), "Hessian")?;
    Ok(hess)
}

/// Textbook formulas log(1 + exp(-y z)) and 1/(1 + exp(y z)), kept to show where
/// the stable kernel differs. Overflowing values are returned as they are.
pub mod naive {
    use super::*;

    pub fn loss(problem: &LogRegProblem, w: &DVector<f64>) -> Result<f64, LogRegError> {
        let z = problem.margins(w)?;
        let data: f64 = izip!(problem.y().iter(), z.iter())
            .map(|(&yi, &zi)| (1.0 + (-yi * zi).exp()).ln())
            .sum();
        Ok(data + problem.penalty(w))
    }

    pub fn gradient(
        problem: &LogRegProblem,
        w: &DVector<f64>,
    ) -> Result<DVector<f64>, LogRegError> {
        let z = problem.margins(w)?;
        let c = DVector::from_iterator(
            z.len(),
            izip!(problem.y().iter(), z.iter()).map(|(&yi, &zi)| -yi / (1.0 + (yi * zi).exp())),
        );
        let mut grad = problem.design().tr_mul(&c);
        add_penalty_gradient(problem, w, &mut grad);
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn toy_problem(lambd: f64, fit_intercept: bool) -> LogRegProblem {
        let X = DMatrix::from_row_slice(
            5,
            2,
            &[1.0, 0.5, -1.5, 2.0, 0.3, -0.7, 2.2, 1.1, -0.4, -1.9],
        );
        let y = DVector::from_vec(vec![1.0, -1.0, 1.0, 1.0, -1.0]);
        LogRegProblem::new(X, y, lambd, fit_intercept).unwrap()
    }

    #[test]
    fn test_sigmoid_values() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert_relative_eq!(sigmoid(2.0) + sigmoid(-2.0), 1.0, epsilon = 1e-15);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
    }

    #[test]
    fn test_log1p_exp_neg_matches_naive_in_safe_range() {
        for &z in &[-20.0_f64, -3.0, -0.1, 0.0, 0.7, 5.0, 30.0] {
            let naive = (1.0 + (-z).exp()).ln();
            assert_relative_eq!(log1p_exp_neg(z), naive, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_log1p_exp_neg_extreme() {
        assert_relative_eq!(log1p_exp_neg(-1000.0), 1000.0);
        assert_eq!(log1p_exp_neg(1000.0), 0.0);
        assert!(log1p_exp_neg(-1e300).is_finite());
    }

    #[test]
    fn test_loss_at_zero() {
        let p = toy_problem(0.3, true);
        let value = loss(&p, &p.zeros()).unwrap();
        assert_relative_eq!(value, 5.0 * 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_loss_stays_finite_where_naive_overflows() {
        let p = toy_problem(0.0, false);
        let w = DVector::from_vec(vec![-800.0, 900.0]);
        let naive = naive::loss(&p, &w).unwrap();
        assert!(!naive.is_finite());
        let stable = loss(&p, &w).unwrap();
        assert!(stable.is_finite());
        let grad = gradient(&p, &w).unwrap();
        assert!(grad.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn test_gradient_matches_naive_in_safe_range() {
        let p = toy_problem(0.2, true);
        let w = DVector::from_vec(vec![0.4, -0.3, 0.1]);
        let g = gradient(&p, &w).unwrap();
        let g_naive = naive::gradient(&p, &w).unwrap();
        for (a, b) in g.iter().zip(g_naive.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        let (value, g2) = loss_and_gradient(&p, &w).unwrap();
        assert_relative_eq!(value, loss(&p, &w).unwrap());
        assert_eq!(g, g2);
    }

    #[test]
    fn test_intercept_not_penalized() {
        let p = toy_problem(10.0, true);
        let q = toy_problem(0.0, true);
        let w = DVector::from_vec(vec![0.0, 0.0, 2.0]);
        // only the intercept is nonzero, so the penalty has no effect
        assert_relative_eq!(loss(&p, &w).unwrap(), loss(&q, &w).unwrap());
        assert_relative_eq!(gradient(&p, &w).unwrap()[2], gradient(&q, &w).unwrap()[2]);
        let h = hessian(&p, &w).unwrap();
        let h0 = hessian(&q, &w).unwrap();
        assert_relative_eq!(h[(2, 2)], h0[(2, 2)]);
        assert_relative_eq!(h[(0, 0)], h0[(0, 0)] + 10.0);
    }

    #[test]
    fn test_sample_gradients_sum_to_full_gradient() {
        let p = toy_problem(0.7, true);
        let w = DVector::from_vec(vec![0.2, -0.5, 0.3]);
        let mut total = DVector::zeros(3);
        for i in 0..p.n_samples() {
            total += sample_gradient(&p, &w, i).unwrap();
        }
        let full = gradient(&p, &w).unwrap();
        for (a, b) in total.iter().zip(full.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        assert!(sample_gradient(&p, &w, 5).is_err());
    }

    #[test]
    fn test_hessian_symmetric_and_matches_gradient_differences() {
        let p = toy_problem(0.1, true);
        let w = DVector::from_vec(vec![0.3, 0.1, -0.2]);
        let h = hessian(&p, &w).unwrap();
        assert_relative_eq!(h.clone(), h.transpose(), epsilon = 1e-14);
        let eps = 1e-6;
        for j in 0..3 {
            let mut wp = w.clone();
            wp[j] += eps;
            let mut wm = w.clone();
            wm[j] -= eps;
            let col = (gradient(&p, &wp).unwrap() - gradient(&p, &wm).unwrap()) / (2.0 * eps);
            for i in 0..3 {
                assert_relative_eq!(h[(i, j)], col[i], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        let p = toy_problem(0.1, true);
        assert!(matches!(
            loss(&p, &DVector::zeros(2)).unwrap_err(),
            LogRegError::ShapeMismatch { .. }
        ));
        let w = DVector::from_vec(vec![f64::NAN, 0.0, 0.0]);
        assert!(matches!(
            gradient(&p, &w).unwrap_err(),
            LogRegError::NumericOverflow(_)
        ));
    }
}
