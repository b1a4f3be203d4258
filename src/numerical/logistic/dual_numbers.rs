//! Forward-mode automatic differentiation.
//!
//! A dual number `re + eps * ε` with `ε² = 0` carries a value and a directional derivative.
//! The regularized logistic loss is written once, generic over [`AdScalar`]; evaluating it on
//! `f64` gives the objective, evaluating it on `num_dual::Dual64` seeded with the k-th unit vector
//! gives the k-th partial derivative. The gradient obtained this way does not share any code with
//! the analytic gradient in `loss_functions`, so it is an independent check of it.
use crate::numerical::logistic::logreg_errors::{LogRegError, ensure_finite};
use crate::numerical::logistic::problem::LogRegProblem;
use nalgebra::DVector;
use num_dual::Dual64;
use num_traits::{One, Zero};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Scalar type the generic loss can be evaluated on
pub trait AdScalar:
    Copy
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn from_f64(v: f64) -> Self;
    fn value(&self) -> f64;
    fn exp(self) -> Self;
    fn ln_1p(self) -> Self;
    fn abs(self) -> Self;
    /// larger of the two by value; on ties `other` is returned
    fn max(self, other: Self) -> Self;
}

impl AdScalar for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }
    fn value(&self) -> f64 {
        *self
    }
    fn exp(self) -> Self {
        f64::exp(self)
    }
    fn ln_1p(self) -> Self {
        f64::ln_1p(self)
    }
    fn abs(self) -> Self {
        f64::abs(self)
    }
    fn max(self, other: Self) -> Self {
        if self > other { self } else { other }
    }
}

impl AdScalar for Dual64 {
    fn from_f64(v: f64) -> Self {
        Dual64::from(v)
    }
    fn value(&self) -> f64 {
        self.re
    }
    fn exp(self) -> Self {
        <Dual64 as num_dual::DualNum<f64>>::exp(&self)
    }
    fn ln_1p(self) -> Self {
        <Dual64 as num_dual::DualNum<f64>>::ln_1p(&self)
    }
    fn abs(self) -> Self {
        // |z| is taken with slope +1 at zero; the kink cancels against max(-z, 0) in the loss
        if self.re >= 0.0 { self } else { -self }
    }
    fn max(self, other: Self) -> Self {
        if self.re > other.re { self } else { other }
    }
}

/// Regularized logistic loss for any [`AdScalar`], same stable formulation as the analytic kernel
pub fn loss_generic<T: AdScalar>(problem: &LogRegProblem, w: &[T]) -> T {
    let design = problem.design();
    let y = problem.y();
    let mut total = T::zero();
    for i in 0..problem.n_samples() {
        let mut z = T::zero();
        for (j, wj) in w.iter().enumerate() {
            z = z + T::from_f64(design[(i, j)]) * *wj;
        }
        let yz = T::from_f64(y[i]) * z;
        total = total + (-yz.abs()).exp().ln_1p() + (-yz).max(T::zero());
    }
    let mut sq = T::zero();
    for wj in w.iter().take(problem.n_features()) {
        sq = sq + *wj * *wj;
    }
    total + T::from_f64(0.5 * problem.lambd()) * sq
}

/// Gradient of the loss by forward-mode AD: one dual-number sweep per coefficient
pub fn ad_gradient(problem: &LogRegProblem, w: &DVector<f64>) -> Result<DVector<f64>, LogRegError> {
    problem.check_params(w)?;
    let n = w.len();
    let mut grad = DVector::zeros(n);
    let mut duals: Vec<Dual64> = w.iter().map(|&wj| Dual64::from(wj)).collect();
    for k in 0..n {
        duals[k].eps = 1.0;
        grad[k] = loss_generic(problem, &duals).eps;
        duals[k].eps = 0.0;
    }
    ensure_finite(grad.as_slice(), "AD gradient")?;
    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::logistic::loss_functions::loss;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn test_dual_elementary_functions() {
        let x = Dual64::new(0.3, 1.0);
        let e = AdScalar::exp(x);
        assert_relative_eq!(e.re, 0.3_f64.exp());
        assert_relative_eq!(e.eps, 0.3_f64.exp());
        let l = AdScalar::ln_1p(x);
        assert_relative_eq!(l.eps, 1.0 / 1.3);
        let a = AdScalar::abs(Dual64::new(-1.5, 1.0));
        assert_eq!((a.re, a.eps), (1.5, -1.0));
        let m = AdScalar::max(Dual64::new(-0.5, 1.0), Dual64::zero());
        assert_eq!((m.re, m.eps), (0.0, 0.0));
    }

    #[test]
    fn test_generic_loss_on_dual_carries_value() {
        let X = DMatrix::from_row_slice(2, 1, &[0.5, -1.5]);
        let y = DVector::from_vec(vec![1.0, -1.0]);
        let p = LogRegProblem::new(X, y, 0.2, false).unwrap();
        let w = [Dual64::new(0.8, 1.0)];
        let f = loss_generic(&p, &w);
        assert_relative_eq!(
            f.value(),
            loss(&p, &DVector::from_vec(vec![0.8])).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_generic_loss_on_f64_matches_kernel() {
        let X = DMatrix::from_row_slice(3, 2, &[0.5, -1.0, 2.0, 0.3, -0.8, 1.2]);
        let y = DVector::from_vec(vec![-1.0, 1.0, 1.0]);
        let p = LogRegProblem::new(X, y, 0.4, true).unwrap();
        let w = DVector::from_vec(vec![0.7, -0.2, 0.05]);
        let generic = loss_generic(&p, w.as_slice());
        assert_relative_eq!(generic, loss(&p, &w).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_ad_gradient_at_kink() {
        // at w = 0 every margin is exactly zero
        let X = DMatrix::from_row_slice(2, 1, &[1.0, -2.0]);
        let y = DVector::from_vec(vec![1.0, 1.0]);
        let p = LogRegProblem::new(X, y, 0.0, false).unwrap();
        let g = ad_gradient(&p, &DVector::zeros(1)).unwrap();
        // -(1 * 0.5) - (-2 * 0.5)
        assert_relative_eq!(g[0], 0.5, epsilon = 1e-14);
    }
}
