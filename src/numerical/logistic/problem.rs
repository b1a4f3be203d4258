use crate::numerical::logistic::logreg_errors::{LogRegError, ensure_finite};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Immutable context of a regularized logistic regression problem.
///
/// Holds the design matrix `X` (rows are observations), labels `y` in {-1, +1},
/// regularization strength `lambd` and the intercept flag. When the intercept is fitted
/// the coefficient vector has `n_features + 1` entries, the intercept stored last and
/// excluded from the penalty.
#[derive(Debug, Clone)]
pub struct LogRegProblem {
    X: DMatrix<f64>,
    y: DVector<f64>,
    lambd: f64,
    fit_intercept: bool,
    // [X | 1] when fit_intercept, X otherwise
    design: DMatrix<f64>,
}

impl LogRegProblem {
    pub fn new(
        X: DMatrix<f64>,
        y: DVector<f64>,
        lambd: f64,
        fit_intercept: bool,
    ) -> Result<Self, LogRegError> {
        let (n_samples, n_features) = X.shape();
        if n_samples == 0 || n_features == 0 {
            return Err(LogRegError::InvalidInput(format!(
                "design matrix must be non-empty, got {}x{}",
                n_samples, n_features
            )));
        }
        if y.len() != n_samples {
            return Err(LogRegError::ShapeMismatch {
                what: "y (number of labels)".to_string(),
                expected: n_samples,
                found: y.len(),
            });
        }
        if let Some(i) = y.iter().position(|&yi| yi != 1.0 && yi != -1.0) {
            return Err(LogRegError::InvalidInput(format!(
                "labels must be -1 or +1, found {} at position {}",
                y[i], i
            )));
        }
        if !(lambd.is_finite() && lambd >= 0.0) {
            return Err(LogRegError::InvalidInput(format!(
                "regularization strength must be finite and non-negative, got {}",
                lambd
            )));
        }
        ensure_finite(X.as_slice(), "design matrix")?;

        let design = if fit_intercept {
            X.clone().insert_column(n_features, 1.0)
        } else {
            X.clone()
        };
        debug!(
            "logistic problem: n_samples = {}, n_features = {}, lambda = {}, intercept = {}",
            n_samples, n_features, lambd, fit_intercept
        );
        Ok(Self {
            X,
            y,
            lambd,
            fit_intercept,
            design,
        })
    }

    /// the same data with another regularization strength
    pub fn with_lambd(&self, lambd: f64) -> Result<Self, LogRegError> {
        Self::new(self.X.clone(), self.y.clone(), lambd, self.fit_intercept)
    }
    ////////////////////////////GETTERS///////////////////////////////////////////////////////
    pub fn X(&self) -> &DMatrix<f64> {
        &self.X
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    pub fn lambd(&self) -> f64 {
        self.lambd
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    /// design matrix the coefficient vector acts on: `[X | 1]` with intercept, `X` without
    pub fn design(&self) -> &DMatrix<f64> {
        &self.design
    }

    pub fn n_samples(&self) -> usize {
        self.X.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.X.ncols()
    }

    /// length of the coefficient vector
    pub fn n_params(&self) -> usize {
        self.design.ncols()
    }

    /// true for coefficients that enter the L2 penalty
    pub fn is_penalized(&self, j: usize) -> bool {
        j < self.n_features()
    }

    pub fn zeros(&self) -> DVector<f64> {
        DVector::zeros(self.n_params())
    }
    ////////////////////////////CHECKS AND HELPERS////////////////////////////////////////////
    pub fn check_params(&self, w: &DVector<f64>) -> Result<(), LogRegError> {
        if w.len() != self.n_params() {
            return Err(LogRegError::ShapeMismatch {
                what: "w (number of coefficients)".to_string(),
                expected: self.n_params(),
                found: w.len(),
            });
        }
        ensure_finite(w.as_slice(), "coefficient vector")
    }

    /// linear predictor `Xw + b`
    pub fn margins(&self, w: &DVector<f64>) -> Result<DVector<f64>, LogRegError> {
        self.check_params(w)?;
        Ok(&self.design * w)
    }

    /// `0.5 * lambd * ||w||^2` over penalized coefficients only
    pub fn penalty(&self, w: &DVector<f64>) -> f64 {
        let n_features = self.n_features();
        0.5 * self.lambd * w.rows(0, n_features).norm_squared()
    }

    /// column means of X
    pub fn feature_means(&self) -> DVector<f64> {
        self.X.row_mean().transpose()
    }

    /// Same problem with centered feature columns. With an unpenalized intercept this is an exact
    /// reparametrization: `x.w + b = (x - mean).w + (b + mean.w)`, so minimizers and objective values
    /// coincide. Returns the centered problem and the column means.
    pub fn centered(&self) -> Result<(LogRegProblem, DVector<f64>), LogRegError> {
        if !self.fit_intercept {
            return Err(LogRegError::InvalidInput(
                "feature centering requires a fitted intercept".to_string(),
            ));
        }
        let means = self.feature_means();
        let mut Xc = self.X.clone();
        for (mut col, &m) in Xc.column_iter_mut().zip(means.iter()) {
            col.add_scalar_mut(-m);
        }
        let centered = Self::new(Xc, self.y.clone(), self.lambd, true)?;
        Ok((centered, means))
    }

    /// map coefficients of the centered problem back to the original features
    pub fn uncenter(&self, coef: &DVector<f64>, means: &DVector<f64>) -> DVector<f64> {
        let n_features = self.n_features();
        let mut out = coef.clone();
        let shift = coef.rows(0, n_features).dot(means);
        out[n_features] -= shift;
        out
    }

    /// split coefficient vector into weights and (optional) intercept
    pub fn split(&self, w: &DVector<f64>) -> (DVector<f64>, Option<f64>) {
        let n_features = self.n_features();
        let weights = w.rows(0, n_features).into_owned();
        let intercept = if self.fit_intercept {
            Some(w[n_features])
        } else {
            None
        };
        (weights, intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_problem(fit_intercept: bool) -> LogRegProblem {
        let X = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let y = DVector::from_vec(vec![1.0, -1.0, 1.0]);
        LogRegProblem::new(X, y, 0.5, fit_intercept).unwrap()
    }

    #[test]
    fn test_augmented_design() {
        let p = small_problem(true);
        assert_eq!(p.n_params(), 3);
        assert_eq!(p.design().column(2).iter().sum::<f64>(), 3.0);
        assert_eq!(p.design()[(1, 0)], 3.0);
        let p = small_problem(false);
        assert_eq!(p.n_params(), 2);
    }

    #[test]
    fn test_shape_mismatch_labels() {
        let X = DMatrix::zeros(3, 2);
        let y = DVector::from_vec(vec![1.0, -1.0]);
        let err = LogRegProblem::new(X, y, 0.1, false).unwrap_err();
        assert!(matches!(
            err,
            LogRegError::ShapeMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_shape_mismatch_coefficients() {
        let p = small_problem(true);
        let err = p.check_params(&DVector::zeros(2)).unwrap_err();
        assert!(matches!(
            err,
            LogRegError::ShapeMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        let X = DMatrix::from_element(2, 1, 1.0);
        let bad_labels = DVector::from_vec(vec![1.0, 0.0]);
        assert!(LogRegProblem::new(X.clone(), bad_labels, 0.1, false).is_err());
        let y = DVector::from_vec(vec![1.0, -1.0]);
        assert!(LogRegProblem::new(X.clone(), y.clone(), -1.0, false).is_err());
        let mut X_nan = X.clone();
        X_nan[(0, 0)] = f64::NAN;
        assert!(matches!(
            LogRegProblem::new(X_nan, y, 0.1, false).unwrap_err(),
            LogRegError::NumericOverflow(_)
        ));
    }

    #[test]
    fn test_penalty_excludes_intercept() {
        let p = small_problem(true);
        let w = DVector::from_vec(vec![1.0, 2.0, 100.0]);
        assert_eq!(p.penalty(&w), 0.5 * 0.5 * 5.0);
        let (weights, b) = p.split(&w);
        assert_eq!(weights.len(), 2);
        assert_eq!(b, Some(100.0));
    }

    #[test]
    fn test_with_lambd_keeps_data() {
        let p = small_problem(true);
        let q = p.with_lambd(2.0).unwrap();
        assert_eq!(q.lambd(), 2.0);
        assert_eq!(q.X(), p.X());
        assert_eq!(q.y(), p.y());
        assert!(q.fit_intercept());
        assert!(p.with_lambd(-0.1).is_err());
    }

    #[test]
    fn test_centering_is_exact_reparametrization() {
        use crate::numerical::logistic::loss_functions::loss;
        let p = small_problem(true);
        let (pc, means) = p.centered().unwrap();
        assert_eq!(means, DVector::from_vec(vec![3.0, 4.0]));
        assert!(pc.X().row_mean().iter().all(|m| m.abs() < 1e-12));
        let wc = DVector::from_vec(vec![0.3, -0.2, 0.5]);
        let w = p.uncenter(&wc, &means);
        let diff = loss(&pc, &wc).unwrap() - loss(&p, &w).unwrap();
        assert!(diff.abs() < 1e-12);
        assert!(small_problem(false).centered().is_err());
    }
}
