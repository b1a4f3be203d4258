use std::fmt;

/// Error types for the logistic regression kernel and solvers
#[derive(Debug, Clone, PartialEq)]
pub enum LogRegError {
    /// dimensions of X, y or w do not conform
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    /// linear solve of the Newton step failed
    SingularHessian { iteration: usize },
    /// non-finite value met in input or produced by the kernel
    NumericOverflow(String),
    /// Lipschitz constant of the gradient (or of one coordinate) is zero, step size undefined
    ZeroLipschitz { coordinate: Option<usize> },
    InvalidInput(String),
    /// malformed configuration document
    Config(String),
}

impl fmt::Display for LogRegError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogRegError::ShapeMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "Shape mismatch for {}: expected {}, found {}",
                what, expected, found
            ),
            LogRegError::SingularHessian { iteration } => {
                write!(f, "Hessian is singular at iteration {}", iteration)
            }
            LogRegError::NumericOverflow(msg) => write!(f, "Numeric overflow: {}", msg),
            LogRegError::ZeroLipschitz { coordinate } => match coordinate {
                Some(j) => write!(f, "Lipschitz constant of coordinate {} is zero", j),
                None => write!(f, "Lipschitz constant of the gradient is zero"),
            },
            LogRegError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            LogRegError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for LogRegError {}

/// returns NumericOverflow if any entry of the slice is NaN or infinite
pub fn ensure_finite(values: &[f64], what: &str) -> Result<(), LogRegError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(LogRegError::NumericOverflow(format!(
            "{} has non-finite entry {} at position {}",
            what, values[i], i
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = LogRegError::ShapeMismatch {
            what: "w".to_string(),
            expected: 3,
            found: 2,
        };
        assert_eq!(e.to_string(), "Shape mismatch for w: expected 3, found 2");
        let e = LogRegError::ZeroLipschitz { coordinate: Some(1) };
        assert_eq!(e.to_string(), "Lipschitz constant of coordinate 1 is zero");
        let e = LogRegError::SingularHessian { iteration: 4 };
        assert!(e.to_string().contains("iteration 4"));
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&[1.0, -2.0, 0.0], "w").is_ok());
        let err = ensure_finite(&[1.0, f64::NAN], "w").unwrap_err();
        assert!(matches!(err, LogRegError::NumericOverflow(_)));
        assert!(ensure_finite(&[f64::INFINITY], "w").is_err());
    }
}
