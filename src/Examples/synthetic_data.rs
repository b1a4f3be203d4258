//! Small deterministic datasets for tests, demos and benchmarks
use crate::numerical::logistic::loss_functions::sigmoid;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// standard normal sample
pub fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// vector of independent standard normal entries
pub fn random_vector(n: usize, seed: u64) -> DVector<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    DVector::from_fn(n, |_, _| standard_normal(&mut rng))
}

/// Gaussian design with labels drawn from the logistic model of a random weight vector,
/// classes overlap so the unregularized minimizer is finite
pub fn random_design(n_samples: usize, n_features: usize, seed: u64) -> (DMatrix<f64>, DVector<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let X = DMatrix::from_fn(n_samples, n_features, |_, _| standard_normal(&mut rng));
    let w_true = DVector::from_fn(n_features, |_, _| standard_normal(&mut rng));
    let z = &X * &w_true;
    let y = z.map(|zi| {
        if rng.random_range(0.0..1.0) < sigmoid(zi) {
            1.0
        } else {
            -1.0
        }
    });
    (X, y)
}

/// Two isotropic Gaussian clusters in 2D: class +1 around `center_pos`, class -1 around `center_neg`
pub fn two_clusters(
    n_per_class: usize,
    center_pos: (f64, f64),
    center_neg: (f64, f64),
    std: f64,
    seed: u64,
) -> (DMatrix<f64>, DVector<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = 2 * n_per_class;
    let mut X = DMatrix::zeros(n, 2);
    let mut y = DVector::zeros(n);
    for i in 0..n {
        let (center, label) = if i < n_per_class {
            (center_pos, 1.0)
        } else {
            (center_neg, -1.0)
        };
        X[(i, 0)] = center.0 + std * standard_normal(&mut rng);
        X[(i, 1)] = center.1 + std * standard_normal(&mut rng);
        y[i] = label;
    }
    (X, y)
}
