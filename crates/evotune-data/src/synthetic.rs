//! Synthetic regression data generation.
//!
//! Generates datasets from a random linear model with Gaussian noise. The
//! targets are genuinely learnable, which makes the data useful both for
//! exercising the tuner end to end and for tests that need a dataset with a
//! known amount of structure.

use rand::Rng;
use rand_distr::Normal;

use crate::SampleSet;

/// Generates `sample_count` samples of `feature_count` features each.
///
/// Features are drawn uniformly from `[-1, 1]`; the target is a random
/// linear combination of the features (coefficients in `[-2, 2]`) plus an
/// intercept and `N(0, noise)` observation noise.
///
/// # Arguments
///
/// * `sample_count` - Number of samples to generate
/// * `feature_count` - Width of each feature row
/// * `noise` - Standard deviation of the observation noise (must be ≥ 0)
/// * `rng` - Random number generator
#[must_use]
pub fn generate<R>(sample_count: usize, feature_count: usize, noise: f64, rng: &mut R) -> SampleSet
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, noise).unwrap();
    let coefficients: Vec<f64> = (0..feature_count)
        .map(|_| rng.random_range(-2.0..=2.0))
        .collect();
    let intercept: f64 = rng.random_range(-1.0..=1.0);

    let mut features = Vec::with_capacity(sample_count);
    let mut targets = Vec::with_capacity(sample_count);
    for _ in 0..sample_count {
        let row: Vec<f64> = (0..feature_count)
            .map(|_| rng.random_range(-1.0..=1.0))
            .collect();
        let signal: f64 = std::iter::zip(&coefficients, &row).map(|(c, x)| c * x).sum();
        targets.push(intercept + signal + rng.sample(normal));
        features.push(row);
    }

    SampleSet::new(features, targets).expect("generated rows are uniform")
}
