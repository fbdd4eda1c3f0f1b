//! The boosted tree ensemble: fit, predict, score.

use evotune_data::SampleSet;
use rand::{SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;

use crate::{EstimatorError, config::GradientBoostingConfig, tree::RegressionTree};

/// A gradient boosting regressor.
///
/// Construction is cheap and infallible for a valid configuration; all work
/// happens in [`fit`](Self::fit). Scoring before fitting fails with
/// [`EstimatorError::NotFitted`], mirroring how estimator libraries treat
/// unfitted models.
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    config: GradientBoostingConfig,
    state: Option<FittedState>,
}

#[derive(Debug, Clone)]
struct FittedState {
    base_score: f64,
    trees: Vec<RegressionTree>,
    feature_count: usize,
}

impl GradientBoostingRegressor {
    /// Creates an unfitted regressor for `config`.
    #[must_use]
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// The configuration this regressor was built from.
    #[must_use]
    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    /// Fits the ensemble on `samples`, replacing any previous fit.
    ///
    /// Column subsampling draws from a generator seeded with the
    /// configuration's seed, so fitting the same configuration on the same
    /// data always builds the same ensemble.
    ///
    /// # Errors
    ///
    /// Fails with [`EstimatorError::EmptySampleSet`] on an empty training
    /// set.
    pub fn fit(&mut self, samples: &SampleSet) -> Result<(), EstimatorError> {
        if samples.is_empty() {
            return Err(EstimatorError::EmptySampleSet);
        }

        let targets = samples.targets();
        #[expect(clippy::cast_precision_loss)]
        let base_score = targets.iter().sum::<f64>() / targets.len() as f64;
        let feature_count = samples.feature_count();

        let mut predictions = vec![base_score; samples.len()];
        let mut trees = Vec::with_capacity(self.config.rounds);
        let mut rng = Pcg32::seed_from_u64(self.config.seed);

        // A zero-width sample set has nothing to split on; the base score is
        // the whole model.
        if feature_count > 0 {
            for _ in 0..self.config.rounds {
                let residuals: Vec<f64> = std::iter::zip(targets, &predictions)
                    .map(|(target, prediction)| target - prediction)
                    .collect();

                let columns =
                    sample_columns(feature_count, self.config.colsample_bytree, &mut rng);
                let tree =
                    RegressionTree::fit(samples.features(), &residuals, &columns, &self.config);

                for (prediction, row) in std::iter::zip(&mut predictions, samples.features()) {
                    *prediction += self.config.learning_rate * tree.predict(row);
                }
                trees.push(tree);
            }
        }

        self.state = Some(FittedState {
            base_score,
            trees,
            feature_count,
        });
        Ok(())
    }

    /// Predicts a target for every sample.
    ///
    /// # Errors
    ///
    /// Fails if the regressor is unfitted or the sample width differs from
    /// the fitted width.
    pub fn predict(&self, samples: &SampleSet) -> Result<Vec<f64>, EstimatorError> {
        let state = self.state.as_ref().ok_or(EstimatorError::NotFitted)?;
        if samples.feature_count() != state.feature_count {
            return Err(EstimatorError::FeatureWidthMismatch {
                expected: state.feature_count,
                found: samples.feature_count(),
            });
        }

        Ok(samples
            .features()
            .iter()
            .map(|row| {
                let boost: f64 = state.trees.iter().map(|tree| tree.predict(row)).sum();
                state.base_score + self.config.learning_rate * boost
            })
            .collect())
    }

    /// Scores the fit on `samples` with the coefficient of determination
    /// (R²): 1.0 is a perfect fit, 0.0 matches always predicting the mean,
    /// and worse-than-mean predictions go negative. Zero-variance targets
    /// score 0.0.
    ///
    /// # Errors
    ///
    /// Fails if the regressor is unfitted, the width mismatches, or the
    /// sample set is empty.
    pub fn score(&self, samples: &SampleSet) -> Result<f64, EstimatorError> {
        if samples.is_empty() {
            return Err(EstimatorError::EmptySampleSet);
        }
        let predictions = self.predict(samples)?;
        let targets = samples.targets();

        #[expect(clippy::cast_precision_loss)]
        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let ss_res: f64 = std::iter::zip(targets, &predictions)
            .map(|(target, prediction)| (target - prediction) * (target - prediction))
            .sum();
        let ss_tot: f64 = targets
            .iter()
            .map(|target| (target - mean) * (target - mean))
            .sum();

        if ss_tot == 0.0 {
            return Ok(0.0);
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}

/// Draws the sorted set of feature columns one tree may split on.
fn sample_columns<R>(feature_count: usize, colsample: f64, rng: &mut R) -> Vec<usize>
where
    R: rand::Rng + ?Sized,
{
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let amount = ((feature_count as f64 * colsample).ceil() as usize).clamp(1, feature_count);
    let all: Vec<usize> = (0..feature_count).collect();
    let mut columns: Vec<usize> = all.choose_multiple(rng, amount).copied().collect();
    columns.sort_unstable();
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y = 2x over a grid of x values; easily learnable by boosted stumps.
    fn linear_samples() -> SampleSet {
        #[expect(clippy::cast_precision_loss)]
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = features.iter().map(|row| 2.0 * row[0]).collect();
        SampleSet::new(features, targets).unwrap()
    }

    fn fitted(config: GradientBoostingConfig) -> GradientBoostingRegressor {
        let mut regressor = GradientBoostingRegressor::new(config);
        regressor.fit(&linear_samples()).unwrap();
        regressor
    }

    #[test]
    fn test_fit_learns_linear_data() {
        let regressor = fitted(GradientBoostingConfig {
            max_depth: 3,
            ..GradientBoostingConfig::default()
        });
        let score = regressor.score(&linear_samples()).unwrap();
        assert!(score > 0.9, "training R² was only {score}");
    }

    #[test]
    fn test_score_before_fit_is_an_error() {
        let regressor = GradientBoostingRegressor::new(GradientBoostingConfig::default());
        assert!(matches!(
            regressor.score(&linear_samples()),
            Err(EstimatorError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_rejects_empty_sample_set() {
        let empty = SampleSet::new(vec![], vec![]).unwrap();
        let mut regressor = GradientBoostingRegressor::new(GradientBoostingConfig::default());
        assert!(matches!(
            regressor.fit(&empty),
            Err(EstimatorError::EmptySampleSet)
        ));
    }

    #[test]
    fn test_predict_rejects_width_mismatch() {
        let regressor = fitted(GradientBoostingConfig::default());
        let wide = SampleSet::new(vec![vec![1.0, 2.0]], vec![0.0]).unwrap();
        assert!(matches!(
            regressor.predict(&wide),
            Err(EstimatorError::FeatureWidthMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_unsplittable_fit_scores_zero() {
        // A child minimum the size of the whole set forbids every split, so
        // the model predicts the mean and R² is 0 up to rounding noise.
        let regressor = fitted(GradientBoostingConfig {
            min_child_weight: 20,
            ..GradientBoostingConfig::default()
        });
        let score = regressor.score(&linear_samples()).unwrap();
        assert!(score.abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_targets_score_zero() {
        let regressor = fitted(GradientBoostingConfig::default());
        let flat = SampleSet::new(vec![vec![1.0], vec![2.0]], vec![5.0, 5.0]).unwrap();
        assert_eq!(regressor.score(&flat).unwrap(), 0.0);
    }

    #[test]
    fn test_fit_is_deterministic_for_a_configuration() {
        let config = GradientBoostingConfig {
            colsample_bytree: 0.5,
            seed: 7,
            ..GradientBoostingConfig::default()
        };
        let samples = linear_samples();
        let a = fitted(config).predict(&samples).unwrap();
        let b = fitted(config).predict(&samples).unwrap();
        assert_eq!(a, b);
    }
}
