use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};

use crate::DataError;

/// A set of regression samples: one feature row and one target per sample.
///
/// The matrix is validated on construction (and on deserialization, which
/// goes through the same path): every row has the same width and the number
/// of rows matches the number of targets. A `SampleSet` may be empty; it is
/// the consumer's job to reject empty sets where they make no sense.
///
/// # Example
///
/// ```
/// use evotune_data::SampleSet;
///
/// let samples = SampleSet::new(
///     vec![vec![1.0, 2.0], vec![3.0, 4.0]],
///     vec![10.0, 20.0],
/// )
/// .unwrap();
/// assert_eq!(samples.len(), 2);
/// assert_eq!(samples.feature_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSet {
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl SampleSet {
    /// Creates a sample set from raw rows and targets.
    ///
    /// # Errors
    ///
    /// Fails if the row and target counts differ or any row's width differs
    /// from the first row's.
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self, DataError> {
        if features.len() != targets.len() {
            return Err(DataError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        let expected = features.first().map_or(0, Vec::len);
        for (row, values) in features.iter().enumerate() {
            if values.len() != expected {
                return Err(DataError::RaggedRow {
                    row,
                    width: values.len(),
                    expected,
                });
            }
        }
        Ok(Self { features, targets })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Width of every feature row (0 for an empty set).
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    /// Feature rows, one per sample.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Regression targets, one per sample.
    #[must_use]
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Splits into `(train, test)` with `test_fraction` of samples held out.
    ///
    /// Sample order is shuffled with `rng` before the cut, so a seeded
    /// generator yields a reproducible split.
    ///
    /// # Errors
    ///
    /// Fails with [`DataError::BadSplitFraction`] if the fraction does not
    /// leave at least one sample on each side.
    pub fn split<R>(&self, test_fraction: f64, rng: &mut R) -> Result<(Self, Self), DataError>
    where
        R: Rng + ?Sized,
    {
        #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let test_len = (self.len() as f64 * test_fraction).round() as usize;
        if !(test_fraction > 0.0 && test_fraction < 1.0) || test_len == 0 || test_len >= self.len()
        {
            return Err(DataError::BadSplitFraction {
                fraction: test_fraction,
            });
        }

        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);
        let (test_indices, train_indices) = indices.split_at(test_len);

        Ok((self.select(train_indices), self.select(test_indices)))
    }

    fn select(&self, indices: &[usize]) -> Self {
        let features = indices.iter().map(|&i| self.features[i].clone()).collect();
        let targets = indices.iter().map(|&i| self.targets[i]).collect();
        Self { features, targets }
    }
}

impl<'de> Deserialize<'de> for SampleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            features: Vec<Vec<f64>>,
            targets: Vec<f64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        SampleSet::new(raw.features, raw.targets).map_err(serde::de::Error::custom)
    }
}
