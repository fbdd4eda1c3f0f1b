//! Typed boosting configuration and its extraction from a tuned
//! hyperparameter configuration.

use evotune_search::{ParamConfiguration, ParamValue};

use crate::EstimatorError;

/// Full configuration of a [`GradientBoostingRegressor`].
///
/// The first four fields are the tunable surface the optimizer searches
/// over; the rest are fixed by the driver (via
/// [`GradientBoostingBackend`](crate::GradientBoostingBackend)) for the
/// whole run.
///
/// [`GradientBoostingRegressor`]: crate::GradientBoostingRegressor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientBoostingConfig {
    /// Depth limit per tree (≥ 1).
    pub max_depth: usize,
    /// Minimum samples required on each side of a split (≥ 1).
    pub min_child_weight: usize,
    /// Minimum squared-error reduction for a split to be kept (≥ 0).
    pub gamma: f64,
    /// Fraction of features each tree may split on, in `(0, 1]`.
    pub colsample_bytree: f64,
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Shrinkage applied to every tree's contribution.
    pub learning_rate: f64,
    /// Seed for the per-fit column subsampling generator.
    pub seed: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_child_weight: 1,
            gamma: 0.0,
            colsample_bytree: 1.0,
            rounds: 100,
            learning_rate: 0.3,
            seed: 0,
        }
    }
}

impl GradientBoostingConfig {
    /// Extracts the tunable fields from a hyperparameter configuration,
    /// leaving the fixed fields at their defaults.
    ///
    /// # Errors
    ///
    /// Fails if a tuned parameter is missing, has the wrong kind, or is out
    /// of its valid range.
    pub fn from_configuration(
        configuration: &ParamConfiguration,
    ) -> Result<Self, EstimatorError> {
        let max_depth = require_count(configuration, "max_depth")?;
        let min_child_weight = require_count(configuration, "min_child_weight")?;

        let gamma = require_f64(configuration, "gamma")?;
        if gamma < 0.0 {
            return Err(EstimatorError::OutOfRange {
                param: "gamma".to_owned(),
                value: gamma,
            });
        }

        let colsample_bytree = require_f64(configuration, "colsample_bytree")?;
        if !(colsample_bytree > 0.0 && colsample_bytree <= 1.0) {
            return Err(EstimatorError::OutOfRange {
                param: "colsample_bytree".to_owned(),
                value: colsample_bytree,
            });
        }

        Ok(Self {
            max_depth,
            min_child_weight,
            gamma,
            colsample_bytree,
            ..Self::default()
        })
    }
}

fn require(
    configuration: &ParamConfiguration,
    param: &str,
) -> Result<ParamValue, EstimatorError> {
    configuration
        .get(param)
        .copied()
        .ok_or_else(|| EstimatorError::MissingParam {
            param: param.to_owned(),
        })
}

/// Extracts a positive integer parameter.
fn require_count(configuration: &ParamConfiguration, param: &str) -> Result<usize, EstimatorError> {
    let value = require(configuration, param)?;
    let int = value.as_i64().ok_or_else(|| EstimatorError::ExpectedInteger {
        param: param.to_owned(),
    })?;
    usize::try_from(int)
        .ok()
        .filter(|&count| count >= 1)
        .ok_or(EstimatorError::OutOfRange {
            param: param.to_owned(),
            value: value.as_f64(),
        })
}

fn require_f64(configuration: &ParamConfiguration, param: &str) -> Result<f64, EstimatorError> {
    require(configuration, param).map(ParamValue::as_f64)
}
