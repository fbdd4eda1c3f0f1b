//! The search core's [`ModelBackend`] capability, implemented with the
//! gradient boosting regressor.

use evotune_data::SampleSet;
use evotune_search::{ModelBackend, ParamConfiguration};

use crate::{
    EstimatorError, boosting::GradientBoostingRegressor, config::GradientBoostingConfig,
};

/// Backend that builds a [`GradientBoostingRegressor`] per candidate.
///
/// The public fields are the boosting settings the optimizer does *not*
/// search over; the driver fixes them once for a whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientBoostingBackend {
    /// Number of boosting rounds per fit.
    pub rounds: usize,
    /// Shrinkage applied to every tree's contribution.
    pub learning_rate: f64,
    /// Seed for each fit's column subsampling.
    pub seed: u64,
}

impl Default for GradientBoostingBackend {
    fn default() -> Self {
        let defaults = GradientBoostingConfig::default();
        Self {
            rounds: defaults.rounds,
            learning_rate: defaults.learning_rate,
            seed: defaults.seed,
        }
    }
}

impl ModelBackend for GradientBoostingBackend {
    type Handle = GradientBoostingRegressor;
    type Error = EstimatorError;

    fn construct(
        &self,
        configuration: &ParamConfiguration,
    ) -> Result<GradientBoostingRegressor, EstimatorError> {
        let mut config = GradientBoostingConfig::from_configuration(configuration)?;
        config.rounds = self.rounds;
        config.learning_rate = self.learning_rate;
        config.seed = self.seed;
        Ok(GradientBoostingRegressor::new(config))
    }

    fn train(
        &self,
        handle: &mut GradientBoostingRegressor,
        samples: &SampleSet,
    ) -> Result<(), EstimatorError> {
        handle.fit(samples)
    }

    fn evaluate(
        &self,
        handle: &GradientBoostingRegressor,
        samples: &SampleSet,
    ) -> Result<f64, EstimatorError> {
        handle.score(samples)
    }
}
