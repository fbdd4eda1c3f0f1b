//! The model capability contract.
//!
//! The optimizer's only boundary with the regression model is this trait:
//! construct a model from a configuration, train it, and score it. The
//! optimizer never looks inside a handle, so swapping estimators means
//! writing another implementation, not another optimizer.

use evotune_data::SampleSet;

use crate::domain::ParamConfiguration;

/// Capability to construct, train, and score models from hyperparameter
/// configurations.
///
/// Implementations define what a model handle is ([`Self::Handle`]) and what
/// can go wrong ([`Self::Error`]); failures propagate unchanged through the
/// candidate and optimizer operations that delegate here.
pub trait ModelBackend {
    /// An owned model instance built from one configuration.
    type Handle;
    /// Backend failure type, surfaced as-is to callers.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds a fresh, untrained model for `configuration`.
    fn construct(&self, configuration: &ParamConfiguration) -> Result<Self::Handle, Self::Error>;

    /// Fits the model on `samples`.
    fn train(&self, handle: &mut Self::Handle, samples: &SampleSet) -> Result<(), Self::Error>;

    /// Scores the model on `samples`; higher is better.
    ///
    /// What an untrained model returns here is the implementation's choice
    /// (an error is fine); the optimizer treats it like any other outcome.
    fn evaluate(&self, handle: &Self::Handle, samples: &SampleSet) -> Result<f64, Self::Error>;
}
