//! Gradient boosting regression estimator for the evotune workspace.
//!
//! This crate is the trainable-model collaborator behind the search core's
//! [`ModelBackend`](evotune_search::ModelBackend) capability: it knows how to
//! build a regressor from a hyperparameter configuration, fit it, and score
//! it with the coefficient of determination (R²). The optimizer drives it
//! exclusively through that trait and never inspects its internals.
//!
//! # Algorithm
//!
//! The estimator is a squared-error gradient boosting machine over
//! regression trees:
//!
//! 1. Start from the training targets' mean as the base prediction
//! 2. Each round, fit a regression tree to the current residuals
//! 3. Shrink the tree's contribution by the learning rate and accumulate
//!
//! The tunable knobs mirror the classic boosted-tree surface:
//!
//! - `max_depth` - depth limit per tree
//! - `min_child_weight` - minimum samples on each side of a split
//! - `gamma` - minimum squared-error reduction for a split to be kept
//! - `colsample_bytree` - fraction of features each tree may split on
//!
//! Column subsampling is the only stochastic step; it draws from a generator
//! seeded per fit, so training is deterministic for a fixed configuration
//! and dataset.
//!
//! # Modules
//!
//! - [`config`]: typed configuration and its extraction from a
//!   [`ParamConfiguration`](evotune_search::ParamConfiguration)
//! - [`tree`]: single regression trees
//! - [`boosting`]: the boosted ensemble with fit / predict / score
//! - [`backend`]: the [`ModelBackend`](evotune_search::ModelBackend)
//!   implementation

pub use self::{
    backend::GradientBoostingBackend,
    boosting::GradientBoostingRegressor,
    config::GradientBoostingConfig,
};

pub mod backend;
pub mod boosting;
pub mod config;
pub mod tree;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EstimatorError {
    #[display("configuration is missing parameter {param:?}")]
    MissingParam { param: String },
    #[display("parameter {param:?} must be an integer")]
    ExpectedInteger { param: String },
    #[display("parameter {param:?} value {value} is out of range")]
    OutOfRange { param: String, value: f64 },
    #[display("sample set is empty")]
    EmptySampleSet,
    #[display("sample width {found} does not match the fitted width {expected}")]
    FeatureWidthMismatch { expected: usize, found: usize },
    #[display("estimator has not been fitted")]
    NotFitted,
}
