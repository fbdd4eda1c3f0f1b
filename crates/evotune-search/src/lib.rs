//! Evolutionary hyperparameter search.
//!
//! This crate implements the core of the evotune workspace: a genetic
//! algorithm that evolves populations of hyperparameter configurations
//! toward higher evaluation scores.
//!
//! # Architecture
//!
//! ```text
//! ParameterDomain (allowed values per parameter)
//!     ↓ sampled into
//! Candidate (configuration + owned model handle + fitness)
//!     ↓ trained / scored through
//! ModelBackend (construct / train / evaluate capability)
//!     ↓ fitness guides
//! GeneticOptimizer (retain / random-select / breed / mutate)
//!     ↓ produces
//! Next generation
//! ```
//!
//! The optimizer never inspects model internals: everything it knows about
//! the model goes through the [`ModelBackend`] capability, so estimator
//! variants are alternative backend implementations rather than parallel
//! optimizer implementations.
//!
//! # Randomness
//!
//! Every sampling operation takes an injected [`rand::Rng`]. Seeding that
//! generator (e.g. `rand_pcg::Pcg32::seed_from_u64`) makes population
//! creation, breeding, mutation, and evolution fully deterministic, which is
//! how the tests in this crate pin down behavior.
//!
//! # Modules
//!
//! - [`domain`]: parameter domains, values, and configurations
//! - [`backend`]: the model capability contract
//! - [`candidate`]: one configuration paired with its model handle and score
//! - [`genetic`]: population creation, selection, breeding, mutation

pub use self::{
    backend::ModelBackend,
    candidate::Candidate,
    domain::{ParamConfiguration, ParamValue, ParameterDomain},
    genetic::{EvolutionParams, GeneticOptimizer},
};

pub mod backend;
pub mod candidate;
pub mod domain;
pub mod genetic;
#[cfg(test)]
mod testing;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InvalidDomainError {
    #[display("parameter domain has no parameters")]
    Empty,
    #[display("parameter {param:?} has no allowed values")]
    EmptyChoices { param: String },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InvalidConfigurationError {
    #[display("configuration is missing parameter {param:?}")]
    MissingParam { param: String },
    #[display("configuration has parameter {param:?} not present in the domain")]
    UnknownParam { param: String },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("cannot grade an empty population")]
pub struct EmptyPopulationError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("{survivors} surviving candidate(s) cannot breed {missing} offspring")]
pub struct InsufficientParentsError {
    pub survivors: usize,
    pub missing: usize,
}

/// Failure to create a candidate from an explicit configuration.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CandidateError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[display("configuration does not match the parameter domain")]
    InvalidConfiguration(InvalidConfigurationError),
    #[display("model construction failed")]
    Model(E),
}

/// Failure during a generational transition.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EvolveError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[display("not enough surviving candidates to breed")]
    InsufficientParents(InsufficientParentsError),
    #[display("breeding offspring failed")]
    Breed(CandidateError<E>),
}
