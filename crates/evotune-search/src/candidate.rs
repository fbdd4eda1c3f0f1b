//! A single member of the search population.

use std::fmt;

use evotune_data::SampleSet;
use rand::Rng;

use crate::{
    CandidateError, ModelBackend,
    domain::{ParamConfiguration, ParamValue, ParameterDomain},
};

/// One hyperparameter configuration paired with its owned model handle and
/// its most recent evaluation score.
///
/// The configuration and the handle never drift apart: every operation that
/// writes the configuration (creation, mutation) rebuilds the handle in the
/// same call, and every operation that invalidates the trained state
/// (training, any configuration change) clears the fitness. A fitness of
/// `None` therefore always means "this candidate has no valid score", never
/// "this candidate scored zero".
pub struct Candidate<B>
where
    B: ModelBackend,
{
    configuration: ParamConfiguration,
    handle: B::Handle,
    fitness: Option<f64>,
}

impl<B> Candidate<B>
where
    B: ModelBackend,
{
    /// Creates a candidate by sampling every domain parameter uniformly.
    ///
    /// # Errors
    ///
    /// Propagates backend construction failures.
    pub fn random<R>(
        domain: &ParameterDomain,
        backend: &B,
        rng: &mut R,
    ) -> Result<Self, B::Error>
    where
        R: Rng + ?Sized,
    {
        let configuration = domain.sample(rng);
        let handle = backend.construct(&configuration)?;
        Ok(Self {
            configuration,
            handle,
            fitness: None,
        })
    }

    /// Creates a candidate from an explicit configuration.
    ///
    /// The configuration must have exactly the domain's keys; offspring
    /// built by crossover take this path.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not match the domain, or if the
    /// backend rejects it.
    pub fn from_configuration(
        domain: &ParameterDomain,
        configuration: ParamConfiguration,
        backend: &B,
    ) -> Result<Self, CandidateError<B::Error>> {
        domain
            .validate(&configuration)
            .map_err(CandidateError::InvalidConfiguration)?;
        let handle = backend
            .construct(&configuration)
            .map_err(CandidateError::Model)?;
        Ok(Self {
            configuration,
            handle,
            fitness: None,
        })
    }

    /// Fits the model on `samples`.
    ///
    /// Clears the fitness: a score measured before training no longer
    /// describes the model.
    ///
    /// # Errors
    ///
    /// Propagates backend training failures.
    pub fn train(&mut self, backend: &B, samples: &SampleSet) -> Result<(), B::Error> {
        self.fitness = None;
        backend.train(&mut self.handle, samples)
    }

    /// Scores the model on `samples` and records the score as fitness.
    ///
    /// On failure the fitness is left cleared rather than stale, so a failed
    /// evaluation can never masquerade as a legitimate score.
    ///
    /// # Errors
    ///
    /// Propagates backend evaluation failures.
    pub fn evaluate(&mut self, backend: &B, samples: &SampleSet) -> Result<f64, B::Error> {
        self.fitness = None;
        let score = backend.evaluate(&self.handle, samples)?;
        self.fitness = Some(score);
        Ok(score)
    }

    /// Replaces one parameter value and rebuilds the handle to match.
    ///
    /// The configuration is only committed once the backend has accepted it,
    /// so a construction failure leaves the candidate unchanged.
    pub(crate) fn reassign(
        &mut self,
        param: &str,
        value: ParamValue,
        backend: &B,
    ) -> Result<(), B::Error> {
        let mut configuration = self.configuration.clone();
        configuration.insert(param.to_owned(), value);
        let handle = backend.construct(&configuration)?;
        self.configuration = configuration;
        self.handle = handle;
        self.fitness = None;
        Ok(())
    }

    /// The candidate's current configuration.
    #[must_use]
    pub fn configuration(&self) -> &ParamConfiguration {
        &self.configuration
    }

    /// The most recent evaluation score, or `None` if the candidate has
    /// never been scored (or its score was invalidated).
    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// A one-line human-readable snapshot of configuration and fitness.
    #[must_use]
    pub fn describe(&self) -> String {
        let params = self
            .configuration
            .iter()
            .map(|(param, value)| format!("{param}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        match self.fitness {
            Some(fitness) => format!("fitness {fitness:.4} | {params}"),
            None => format!("unscored | {params}"),
        }
    }
}

impl<B> fmt::Debug for Candidate<B>
where
    B: ModelBackend,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("configuration", &self.configuration)
            .field("fitness", &self.fitness)
            .finish_non_exhaustive()
    }
}
