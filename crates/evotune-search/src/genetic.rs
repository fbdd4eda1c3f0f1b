//! Genetic algorithm for evolving hyperparameter configurations.
//!
//! The optimizer maintains a fixed-size population of [`Candidate`]s and
//! produces each next generation with a retain / random-select / breed /
//! mutate scheme:
//!
//! 1. **Rank** - Sort the population by fitness, best first
//! 2. **Retain** - The top `retain_fraction` survive unconditionally
//! 3. **Random select** - Each lower-ranked candidate survives anyway with
//!    probability `random_select_probability`, preserving diversity
//! 4. **Breed** - Random pairs of distinct survivors produce offspring via
//!    uniform crossover (each parameter copied from either parent with equal
//!    probability) until the population is back to size
//! 5. **Mutate** - Each offspring, with probability `mutate_probability`,
//!    has one parameter redrawn uniformly from its allowed values
//!
//! Survivors move into the next generation unchanged: same configuration,
//! same trained handle, same fitness. Offspring start untrained and
//! unscored.
//!
//! # Caller protocol
//!
//! The optimizer assumes one full train-then-evaluate pass over the
//! population between calls to [`GeneticOptimizer::evolve`]; it is the
//! driver's job to enforce that barrier. On the final generation the
//! population is only ranked and reported, not evolved.
//!
//! # Example
//!
//! ```rust,ignore
//! let optimizer = GeneticOptimizer::new(domain, EvolutionParams::default());
//! let mut population = optimizer.create_population(20, &backend, &mut rng)?;
//! for generation in 0..generations {
//!     for candidate in &mut population {
//!         candidate.train(&backend, &train)?;
//!         candidate.evaluate(&backend, &test)?;
//!     }
//!     if generation + 1 < generations {
//!         population = optimizer.evolve(population, &backend, &mut rng)?;
//!     }
//! }
//! ```

use rand::Rng;

use crate::{
    Candidate, CandidateError, EmptyPopulationError, EvolveError, InsufficientParentsError,
    InvalidConfigurationError, ModelBackend,
    domain::{ParamConfiguration, ParameterDomain},
};

/// Evolution hyperparameters, fixed for the lifetime of an optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionParams {
    /// Fraction of the ranked population guaranteed to survive, in `(0, 1]`.
    pub retain_fraction: f64,
    /// Probability a below-cutoff candidate survives anyway, in `[0, 1]`.
    pub random_select_probability: f64,
    /// Probability an offspring has one parameter redrawn, in `[0, 1]`.
    pub mutate_probability: f64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            retain_fraction: 0.4,
            random_select_probability: 0.1,
            mutate_probability: 0.2,
        }
    }
}

/// Evolves populations of hyperparameter configurations.
///
/// Owns the [`ParameterDomain`] and the [`EvolutionParams`]; model handling
/// is delegated to a [`ModelBackend`] passed into each operation, and all
/// randomness comes from the injected [`Rng`].
#[derive(Debug, Clone)]
pub struct GeneticOptimizer {
    domain: ParameterDomain,
    params: EvolutionParams,
}

impl GeneticOptimizer {
    /// Creates an optimizer over `domain` with the given evolution
    /// parameters.
    ///
    /// # Panics
    ///
    /// Panics if a parameter is outside its documented range; these are
    /// programming errors, not runtime conditions.
    #[must_use]
    pub fn new(domain: ParameterDomain, params: EvolutionParams) -> Self {
        assert!(
            params.retain_fraction > 0.0 && params.retain_fraction <= 1.0,
            "retain fraction must be in (0, 1]"
        );
        assert!(
            (0.0..=1.0).contains(&params.random_select_probability),
            "random select probability must be in [0, 1]"
        );
        assert!(
            (0.0..=1.0).contains(&params.mutate_probability),
            "mutate probability must be in [0, 1]"
        );
        Self { domain, params }
    }

    /// The parameter domain this optimizer searches.
    #[must_use]
    pub fn domain(&self) -> &ParameterDomain {
        &self.domain
    }

    /// Creates `size` candidates with uniformly sampled configurations.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    ///
    /// # Errors
    ///
    /// Propagates backend construction failures.
    pub fn create_population<B, R>(
        &self,
        size: usize,
        backend: &B,
        rng: &mut R,
    ) -> Result<Vec<Candidate<B>>, B::Error>
    where
        B: ModelBackend,
        R: Rng + ?Sized,
    {
        assert!(size >= 1, "population size must be at least 1");
        (0..size)
            .map(|_| Candidate::random(&self.domain, backend, rng))
            .collect()
    }

    /// Ranking fitness of a candidate: its score, or 0.0 if unscored.
    ///
    /// The zero default keeps unscored candidates comparable without giving
    /// them an advantage; [`Candidate::fitness`] still tells the two cases
    /// apart.
    #[must_use]
    pub fn fitness<B>(candidate: &Candidate<B>) -> f64
    where
        B: ModelBackend,
    {
        candidate.fitness().unwrap_or(0.0)
    }

    /// Arithmetic mean fitness over the population.
    ///
    /// # Errors
    ///
    /// Fails with [`EmptyPopulationError`] on an empty population.
    pub fn grade<B>(population: &[Candidate<B>]) -> Result<f64, EmptyPopulationError>
    where
        B: ModelBackend,
    {
        if population.is_empty() {
            return Err(EmptyPopulationError);
        }
        let total: f64 = population.iter().map(Self::fitness).sum();
        #[expect(clippy::cast_precision_loss)]
        let count = population.len() as f64;
        Ok(total / count)
    }

    /// Breeds exactly two offspring from a pair of parents.
    ///
    /// For each child and each domain parameter independently, the value is
    /// copied from either parent with equal probability, so children mix
    /// parameters rather than cloning one parent. Each child is then
    /// independently mutated with probability `mutate_probability`.
    ///
    /// # Errors
    ///
    /// Fails if a parent's configuration does not match this optimizer's
    /// domain, or on a backend failure.
    pub fn breed<B, R>(
        &self,
        mother: &Candidate<B>,
        father: &Candidate<B>,
        backend: &B,
        rng: &mut R,
    ) -> Result<Vec<Candidate<B>>, CandidateError<B::Error>>
    where
        B: ModelBackend,
        R: Rng + ?Sized,
    {
        let mut children = Vec::with_capacity(2);
        for _ in 0..2 {
            let mut configuration = ParamConfiguration::new();
            for param in self.domain.params() {
                let source = if rng.random_bool(0.5) { mother } else { father };
                let value = source.configuration().get(param).copied().ok_or_else(|| {
                    CandidateError::InvalidConfiguration(InvalidConfigurationError::MissingParam {
                        param: param.to_owned(),
                    })
                })?;
                configuration.insert(param.to_owned(), value);
            }

            let mut child = Candidate::from_configuration(&self.domain, configuration, backend)?;
            if rng.random_bool(self.params.mutate_probability) {
                self.mutate(&mut child, backend, rng)
                    .map_err(CandidateError::Model)?;
            }
            children.push(child);
        }
        Ok(children)
    }

    /// Redraws one uniformly chosen parameter of `candidate` from its
    /// allowed values, rebuilding the model handle to match.
    ///
    /// The new value may coincide with the old one; mutation makes a draw,
    /// not a change, and the candidate's score is cleared either way.
    ///
    /// # Errors
    ///
    /// Propagates backend construction failures.
    pub fn mutate<B, R>(
        &self,
        candidate: &mut Candidate<B>,
        backend: &B,
        rng: &mut R,
    ) -> Result<(), B::Error>
    where
        B: ModelBackend,
        R: Rng + ?Sized,
    {
        let (param, value) = self.domain.sample_param(rng);
        candidate.reassign(param, value, backend)
    }

    /// Produces the next generation from an evaluated population.
    ///
    /// Survivors (the retained top plus the randomly selected rest) move
    /// into the result unchanged; offspring bred from random distinct
    /// survivor pairs fill the remaining slots, with the surplus child of
    /// the final breed discarded. Whenever offspring are needed and at
    /// least two survivors exist, the result has exactly the input's
    /// length.
    ///
    /// If random selection alone already fills (or overfills) the
    /// population, the survivor list is returned as-is; a temporarily
    /// oversized population shrinks back on the next call.
    ///
    /// # Errors
    ///
    /// Fails with [`EvolveError::InsufficientParents`] when offspring are
    /// needed but fewer than two candidates survived selection; breeding
    /// failures surface as [`EvolveError::Breed`].
    pub fn evolve<B, R>(
        &self,
        population: Vec<Candidate<B>>,
        backend: &B,
        rng: &mut R,
    ) -> Result<Vec<Candidate<B>>, EvolveError<B::Error>>
    where
        B: ModelBackend,
        R: Rng + ?Sized,
    {
        let target = population.len();

        let mut parents = population;
        parents.sort_by(|a, b| Self::fitness(b).total_cmp(&Self::fitness(a)));

        #[expect(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let retain_count = (target as f64 * self.params.retain_fraction).floor() as usize;

        let rejected = parents.split_off(retain_count);
        for candidate in rejected {
            if rng.random_bool(self.params.random_select_probability) {
                parents.push(candidate);
            }
        }

        let desired = target.saturating_sub(parents.len());
        if desired == 0 {
            return Ok(parents);
        }
        if parents.len() < 2 {
            return Err(EvolveError::InsufficientParents(InsufficientParentsError {
                survivors: parents.len(),
                missing: desired,
            }));
        }

        let mut children = Vec::with_capacity(desired);
        while children.len() < desired {
            let mother = rng.random_range(0..parents.len());
            let father = rng.random_range(0..parents.len());
            if mother == father {
                continue;
            }
            let offspring = self
                .breed(&parents[mother], &parents[father], backend, rng)
                .map_err(EvolveError::Breed)?;
            for child in offspring {
                if children.len() < desired {
                    children.push(child);
                }
            }
        }

        parents.extend(children);
        Ok(parents)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::{
        ParamValue,
        testing::{self, StubBackend},
    };

    use super::*;

    fn optimizer(params: EvolutionParams) -> GeneticOptimizer {
        GeneticOptimizer::new(testing::small_domain(), params)
    }

    fn configuration(a: i64, b: i64) -> ParamConfiguration {
        BTreeMap::from([
            ("a".to_owned(), ParamValue::Int(a)),
            ("b".to_owned(), ParamValue::Int(b)),
        ])
    }

    /// Builds candidates from explicit configurations and scores each with
    /// the stub backend (fitness = sum of the configuration's values).
    fn evaluated_population(configs: &[(i64, i64)]) -> Vec<Candidate<StubBackend>> {
        let domain = testing::small_domain();
        let samples = testing::tiny_samples();
        configs
            .iter()
            .map(|&(a, b)| {
                let mut candidate =
                    Candidate::from_configuration(&domain, configuration(a, b), &StubBackend)
                        .unwrap();
                candidate.train(&StubBackend, &samples).unwrap();
                candidate.evaluate(&StubBackend, &samples).unwrap();
                candidate
            })
            .collect()
    }

    #[test]
    fn test_create_population_size_and_validity() {
        let optimizer = optimizer(EvolutionParams::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let population = optimizer
            .create_population(8, &StubBackend, &mut rng)
            .unwrap();
        assert_eq!(population.len(), 8);
        for candidate in &population {
            assert_eq!(candidate.fitness(), None);
            for (param, value) in candidate.configuration() {
                assert!(optimizer.domain().choices(param).unwrap().contains(value));
            }
        }
    }

    #[test]
    fn test_grade_is_the_mean_fitness() {
        // Sums: 11 and 22, mean 16.5.
        let population = evaluated_population(&[(1, 10), (2, 20)]);
        let grade = GeneticOptimizer::grade(&population).unwrap();
        assert!((grade - 16.5).abs() < 1e-12);
    }

    #[test]
    fn test_grade_rejects_empty_population() {
        let population: Vec<Candidate<StubBackend>> = vec![];
        assert!(matches!(
            GeneticOptimizer::grade(&population),
            Err(EmptyPopulationError)
        ));
    }

    #[test]
    fn test_breed_returns_two_children_mixing_parent_values() {
        let optimizer = optimizer(EvolutionParams {
            mutate_probability: 0.0,
            ..EvolutionParams::default()
        });
        let parents = evaluated_population(&[(1, 10), (3, 20)]);

        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let children = optimizer
                .breed(&parents[0], &parents[1], &StubBackend, &mut rng)
                .unwrap();
            assert_eq!(children.len(), 2);
            for child in &children {
                assert_eq!(child.fitness(), None);
                for (param, value) in child.configuration() {
                    let mother = parents[0].configuration()[param];
                    let father = parents[1].configuration()[param];
                    assert!(*value == mother || *value == father);
                }
            }
        }
    }

    #[test]
    fn test_mutate_redraws_at_most_one_param() {
        let optimizer = optimizer(EvolutionParams::default());
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut population = evaluated_population(&[(1, 10)]);
            let candidate = &mut population[0];
            let before = candidate.configuration().clone();

            optimizer.mutate(candidate, &StubBackend, &mut rng).unwrap();

            let after = candidate.configuration();
            let changed = before
                .iter()
                .filter(|(param, value)| after[*param] != **value)
                .count();
            assert!(changed <= 1);
            for (param, value) in after {
                assert!(optimizer.domain().choices(param).unwrap().contains(value));
            }
            assert_eq!(candidate.fitness(), None);
        }
    }

    #[test]
    fn test_evolve_preserves_population_size() {
        for &size in &[4_usize, 5, 8, 12] {
            for &retain in &[0.3, 0.5, 0.75] {
                for seed in 0..5 {
                    let optimizer = optimizer(EvolutionParams {
                        retain_fraction: retain,
                        random_select_probability: 0.0,
                        mutate_probability: 0.2,
                    });
                    let mut rng = Pcg32::seed_from_u64(seed);
                    let mut population = optimizer
                        .create_population(size, &StubBackend, &mut rng)
                        .unwrap();
                    let samples = testing::tiny_samples();
                    for candidate in &mut population {
                        candidate.train(&StubBackend, &samples).unwrap();
                        candidate.evaluate(&StubBackend, &samples).unwrap();
                    }

                    let next = optimizer.evolve(population, &StubBackend, &mut rng).unwrap();
                    assert_eq!(next.len(), size, "size {size}, retain {retain}, seed {seed}");
                }
            }
        }
    }

    #[test]
    fn test_evolve_retains_top_candidates_and_breeds_the_rest() {
        // Sums: 23, 21, 12, 11; the first two survive.
        let population = evaluated_population(&[(3, 20), (1, 20), (2, 10), (1, 10)]);
        let optimizer = optimizer(EvolutionParams {
            retain_fraction: 0.5,
            random_select_probability: 0.0,
            mutate_probability: 0.0,
        });

        let mut rng = Pcg32::seed_from_u64(17);
        let next = optimizer.evolve(population, &StubBackend, &mut rng).unwrap();

        assert_eq!(next.len(), 4);
        assert_eq!(next[0].fitness(), Some(23.0));
        assert_eq!(next[0].configuration(), &configuration(3, 20));
        assert_eq!(next[1].fitness(), Some(21.0));
        assert_eq!(next[1].configuration(), &configuration(1, 20));

        // Offspring mix survivor values only and start unscored.
        for child in &next[2..] {
            assert_eq!(child.fitness(), None);
            for (param, value) in child.configuration() {
                let top = next[0].configuration()[param];
                let second = next[1].configuration()[param];
                assert!(*value == top || *value == second);
            }
        }
    }

    #[test]
    fn test_evolve_with_full_retention_only_sorts() {
        let population = evaluated_population(&[(1, 10), (3, 20), (2, 10)]);
        let optimizer = optimizer(EvolutionParams {
            retain_fraction: 1.0,
            random_select_probability: 0.0,
            mutate_probability: 0.0,
        });

        let mut rng = Pcg32::seed_from_u64(3);
        let next = optimizer.evolve(population, &StubBackend, &mut rng).unwrap();

        let fitnesses: Vec<_> = next.iter().map(|c| c.fitness()).collect();
        assert_eq!(
            fitnesses,
            vec![Some(23.0), Some(12.0), Some(11.0)],
            "same candidates, sorted descending, no offspring"
        );
    }

    #[test]
    fn test_evolve_fails_without_breeding_pair() {
        // retain_count = floor(2 * 0.4) = 0 and random selection is off, so
        // no candidate survives and the two offspring cannot be bred.
        let population = evaluated_population(&[(1, 10), (2, 20)]);
        let optimizer = optimizer(EvolutionParams {
            retain_fraction: 0.4,
            random_select_probability: 0.0,
            mutate_probability: 0.0,
        });

        let mut rng = Pcg32::seed_from_u64(0);
        let result = optimizer.evolve(population, &StubBackend, &mut rng);
        assert!(matches!(
            result,
            Err(EvolveError::InsufficientParents(InsufficientParentsError {
                survivors: 0,
                missing: 2,
            }))
        ));
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let run = |seed: u64| -> Vec<ParamConfiguration> {
            let optimizer = optimizer(EvolutionParams::default());
            let samples = testing::tiny_samples();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut population = optimizer
                .create_population(6, &StubBackend, &mut rng)
                .unwrap();
            for _ in 0..3 {
                for candidate in &mut population {
                    candidate.train(&StubBackend, &samples).unwrap();
                    candidate.evaluate(&StubBackend, &samples).unwrap();
                }
                population = optimizer.evolve(population, &StubBackend, &mut rng).unwrap();
            }
            population
                .into_iter()
                .map(|candidate| candidate.configuration().clone())
                .collect()
        };

        assert_eq!(run(99), run(99));
        assert_ne!(run(99), run(100), "different seeds should diverge");
    }
}
