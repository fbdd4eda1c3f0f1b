use std::{collections::BTreeMap, path::PathBuf};

use anyhow::ensure;
use chrono::Utc;
use evotune_data::{SampleSet, synthetic};
use evotune_estimator::GradientBoostingBackend;
use evotune_search::{
    EvolutionParams, GeneticOptimizer, ParamValue, ParameterDomain,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{model::tuned_model::TunedModel, util, util::Output};

const SYNTHETIC_SAMPLES: usize = 200;
const SYNTHETIC_FEATURES: usize = 8;
const SYNTHETIC_NOISE: f64 = 0.5;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TuneArg {
    /// Number of generations to evolve
    #[arg(long, default_value_t = 10)]
    generations: usize,
    /// Number of candidates per generation
    #[arg(long, default_value_t = 20)]
    population: usize,
    /// Fraction of each generation guaranteed to survive
    #[arg(long, default_value_t = 0.4)]
    retain: f64,
    /// Probability a rejected candidate survives anyway
    #[arg(long, default_value_t = 0.1)]
    random_select: f64,
    /// Probability an offspring has one parameter redrawn
    #[arg(long, default_value_t = 0.2)]
    mutate_chance: f64,
    /// Parameter domain JSON file (defaults to the built-in grid)
    #[arg(long)]
    domain: Option<PathBuf>,
    /// Dataset JSON file (defaults to a synthetic dataset)
    #[arg(long)]
    data: Option<PathBuf>,
    /// Fraction of samples held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,
    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// How many of the best candidates to report
    #[arg(long, default_value_t = 5)]
    top: usize,
    /// Output file path for the tuned model
    #[arg(long)]
    output: Option<PathBuf>,
}

/// The built-in boosted-tree search grid.
fn default_domain() -> ParameterDomain {
    let choices = BTreeMap::from([
        (
            "max_depth".to_owned(),
            (1..=10).map(ParamValue::Int).collect(),
        ),
        (
            "min_child_weight".to_owned(),
            (1..=4).map(ParamValue::Int).collect(),
        ),
        (
            "gamma".to_owned(),
            (1..=9)
                .map(|tenths| ParamValue::Float(f64::from(tenths) / 10.0))
                .collect(),
        ),
        (
            "colsample_bytree".to_owned(),
            [0.1, 0.2, 0.4, 0.6, 0.8, 1.0]
                .into_iter()
                .map(ParamValue::Float)
                .collect(),
        ),
    ]);
    ParameterDomain::new(choices).expect("built-in domain is valid")
}

pub(crate) fn run(arg: &TuneArg) -> anyhow::Result<()> {
    let TuneArg {
        generations,
        population: population_size,
        retain,
        random_select,
        mutate_chance,
        domain,
        data,
        test_fraction,
        seed,
        top,
        output,
    } = arg;
    ensure!(*generations >= 1, "at least one generation is required");
    ensure!(*population_size >= 2, "population must have at least 2 candidates");

    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    let domain = match domain {
        Some(path) => util::read_json_file("parameter domain", path)?,
        None => default_domain(),
    };
    let samples: SampleSet = match data {
        Some(path) => util::read_json_file("dataset", path)?,
        None => {
            eprintln!(
                "No dataset given; generating {SYNTHETIC_SAMPLES} synthetic samples \
                 with {SYNTHETIC_FEATURES} features"
            );
            synthetic::generate(SYNTHETIC_SAMPLES, SYNTHETIC_FEATURES, SYNTHETIC_NOISE, &mut rng)
        }
    };
    let (train, test) = samples.split(*test_fraction, &mut rng)?;
    eprintln!(
        "Tuning over {} parameters on {} training / {} evaluation samples",
        domain.len(),
        train.len(),
        test.len()
    );

    let optimizer = GeneticOptimizer::new(
        domain,
        EvolutionParams {
            retain_fraction: *retain,
            random_select_probability: *random_select,
            mutate_probability: *mutate_chance,
        },
    );
    let backend = GradientBoostingBackend::default();

    let mut population = optimizer.create_population(*population_size, &backend, &mut rng)?;
    for generation in 0..*generations {
        eprintln!("Generation #{generation}:");

        for candidate in &mut population {
            candidate.train(&backend, &train)?;
            candidate.evaluate(&backend, &test)?;
        }

        let grade = GeneticOptimizer::grade(&population)?;
        let best = population
            .iter()
            .map(GeneticOptimizer::fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        let worst = population
            .iter()
            .map(GeneticOptimizer::fitness)
            .fold(f64::INFINITY, f64::min);
        eprintln!("  Grade: {grade:.4}  Best: {best:.4}  Worst: {worst:.4}");

        // Evolve, except on the last generation.
        if generation + 1 < *generations {
            population = optimizer.evolve(population, &backend, &mut rng)?;
        }
    }

    population.sort_by(|a, b| {
        GeneticOptimizer::fitness(b).total_cmp(&GeneticOptimizer::fitness(a))
    });

    eprintln!("Top candidates:");
    for (i, candidate) in population.iter().take(*top).enumerate() {
        eprintln!("  {i:2}: {}", candidate.describe());
    }

    let best = population.first().expect("population is non-empty");
    let model = TunedModel {
        name: "gradient-boosting".to_owned(),
        tuned_at: Utc::now(),
        final_fitness: GeneticOptimizer::fitness(best),
        parameters: best.configuration().clone(),
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Tuned model saved");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Tuned at: {}", model.tuned_at);
    eprintln!("  Final fitness: {:.4}", model.final_fitness);

    Ok(())
}
