use std::path::PathBuf;

use anyhow::ensure;
use evotune_data::synthetic;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateDataArg {
    /// Number of samples to generate
    #[arg(long, default_value_t = 200)]
    samples: usize,
    /// Number of features per sample
    #[arg(long, default_value_t = 8)]
    features: usize,
    /// Standard deviation of the observation noise
    #[arg(long, default_value_t = 0.5)]
    noise: f64,
    /// Seed for reproducible datasets
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateDataArg) -> anyhow::Result<()> {
    let GenerateDataArg {
        samples,
        features,
        noise,
        seed,
        output,
    } = arg;
    ensure!(*samples >= 1, "at least one sample is required");
    ensure!(*features >= 1, "at least one feature is required");
    ensure!(*noise >= 0.0, "noise must be non-negative");

    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let dataset = synthetic::generate(*samples, *features, *noise, &mut rng);
    Output::save_json(&dataset, output.clone())?;

    eprintln!(
        "Generated {} samples with {} features",
        dataset.len(),
        dataset.feature_count()
    );
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }

    Ok(())
}
