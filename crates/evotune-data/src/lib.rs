//! Regression sample handling for the evotune workspace.
//!
//! This crate provides the data substrate the tuner operates on:
//!
//! - [`SampleSet`]: a validated feature matrix paired with regression targets
//! - [`SampleSet::split`]: seeded, shuffled train/test splitting
//! - [`synthetic`]: reproducible synthetic regression data generation
//!
//! All randomness is drawn from an injected [`rand::Rng`], so callers that
//! seed their generator get identical splits and datasets across runs.

pub use self::sample_set::SampleSet;

pub mod sample_set;
pub mod synthetic;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DataError {
    #[display("feature rows ({features}) and targets ({targets}) differ in length")]
    LengthMismatch { features: usize, targets: usize },
    #[display("feature row {row} has {width} values, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[display("test fraction {fraction} leaves an empty train or test set")]
    BadSplitFraction { fraction: f64 },
}
