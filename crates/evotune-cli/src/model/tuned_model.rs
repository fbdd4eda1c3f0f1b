use chrono::{DateTime, Utc};
use evotune_search::ParamConfiguration;
use serde::{Deserialize, Serialize};

/// The exported result of a tuning run: the best candidate's configuration
/// with its final evaluation score and a timestamp.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TunedModel {
    pub name: String,
    pub tuned_at: DateTime<Utc>,
    pub final_fitness: f64,
    pub parameters: ParamConfiguration,
}
