//! Parameter domains: which hyperparameters exist and which discrete values
//! each one may take.

use std::{collections::BTreeMap, fmt};

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{InvalidConfigurationError, InvalidDomainError};

/// One discrete hyperparameter value.
///
/// Domains mix integer-valued parameters (tree depth) with real-valued ones
/// (regularization terms), so values carry their kind. The serde
/// representation is untagged: a JSON domain reads naturally as
/// `{"max_depth": [1, 2, 3], "gamma": [0.1, 0.2]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    /// Numeric view of the value, coercing integers.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Integer view of the value; `None` for floats.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(value),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// A full hyperparameter assignment: one selected value per domain key.
///
/// Configurations are always copied between candidates, never shared, and a
/// `BTreeMap` keeps iteration order stable so seeded runs are reproducible.
pub type ParamConfiguration = BTreeMap<String, ParamValue>;

/// The tunable parameters and the discrete values each one may take.
///
/// A domain is validated once at construction and immutable afterwards:
/// every key maps to a non-empty list of allowed values. Deserialization
/// goes through the same validation.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
///
/// use evotune_search::{ParamValue, ParameterDomain};
///
/// let domain = ParameterDomain::new(BTreeMap::from([
///     ("max_depth".to_owned(), vec![ParamValue::Int(2), ParamValue::Int(4)]),
///     ("gamma".to_owned(), vec![ParamValue::Float(0.1)]),
/// ]))
/// .unwrap();
/// assert_eq!(domain.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterDomain {
    choices: BTreeMap<String, Vec<ParamValue>>,
}

impl ParameterDomain {
    /// Validates and wraps a name → allowed-values mapping.
    ///
    /// # Errors
    ///
    /// Fails if the mapping is empty or any key has no allowed values.
    pub fn new(choices: BTreeMap<String, Vec<ParamValue>>) -> Result<Self, InvalidDomainError> {
        if choices.is_empty() {
            return Err(InvalidDomainError::Empty);
        }
        for (param, values) in &choices {
            if values.is_empty() {
                return Err(InvalidDomainError::EmptyChoices {
                    param: param.clone(),
                });
            }
        }
        Ok(Self { choices })
    }

    /// Number of tunable parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Parameter names in stable (sorted) order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.choices.keys().map(String::as_str)
    }

    /// Allowed values for `param`, or `None` if the domain has no such key.
    #[must_use]
    pub fn choices(&self, param: &str) -> Option<&[ParamValue]> {
        self.choices.get(param).map(Vec::as_slice)
    }

    /// Samples a full configuration, one uniform draw per parameter.
    pub fn sample<R>(&self, rng: &mut R) -> ParamConfiguration
    where
        R: Rng + ?Sized,
    {
        self.choices
            .iter()
            .map(|(param, values)| {
                let value = values.choose(rng).expect("domain keys have allowed values");
                (param.clone(), *value)
            })
            .collect()
    }

    /// Samples one parameter uniformly, then one of its values uniformly.
    ///
    /// The drawn value may coincide with a candidate's current value; the
    /// caller decides whether that matters.
    pub fn sample_param<R>(&self, rng: &mut R) -> (&str, ParamValue)
    where
        R: Rng + ?Sized,
    {
        let index = rng.random_range(0..self.choices.len());
        let (param, values) = self
            .choices
            .iter()
            .nth(index)
            .expect("index drawn from key range");
        let value = values.choose(rng).expect("domain keys have allowed values");
        (param.as_str(), *value)
    }

    /// Checks that `configuration` has exactly this domain's keys.
    ///
    /// # Errors
    ///
    /// Fails on the first missing or unknown parameter.
    pub fn validate(
        &self,
        configuration: &ParamConfiguration,
    ) -> Result<(), InvalidConfigurationError> {
        for param in self.choices.keys() {
            if !configuration.contains_key(param) {
                return Err(InvalidConfigurationError::MissingParam {
                    param: param.clone(),
                });
            }
        }
        for param in configuration.keys() {
            if !self.choices.contains_key(param) {
                return Err(InvalidConfigurationError::UnknownParam {
                    param: param.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for ParameterDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let choices = BTreeMap::<String, Vec<ParamValue>>::deserialize(deserializer)?;
        ParameterDomain::new(choices).map_err(serde::de::Error::custom)
    }
}
