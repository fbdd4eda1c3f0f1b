//! Shared fixtures for the unit tests in this crate.

use std::collections::BTreeMap;

use evotune_data::SampleSet;

use crate::{ModelBackend, ParamConfiguration, ParamValue, ParameterDomain};

/// Backend whose "model" just remembers its configuration and whose score is
/// the sum of the configuration's numeric values. Deterministic, so tests
/// can predict every fitness from the configuration alone.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StubBackend;

#[derive(Debug, Clone)]
pub(crate) struct StubHandle {
    pub configuration: ParamConfiguration,
    pub trained: bool,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("stub backend failure")]
pub(crate) struct StubError;

impl ModelBackend for StubBackend {
    type Handle = StubHandle;
    type Error = StubError;

    fn construct(&self, configuration: &ParamConfiguration) -> Result<StubHandle, StubError> {
        Ok(StubHandle {
            configuration: configuration.clone(),
            trained: false,
        })
    }

    fn train(&self, handle: &mut StubHandle, _samples: &SampleSet) -> Result<(), StubError> {
        handle.trained = true;
        Ok(())
    }

    fn evaluate(&self, handle: &StubHandle, _samples: &SampleSet) -> Result<f64, StubError> {
        Ok(handle
            .configuration
            .values()
            .map(|value| value.as_f64())
            .sum())
    }
}

/// Backend that constructs fine but fails every train/evaluate call.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FailingBackend;

impl ModelBackend for FailingBackend {
    type Handle = ();
    type Error = StubError;

    fn construct(&self, _configuration: &ParamConfiguration) -> Result<(), StubError> {
        Ok(())
    }

    fn train(&self, _handle: &mut (), _samples: &SampleSet) -> Result<(), StubError> {
        Err(StubError)
    }

    fn evaluate(&self, _handle: &(), _samples: &SampleSet) -> Result<f64, StubError> {
        Err(StubError)
    }
}

/// The two-parameter domain used throughout these tests:
/// `a` in {1, 2, 3} and `b` in {10, 20}.
pub(crate) fn small_domain() -> ParameterDomain {
    ParameterDomain::new(BTreeMap::from([
        (
            "a".to_owned(),
            vec![ParamValue::Int(1), ParamValue::Int(2), ParamValue::Int(3)],
        ),
        (
            "b".to_owned(),
            vec![ParamValue::Int(10), ParamValue::Int(20)],
        ),
    ]))
    .unwrap()
}

/// A minimal sample set for operations that need one but ignore its content.
pub(crate) fn tiny_samples() -> SampleSet {
    SampleSet::new(vec![vec![1.0], vec![2.0]], vec![1.0, 2.0]).unwrap()
}
