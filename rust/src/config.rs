//! Configuration types for the CPM engine.

use pyo3::prelude::*;

/// Configuration for a calculation run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct CpmConfig {
    /// Upper bound on activity count, rejecting pathological inputs
    /// (None = unlimited).
    #[pyo3(get, set)]
    pub max_activities: Option<usize>,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for CpmConfig {
    fn default() -> Self {
        Self {
            max_activities: None,
            verbosity: 0,
        }
    }
}

#[pymethods]
impl CpmConfig {
    #[new]
    #[pyo3(signature = (max_activities=None, verbosity=0))]
    fn new(max_activities: Option<usize>, verbosity: u8) -> Self {
        Self {
            max_activities,
            verbosity,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "CpmConfig(max_activities={:?}, verbosity={})",
            self.max_activities, self.verbosity
        )
    }
}
