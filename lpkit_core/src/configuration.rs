//! Global defaults used when building variables and solving models
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Lower bound given to new variables when none is specified
    pub lower_bound: f64,
    /// Upper bound given to new variables when none is specified
    pub upper_bound: f64,
    /// Feasibility tolerance handed to the solver backend
    pub tolerance: f64,
    /// Backend used by [`crate::model::Model::optimize`]
    pub solver: Solver,
    /// Whether the solver backend may print to the console
    pub verbose: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: 0.,
            upper_bound: f64::INFINITY,
            tolerance: 1e-07,
            solver: Solver::Clarabel,
            verbose: false,
        }
    }
}

/// Enum used to specify the default solver to use
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Solver {
    /// Use the Clarabel interior point solver, continuous variables only
    Clarabel,
    /// Use the HiGHS solver, requires the highs feature to be enabled
    Highs,
}

/// Read the default lower bound, falling back to the built-in default if the lock is poisoned
pub(crate) fn default_lower_bound() -> f64 {
    CONFIGURATION
        .read()
        .map(|c| c.lower_bound)
        .unwrap_or(0.)
}

/// Read the default upper bound, falling back to the built-in default if the lock is poisoned
pub(crate) fn default_upper_bound() -> f64 {
    CONFIGURATION
        .read()
        .map(|c| c.upper_bound)
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod configuration_tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(config.lower_bound, 0.);
        assert!(config.upper_bound.is_infinite());
        assert_eq!(config.solver, Solver::Clarabel);
        assert!(!config.verbose);
    }
}
