//! Solver backends a [`crate::model::Model`] can be handed to
//!
//! Every backend implements [`Solver`]. The model adds its variables and constraints
//! one at a time, referring to variables by the position returned when they were added,
//! and then calls [`Solver::solve`].
use cfg_if::cfg_if;
use thiserror::Error;

use crate::configuration;
use crate::model::variable::VarType;
use crate::optimize::{ObjectiveSense, ProblemSolution};

pub mod clarabel;
#[cfg(feature = "highs")]
pub mod highs;

/// Interface every solver backend provides
pub trait Solver {
    /// Human-readable name of the backend
    fn name(&self) -> &'static str;

    /// Can the backend handle integer variables
    fn integer_variable_capable(&self) -> bool;

    /// Can the backend handle binary variables
    fn binary_variable_capable(&self) -> bool;

    /// Does the backend report dual values for the constraints
    fn dual_values_capable(&self) -> bool;

    /// Is the backend an interior point (barrier) method
    fn interior_point(&self) -> bool;

    /// Add a continuous variable, returning its position
    fn add_continuous_variable(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, SolverError>;

    /// Add an integer variable, returning its position
    fn add_integer_variable(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, SolverError>;

    /// Add a binary variable, returning its position
    fn add_binary_variable(&mut self) -> Result<usize, SolverError>;

    /// Add the constraint `terms = equals`, returning its position
    fn add_equality_constraint(
        &mut self,
        terms: &[(usize, f64)],
        equals: f64,
    ) -> Result<usize, SolverError>;

    /// Add the constraint `lower_bound <= terms <= upper_bound`, returning its position
    ///
    /// Either bound may be infinite.
    fn add_inequality_constraint(
        &mut self,
        terms: &[(usize, f64)],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, SolverError>;

    /// Add `coefficient * variable` to the objective
    fn add_linear_objective_term(
        &mut self,
        variable: usize,
        coefficient: f64,
    ) -> Result<(), SolverError>;

    /// Set whether the objective is minimized or maximized
    fn set_objective_sense(&mut self, objective_sense: ObjectiveSense) -> Result<(), SolverError>;

    /// Solve the problem
    fn solve(&mut self) -> Result<ProblemSolution, SolverError>;
}

/// Settings shared by all backends
#[derive(Copy, Clone, Debug)]
pub struct SolverSettings {
    /// Feasibility tolerance
    pub tolerance: f64,
    /// Allow the backend to print progress
    pub verbose: bool,
}

impl SolverSettings {
    /// Settings taken from the global configuration
    pub fn from_configuration() -> Self {
        match configuration::CONFIGURATION.read() {
            Ok(config) => SolverSettings {
                tolerance: config.tolerance,
                verbose: config.verbose,
            },
            Err(_) => SolverSettings::default(),
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            tolerance: 1e-07,
            verbose: false,
        }
    }
}

/// Create a new, empty backend of the requested kind
pub fn new_solver(
    kind: configuration::Solver,
    settings: SolverSettings,
) -> Result<Box<dyn Solver>, SolverError> {
    match kind {
        configuration::Solver::Clarabel => {
            Ok(Box::new(clarabel::ClarabelSolver::new(settings)))
        }
        configuration::Solver::Highs => {
            cfg_if! {
                if #[cfg(feature = "highs")] {
                    Ok(Box::new(highs::HighsSolver::new(settings)))
                } else {
                    Err(SolverError::Unavailable("HiGHS"))
                }
            }
        }
    }
}

// region Staged Problem
/// A variable as handed to a backend
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StagedColumn {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub variable_type: VarType,
}

/// A constraint row `lower_bound <= terms <= upper_bound` as handed to a backend
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StagedRow {
    pub terms: Vec<(usize, f64)>,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub equality: bool,
}

/// Problem data collected by backends which only build their native problem in `solve`
#[derive(Clone, Debug, Default)]
pub(crate) struct StagedProblem {
    pub columns: Vec<StagedColumn>,
    pub objective: Vec<f64>,
    pub rows: Vec<StagedRow>,
    pub sense: ObjectiveSense,
}

impl StagedProblem {
    pub fn add_column(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        variable_type: VarType,
    ) -> Result<usize, SolverError> {
        if lower_bound > upper_bound {
            return Err(SolverError::InvalidBounds {
                lower_bound,
                upper_bound,
            });
        }
        self.columns.push(StagedColumn {
            lower_bound,
            upper_bound,
            variable_type,
        });
        self.objective.push(0.);
        Ok(self.columns.len() - 1)
    }

    pub fn add_row(
        &mut self,
        terms: &[(usize, f64)],
        lower_bound: f64,
        upper_bound: f64,
        equality: bool,
    ) -> Result<usize, SolverError> {
        if let Some((col, _)) = terms.iter().find(|(col, _)| *col >= self.columns.len()) {
            return Err(SolverError::UnknownVariable(*col));
        }
        if lower_bound > upper_bound {
            return Err(SolverError::InvalidBounds {
                lower_bound,
                upper_bound,
            });
        }
        self.rows.push(StagedRow {
            terms: terms.to_vec(),
            lower_bound,
            upper_bound,
            equality,
        });
        Ok(self.rows.len() - 1)
    }

    pub fn add_objective_term(&mut self, variable: usize, coefficient: f64) -> Result<(), SolverError> {
        match self.objective.get_mut(variable) {
            Some(cost) => {
                *cost += coefficient;
                Ok(())
            }
            None => Err(SolverError::UnknownVariable(variable)),
        }
    }

    /// Objective value of a point in the original sense of the problem
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(cost, value)| cost * value)
            .sum()
    }
}
// endregion Staged Problem

/// Errors raised by solver backends
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    /// The backend can't handle variables of this type
    #[error("{solver} does not support {variable_type} variables")]
    UnsupportedVariableType {
        solver: &'static str,
        variable_type: VarType,
    },
    /// A term referred to a variable position which was never added
    #[error("Variable at position {0} was never added to the solver")]
    UnknownVariable(usize),
    /// Bounds with lower > upper
    #[error("Invalid bounds, lower bound {lower_bound} > upper bound {upper_bound}")]
    InvalidBounds { lower_bound: f64, upper_bound: f64 },
    /// The backend was not compiled in
    #[error("Solver {0} is not available, enable the corresponding feature")]
    Unavailable(&'static str),
    /// The backend rejected its settings
    #[error("Invalid solver settings: {0}")]
    InvalidSettings(String),
    /// The backend rejected the problem data
    #[error("Solver failed to set up the problem: {0}")]
    Setup(String),
}

#[cfg(test)]
mod solvers_tests {
    use super::*;

    #[test]
    fn staged_problem_rejects_unknown_columns() {
        let mut problem = StagedProblem::default();
        let x = problem.add_column(0., 1., VarType::Continuous).unwrap();
        assert_eq!(x, 0);
        assert!(matches!(
            problem.add_row(&[(3, 1.)], 0., 1., false),
            Err(SolverError::UnknownVariable(3))
        ));
        assert!(matches!(
            problem.add_objective_term(1, 1.),
            Err(SolverError::UnknownVariable(1))
        ));
        assert!(matches!(
            problem.add_column(2., 1., VarType::Continuous),
            Err(SolverError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn staged_objective_value() {
        let mut problem = StagedProblem::default();
        problem.add_column(0., 1., VarType::Continuous).unwrap();
        problem.add_column(0., 1., VarType::Continuous).unwrap();
        problem.add_objective_term(0, 2.).unwrap();
        problem.add_objective_term(1, 3.).unwrap();
        problem.add_objective_term(1, 1.).unwrap();
        assert!((problem.objective_value(&[1., 0.5]) - 4.).abs() < 1e-12);
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn highs_needs_feature() {
        let res = new_solver(configuration::Solver::Highs, SolverSettings::default());
        assert!(matches!(res, Err(SolverError::Unavailable(_))));
    }
}
