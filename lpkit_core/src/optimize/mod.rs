//! Module for handing models to a solver backend and collecting their solutions

pub mod objective;
pub mod solvers;

use std::fmt::{Display, Formatter};

pub use objective::ObjectiveSense;

/// Struct representing the solution returned by a solver backend
///
/// Values are positional, in the order the variables and constraints were handed to the
/// backend.
#[derive(Clone, Debug)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Values of the variables at the optimum, None if the problem could not be solved
    pub variable_values: Option<Vec<f64>>,
    /// Dual values (shadow prices) of the constraints at the optimum
    ///
    /// Some if the problem could be solved and the solver supports retrieving the dual
    /// values, None otherwise
    pub dual_values: Option<Vec<f64>>,
}

impl ProblemSolution {
    /// A solution carrying only a status, for problems which could not be solved
    pub fn unsolved(status: OptimizationStatus) -> Self {
        ProblemSolution {
            status,
            objective_value: None,
            variable_values: None,
            dual_values: None,
        }
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptimizationStatus {
    /// Problem has not yet attempted to be optimized
    Unoptimized,
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// An approximate solution has been found
    AlmostOptimal,
    /// A numerical error occurred during solving
    NumericalError,
    /// The solver hit the maximum allowed iterations, or max time, or made insufficient progress
    SolverHalted,
}

impl OptimizationStatus {
    /// Whether the status comes with a usable solution
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            OptimizationStatus::Optimal | OptimizationStatus::AlmostOptimal
        )
    }
}

impl Display for OptimizationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            OptimizationStatus::Unoptimized => "UNOPTIMIZED",
            OptimizationStatus::Optimal => "OPTIMAL",
            OptimizationStatus::Unbounded => "UNBOUNDED",
            OptimizationStatus::Infeasible => "INFEASIBLE",
            OptimizationStatus::AlmostOptimal => "SUBOPTIMAL",
            OptimizationStatus::NumericalError => "NUMERIC",
            OptimizationStatus::SolverHalted => "INTERRUPTED",
        };
        write!(f, "{}", text)
    }
}
