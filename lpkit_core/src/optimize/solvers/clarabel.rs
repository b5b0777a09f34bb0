//! Implements a solver interface for Clarabel
//!
//! Clarabel solves `min q'x s.t. Ax + s = b, s in K`. Constraints become rows of `A`,
//! equalities in a zero cone and every finite side of an inequality (including
//! variable bounds) in a nonnegative cone. Only continuous variables are supported.
use ::clarabel::algebra::CscMatrix;
use ::clarabel::solver::implementations::default::DefaultSettingsBuilder;
use ::clarabel::solver::SupportedConeT::{self, NonnegativeConeT, ZeroConeT};
use ::clarabel::solver::{DefaultSolver, IPSolver, SolverStatus};
use nalgebra_sparse::CooMatrix;

use crate::model::variable::VarType;
use crate::optimize::solvers::{Solver, SolverError, SolverSettings, StagedProblem};
use crate::optimize::{ObjectiveSense, OptimizationStatus, ProblemSolution};

#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    problem: StagedProblem,
    settings: SolverSettings,
}

impl ClarabelSolver {
    pub fn new(settings: SolverSettings) -> Self {
        ClarabelSolver {
            problem: StagedProblem::default(),
            settings,
        }
    }
}

/// A row of the clarabel constraint matrix
struct ConeRow {
    terms: Vec<(usize, f64)>,
    rhs: f64,
    /// The constraint this row came from and the sign its dual contributes with
    origin: Option<(usize, f64)>,
}

impl ClarabelSolver {
    /// Split the staged problem into zero cone rows and nonnegative cone rows
    fn cone_rows(&self) -> (Vec<ConeRow>, Vec<ConeRow>) {
        let mut zero_rows = Vec::new();
        let mut nonneg_rows = Vec::new();
        for (i, row) in self.problem.rows.iter().enumerate() {
            if row.equality {
                zero_rows.push(ConeRow {
                    terms: row.terms.clone(),
                    rhs: row.upper_bound,
                    origin: Some((i, -1.)),
                });
                continue;
            }
            if row.upper_bound.is_finite() {
                nonneg_rows.push(ConeRow {
                    terms: row.terms.clone(),
                    rhs: row.upper_bound,
                    origin: Some((i, -1.)),
                });
            }
            if row.lower_bound.is_finite() {
                nonneg_rows.push(ConeRow {
                    terms: row.terms.iter().map(|(j, a)| (*j, -a)).collect(),
                    rhs: -row.lower_bound,
                    origin: Some((i, 1.)),
                });
            }
        }
        for (j, col) in self.problem.columns.iter().enumerate() {
            if col.upper_bound.is_finite() {
                nonneg_rows.push(ConeRow {
                    terms: vec![(j, 1.)],
                    rhs: col.upper_bound,
                    origin: None,
                });
            }
            if col.lower_bound.is_finite() {
                nonneg_rows.push(ConeRow {
                    terms: vec![(j, -1.)],
                    rhs: -col.lower_bound,
                    origin: None,
                });
            }
        }
        (zero_rows, nonneg_rows)
    }

    /// Solution of a problem without any rows, every variable is free
    fn solve_unconstrained(&self) -> ProblemSolution {
        if self.problem.objective.iter().any(|c| *c != 0.) {
            return ProblemSolution::unsolved(OptimizationStatus::Unbounded);
        }
        let values = vec![0.; self.problem.columns.len()];
        ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(0.),
            variable_values: Some(values),
            dual_values: Some(vec![0.; self.problem.rows.len()]),
        }
    }
}

impl Solver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "Clarabel"
    }

    fn integer_variable_capable(&self) -> bool {
        false
    }

    fn binary_variable_capable(&self) -> bool {
        false
    }

    fn dual_values_capable(&self) -> bool {
        true
    }

    fn interior_point(&self) -> bool {
        true
    }

    fn add_continuous_variable(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, SolverError> {
        self.problem
            .add_column(lower_bound, upper_bound, VarType::Continuous)
    }

    fn add_integer_variable(&mut self, _: f64, _: f64) -> Result<usize, SolverError> {
        Err(SolverError::UnsupportedVariableType {
            solver: self.name(),
            variable_type: VarType::Integer,
        })
    }

    fn add_binary_variable(&mut self) -> Result<usize, SolverError> {
        Err(SolverError::UnsupportedVariableType {
            solver: self.name(),
            variable_type: VarType::Binary,
        })
    }

    fn add_equality_constraint(
        &mut self,
        terms: &[(usize, f64)],
        equals: f64,
    ) -> Result<usize, SolverError> {
        self.problem.add_row(terms, equals, equals, true)
    }

    fn add_inequality_constraint(
        &mut self,
        terms: &[(usize, f64)],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, SolverError> {
        self.problem.add_row(terms, lower_bound, upper_bound, false)
    }

    fn add_linear_objective_term(
        &mut self,
        variable: usize,
        coefficient: f64,
    ) -> Result<(), SolverError> {
        self.problem.add_objective_term(variable, coefficient)
    }

    fn set_objective_sense(&mut self, objective_sense: ObjectiveSense) -> Result<(), SolverError> {
        self.problem.sense = objective_sense;
        Ok(())
    }

    fn solve(&mut self) -> Result<ProblemSolution, SolverError> {
        let n_cols = self.problem.columns.len();
        let (zero_rows, nonneg_rows) = self.cone_rows();
        let n_rows = zero_rows.len() + nonneg_rows.len();
        if n_rows == 0 {
            return Ok(self.solve_unconstrained());
        }
        // Clarabel always minimizes
        let direction = match self.problem.sense {
            ObjectiveSense::Minimize => 1.,
            ObjectiveSense::Maximize => -1.,
        };
        let q: Vec<f64> = self.problem.objective.iter().map(|c| c * direction).collect();

        let mut coo = CooMatrix::new(n_rows, n_cols);
        let mut b = Vec::with_capacity(n_rows);
        for (r, row) in zero_rows.iter().chain(nonneg_rows.iter()).enumerate() {
            for (j, a) in &row.terms {
                coo.push(r, *j, *a);
            }
            b.push(row.rhs);
        }
        // Duplicate entries are summed and rows sorted within each column
        let csc = nalgebra_sparse::CscMatrix::from(&coo);
        let a = CscMatrix::new(
            n_rows,
            n_cols,
            csc.col_offsets().to_vec(),
            csc.row_indices().to_vec(),
            csc.values().to_vec(),
        );
        let p = CscMatrix::zeros((n_cols, n_cols));

        let mut cones: Vec<SupportedConeT<f64>> = Vec::new();
        if !zero_rows.is_empty() {
            cones.push(ZeroConeT(zero_rows.len()));
        }
        if !nonneg_rows.is_empty() {
            cones.push(NonnegativeConeT(nonneg_rows.len()));
        }

        let settings = DefaultSettingsBuilder::default()
            .verbose(self.settings.verbose)
            .tol_feas(self.settings.tolerance)
            .build()
            .map_err(|e| SolverError::InvalidSettings(e.to_string()))?;
        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
            .map_err(|e| SolverError::Setup(format!("{:?}", e)))?;
        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::NumericalError => OptimizationStatus::NumericalError,
            _ => OptimizationStatus::SolverHalted,
        };
        if !status.has_solution() {
            return Ok(ProblemSolution::unsolved(status));
        }

        let values = solver.solution.x.clone();
        // The dual of each row is the sensitivity of the minimized objective to -b,
        // convert back to d(objective)/d(rhs) in the original sense
        let mut duals = vec![0.; self.problem.rows.len()];
        for (row, z) in zero_rows
            .iter()
            .chain(nonneg_rows.iter())
            .zip(solver.solution.z.iter())
        {
            if let Some((constraint, sign)) = row.origin {
                duals[constraint] += sign * z * direction;
            }
        }

        Ok(ProblemSolution {
            status,
            objective_value: Some(self.problem.objective_value(&values)),
            variable_values: Some(values),
            dual_values: Some(duals),
        })
    }
}

#[cfg(test)]
mod clarabel_tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
    }

    #[test]
    fn small_maximization() {
        // max: x + 2y + z
        // c1: 3x +  y      <= 6
        // c2:       y + 2z <= 7
        let mut solver = ClarabelSolver::new(SolverSettings::default());
        let x = solver.add_continuous_variable(0., f64::INFINITY).unwrap();
        let y = solver.add_continuous_variable(0., f64::INFINITY).unwrap();
        let z = solver.add_continuous_variable(0., f64::INFINITY).unwrap();
        solver
            .add_inequality_constraint(&[(x, 3.), (y, 1.)], f64::NEG_INFINITY, 6.)
            .unwrap();
        solver
            .add_inequality_constraint(&[(y, 1.), (z, 2.)], f64::NEG_INFINITY, 7.)
            .unwrap();
        solver.add_linear_objective_term(x, 1.).unwrap();
        solver.add_linear_objective_term(y, 2.).unwrap();
        solver.add_linear_objective_term(z, 1.).unwrap();
        solver.set_objective_sense(ObjectiveSense::Maximize).unwrap();

        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        let values = solution.variable_values.unwrap();
        assert_close(values[0], 0.);
        assert_close(values[1], 6.);
        assert_close(values[2], 0.5);
        assert_close(solution.objective_value.unwrap(), 12.5);
        let duals = solution.dual_values.unwrap();
        assert_close(duals[0], 1.5);
        assert_close(duals[1], 0.5);
    }

    #[test]
    fn greater_equal_minimization() {
        // min: x + y, x + y >= 2, x - y = 0
        let mut solver = ClarabelSolver::new(SolverSettings::default());
        let x = solver.add_continuous_variable(0., 10.).unwrap();
        let y = solver.add_continuous_variable(0., 10.).unwrap();
        solver
            .add_inequality_constraint(&[(x, 1.), (y, 1.)], 2., f64::INFINITY)
            .unwrap();
        solver
            .add_equality_constraint(&[(x, 1.), (y, -1.)], 0.)
            .unwrap();
        solver.add_linear_objective_term(x, 1.).unwrap();
        solver.add_linear_objective_term(y, 1.).unwrap();

        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        let values = solution.variable_values.unwrap();
        assert_close(values[0], 1.);
        assert_close(values[1], 1.);
        // Raising the right hand side of x + y >= 2 raises the cost one for one
        assert_close(solution.dual_values.unwrap()[0], 1.);
    }

    #[test]
    fn infeasible() {
        let mut solver = ClarabelSolver::new(SolverSettings::default());
        let x = solver.add_continuous_variable(0., 1.).unwrap();
        solver
            .add_inequality_constraint(&[(x, 1.)], 2., f64::INFINITY)
            .unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
        assert!(solution.variable_values.is_none());
    }

    #[test]
    fn rejects_integers() {
        let mut solver = ClarabelSolver::new(SolverSettings::default());
        assert!(matches!(
            solver.add_integer_variable(0., 1.),
            Err(SolverError::UnsupportedVariableType { .. })
        ));
        assert!(!solver.integer_variable_capable());
    }

    #[test]
    fn unconstrained() {
        let mut solver = ClarabelSolver::new(SolverSettings::default());
        let x = solver
            .add_continuous_variable(f64::NEG_INFINITY, f64::INFINITY)
            .unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        solver.add_linear_objective_term(x, 1.).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Unbounded);
    }
}
