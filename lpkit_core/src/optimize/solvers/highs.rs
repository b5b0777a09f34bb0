//! Implements a solver interface for HiGHS
use ::highs::{Col, HighsModelStatus, RowProblem, Sense};

use crate::model::variable::VarType;
use crate::optimize::solvers::{Solver, SolverError, SolverSettings, StagedProblem};
use crate::optimize::{ObjectiveSense, OptimizationStatus, ProblemSolution};

#[derive(Clone, Debug)]
pub struct HighsSolver {
    problem: StagedProblem,
    settings: SolverSettings,
}

impl HighsSolver {
    pub fn new(settings: SolverSettings) -> Self {
        HighsSolver {
            problem: StagedProblem::default(),
            settings,
        }
    }

    fn has_integer_columns(&self) -> bool {
        self.problem
            .columns
            .iter()
            .any(|c| c.variable_type != VarType::Continuous)
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "HiGHS"
    }

    fn integer_variable_capable(&self) -> bool {
        true
    }

    fn binary_variable_capable(&self) -> bool {
        true
    }

    fn dual_values_capable(&self) -> bool {
        true
    }

    fn interior_point(&self) -> bool {
        false
    }

    fn add_continuous_variable(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, SolverError> {
        self.problem
            .add_column(lower_bound, upper_bound, VarType::Continuous)
    }

    fn add_integer_variable(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, SolverError> {
        self.problem
            .add_column(lower_bound, upper_bound, VarType::Integer)
    }

    fn add_binary_variable(&mut self) -> Result<usize, SolverError> {
        self.problem.add_column(0., 1., VarType::Binary)
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
        let mut pb = RowProblem::default();
        let cols: Vec<Col> = self
            .problem
            .columns
            .iter()
            .zip(self.problem.objective.iter())
            .map(|(col, cost)| match col.variable_type {
                VarType::Continuous => pb.add_column(*cost, col.lower_bound..=col.upper_bound),
                VarType::Integer | VarType::Binary => {
                    pb.add_integer_column(*cost, col.lower_bound..=col.upper_bound)
                }
            })
            .collect();
        for row in &self.problem.rows {
            let factors: Vec<(Col, f64)> = row.terms.iter().map(|(j, a)| (cols[*j], *a)).collect();
            pb.add_row(row.lower_bound..=row.upper_bound, &factors);
        }

        let sense = match self.problem.sense {
            ObjectiveSense::Minimize => Sense::Minimise,
            ObjectiveSense::Maximize => Sense::Maximise,
        };
        let mut model = pb.optimise(sense);
        if !self.settings.verbose {
            model.make_quiet();
        }
        model.set_option("primal_feasibility_tolerance", self.settings.tolerance);
        let solved = model.solve();

        let status = match solved.status() {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => OptimizationStatus::Optimal,
            HighsModelStatus::Infeasible => OptimizationStatus::Infeasible,
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                OptimizationStatus::Unbounded
            }
            _ => OptimizationStatus::SolverHalted,
        };
        if !status.has_solution() {
            return Ok(ProblemSolution::unsolved(status));
        }

        let solution = solved.get_solution();
        let values = solution.columns().to_vec();
        // Row duals of a MIP are not meaningful
        let duals = if self.has_integer_columns() {
            None
        } else {
            Some(solution.dual_rows().to_vec())
        };
        Ok(ProblemSolution {
            status,
            objective_value: Some(self.problem.objective_value(&values)),
            variable_values: Some(values),
            dual_values: duals,
        })
    }
}

#[cfg(test)]
mod highs_tests {
    use super::*;

    #[test]
    fn integer_maximization() {
        // maximize: x + 2y under constraints x + y <= 3.5 and x - y >= 1, y integer
        let mut solver = HighsSolver::new(SolverSettings::default());
        let x = solver.add_continuous_variable(0., f64::INFINITY).unwrap();
        let y = solver.add_integer_variable(0., f64::INFINITY).unwrap();
        solver
            .add_inequality_constraint(&[(x, 1.), (y, 1.)], f64::NEG_INFINITY, 3.5)
            .unwrap();
        solver
            .add_inequality_constraint(&[(x, 1.), (y, -1.)], 1., f64::INFINITY)
            .unwrap();
        solver.add_linear_objective_term(x, 1.).unwrap();
        solver.add_linear_objective_term(y, 2.).unwrap();
        solver.set_objective_sense(ObjectiveSense::Maximize).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        let values = solution.variable_values.unwrap();
        assert!((values[0] - 2.5).abs() < 1e-6);
        assert!((values[1] - 1.).abs() < 1e-6);
        assert!(solution.dual_values.is_none());
    }
}
