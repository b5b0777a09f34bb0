//! This module provides the Model struct, holding the variables and constraints of a linear
//! (or mixed integer) program together with its latest solution.
//!
//! Changes to the structure of the model (adding or removing variables and constraints) are
//! queued, and only take effect when [`Model::update`] is called, or when the model is
//! optimized. Attribute changes apply immediately.
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::configuration;
use crate::model::constraint::{Constr, Constraint, Sense};
use crate::model::expr::LinExpr;
use crate::model::variable::{Var, VarType, Variable, VariableBuilder, VariableBuilderError};
use crate::naming::EntityKind;
use crate::optimize::solvers::{new_solver, Solver, SolverError, SolverSettings};
use crate::optimize::{ObjectiveSense, OptimizationStatus};

pub mod attributes;
pub mod constraint;
pub mod expr;
pub mod variable;

/// Solution of the latest successful optimization
#[derive(Clone, Debug)]
pub(crate) struct ModelSolution {
    pub objective_value: f64,
    pub values: IndexMap<Var, f64>,
    pub duals: Option<IndexMap<Constr, f64>>,
    /// Right hand side less activity, at the time of the solve
    pub slacks: IndexMap<Constr, f64>,
    /// Only present when the backend reported duals
    pub reduced_costs: Option<IndexMap<Var, f64>>,
    /// Was the solution found by an interior point method
    pub barrier: bool,
}

/// Represents an optimization model
#[derive(Clone, Debug)]
pub struct Model {
    name: String,
    sense: ObjectiveSense,
    variables: IndexMap<Var, Variable>,
    constraints: IndexMap<Constr, Constraint>,
    pending_variables: IndexMap<Var, Variable>,
    pending_constraints: IndexMap<Constr, Constraint>,
    removed_variables: IndexSet<Var>,
    removed_constraints: IndexSet<Constr>,
    next_var: usize,
    next_constr: usize,
    status: OptimizationStatus,
    solution: Option<ModelSolution>,
    /// Backend used instead of the configured default
    solver: Option<configuration::Solver>,
}

impl Model {
    /// Create a new, empty model which minimizes its objective
    pub fn new(name: &str) -> Self {
        Model {
            name: name.to_string(),
            sense: ObjectiveSense::Minimize,
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            pending_variables: IndexMap::new(),
            pending_constraints: IndexMap::new(),
            removed_variables: IndexSet::new(),
            removed_constraints: IndexSet::new(),
            next_var: 0,
            next_constr: 0,
            status: OptimizationStatus::Unoptimized,
            solution: None,
            solver: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    /// Use a specific solver backend for this model instead of the configured default
    pub fn set_solver(&mut self, solver: configuration::Solver) {
        self.solver = Some(solver);
    }

    // region Building
    /// Add a variable to the model
    ///
    /// The variable becomes visible in [`Model::vars`] after the next update. Variables
    /// without a name are named `C<id>`.
    ///
    /// # Examples
    /// ```rust
    /// use lpkit_core::model::Model;
    /// use lpkit_core::model::variable::VariableBuilder;
    /// let mut model = Model::new("example");
    /// let x = model.add_var(
    ///     VariableBuilder::default()
    ///         .name("x[1,2]")
    ///         .upper_bound(10.)
    ///         .build()
    ///         .unwrap(),
    /// );
    /// model.update();
    /// assert_eq!(model.vars(), vec![x]);
    /// ```
    pub fn add_var(&mut self, mut variable: Variable) -> Var {
        let var = Var(self.next_var);
        self.next_var += 1;
        if variable.name.is_empty() {
            variable.name = var.to_string();
        }
        self.pending_variables.insert(var, variable);
        var
    }

    /// Add a variable from its most common attributes
    pub fn add_new_var(
        &mut self,
        name: &str,
        variable_type: VarType,
        lower_bound: f64,
        upper_bound: f64,
        objective: f64,
    ) -> Result<Var, ModelError> {
        let variable = VariableBuilder::default()
            .name(name)
            .variable_type(variable_type)
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .objective(objective)
            .build()?;
        Ok(self.add_var(variable))
    }

    /// Add the linear constraint `lhs sense rhs`
    ///
    /// Both sides may contain variables and constants, the constraint is stored with
    /// all variables on the left and all constants on the right. Constraints without a
    /// name are named `R<id>`.
    ///
    /// # Examples
    /// ```rust
    /// use lpkit_core::model::Model;
    /// use lpkit_core::model::constraint::Sense;
    /// use lpkit_core::model::expr::LinExpr;
    /// use lpkit_core::model::variable::VarType;
    /// let mut model = Model::new("example");
    /// let x = model.add_new_var("x", VarType::Continuous, 0., 5., 1.).unwrap();
    /// let y = model.add_new_var("y", VarType::Continuous, 0., 5., 1.).unwrap();
    /// // x + 2 <= y, stored as x - y <= -2
    /// let c = model
    ///     .add_constr(LinExpr::from(x) + 2., Sense::LessEqual, y, "c")
    ///     .unwrap();
    /// model.update();
    /// assert_eq!(model.constr(c).unwrap().rhs, -2.);
    /// ```
    pub fn add_constr<L, R>(
        &mut self,
        lhs: L,
        sense: Sense,
        rhs: R,
        name: &str,
    ) -> Result<Constr, ModelError>
    where
        L: Into<LinExpr>,
        R: Into<LinExpr>,
    {
        let lhs: LinExpr = lhs.into();
        let expr = lhs - rhs;
        if let Some((var, _)) = expr.terms.iter().find(|(var, _)| !self.has_var(*var)) {
            return Err(ModelError::UnknownVariable(*var));
        }
        let constr = Constr(self.next_constr);
        self.next_constr += 1;
        let name = if name.is_empty() {
            constr.to_string()
        } else {
            name.to_string()
        };
        let constraint = Constraint::new(&name, &expr.terms, sense, -expr.constant);
        self.pending_constraints.insert(constr, constraint);
        Ok(constr)
    }

    /// Queue the removal of a variable, its terms are dropped from every constraint
    pub fn remove_var(&mut self, var: Var) -> Result<(), ModelError> {
        if !self.has_var(var) {
            return Err(ModelError::UnknownVariable(var));
        }
        self.removed_variables.insert(var);
        Ok(())
    }

    /// Queue the removal of a constraint
    pub fn remove_constr(&mut self, constr: Constr) -> Result<(), ModelError> {
        if !self.has_constr(constr) {
            return Err(ModelError::UnknownConstraint(constr));
        }
        self.removed_constraints.insert(constr);
        Ok(())
    }

    /// Process all queued additions and removals
    ///
    /// If the structure of the model changed, the stored solution is discarded.
    pub fn update(&mut self) {
        let changed = !(self.pending_variables.is_empty()
            && self.pending_constraints.is_empty()
            && self.removed_variables.is_empty()
            && self.removed_constraints.is_empty());
        if !changed {
            return;
        }
        log::debug!(
            "Updating model {}: {} variables and {} constraints added, {} variables and {} constraints removed",
            self.name,
            self.pending_variables.len(),
            self.pending_constraints.len(),
            self.removed_variables.len(),
            self.removed_constraints.len()
        );
        self.variables.append(&mut self.pending_variables);
        self.constraints.append(&mut self.pending_constraints);
        for var in self.removed_variables.drain(..) {
            self.variables.shift_remove(&var);
            for constraint in self.constraints.values_mut() {
                constraint.remove_variable(var);
            }
        }
        for constr in self.removed_constraints.drain(..) {
            self.constraints.shift_remove(&constr);
        }
        self.reset();
    }
    // endregion Building

    // region Access
    /// Variables of the model, in the order they were added
    ///
    /// Variables added or removed since the last update are not reflected.
    pub fn vars(&self) -> Vec<Var> {
        self.variables.keys().copied().collect()
    }

    /// Constraints of the model, in the order they were added
    ///
    /// Constraints added or removed since the last update are not reflected.
    pub fn constrs(&self) -> Vec<Constr> {
        self.constraints.keys().copied().collect()
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constrs(&self) -> usize {
        self.constraints.len()
    }

    fn has_var(&self, var: Var) -> bool {
        self.variables.contains_key(&var) || self.pending_variables.contains_key(&var)
    }

    fn has_constr(&self, constr: Constr) -> bool {
        self.constraints.contains_key(&constr) || self.pending_constraints.contains_key(&constr)
    }

    /// Data of a variable, including variables still waiting for an update
    pub fn var(&self, var: Var) -> Result<&Variable, ModelError> {
        self.variables
            .get(&var)
            .or_else(|| self.pending_variables.get(&var))
            .ok_or(ModelError::UnknownVariable(var))
    }

    pub fn var_mut(&mut self, var: Var) -> Result<&mut Variable, ModelError> {
        match self.variables.get_mut(&var) {
            Some(variable) => Ok(variable),
            None => self
                .pending_variables
                .get_mut(&var)
                .ok_or(ModelError::UnknownVariable(var)),
        }
    }

    /// Data of a constraint, including constraints still waiting for an update
    pub fn constr(&self, constr: Constr) -> Result<&Constraint, ModelError> {
        self.constraints
            .get(&constr)
            .or_else(|| self.pending_constraints.get(&constr))
            .ok_or(ModelError::UnknownConstraint(constr))
    }

    pub fn constr_mut(&mut self, constr: Constr) -> Result<&mut Constraint, ModelError> {
        match self.constraints.get_mut(&constr) {
            Some(constraint) => Ok(constraint),
            None => self
                .pending_constraints
                .get_mut(&constr)
                .ok_or(ModelError::UnknownConstraint(constr)),
        }
    }

    pub fn var_name(&self, var: Var) -> Result<&str, ModelError> {
        Ok(&self.var(var)?.name)
    }

    pub fn constr_name(&self, constr: Constr) -> Result<&str, ModelError> {
        Ok(&self.constr(constr)?.name)
    }

    /// Find a variable by its full name
    pub fn var_by_name(&self, name: &str) -> Option<Var> {
        self.variables
            .iter()
            .find(|(_, variable)| variable.name == name)
            .map(|(var, _)| *var)
    }

    /// Find a constraint by its full name
    pub fn constr_by_name(&self, name: &str) -> Option<Constr> {
        self.constraints
            .iter()
            .find(|(_, constraint)| constraint.name == name)
            .map(|(constr, _)| *constr)
    }
    // endregion Access

    // region Solving
    /// Optimize the model
    ///
    /// Queued changes are processed first. A status other than optimal is logged and
    /// returned, it is not treated as an error.
    ///
    /// # Errors
    /// [`ModelError::Solver`] if the backend can't represent the model, for example
    /// integer variables handed to Clarabel.
    pub fn optimize(&mut self) -> Result<OptimizationStatus, ModelError> {
        self.update();
        self.reset();
        log::info!(
            "Optimizing model {} with {} variables and {} constraints",
            self.name,
            self.num_vars(),
            self.num_constrs()
        );

        if let Some(variable) = self
            .variables
            .values()
            .find(|v| v.lower_bound > v.upper_bound)
        {
            log::warn!(
                "Variable {} has lower bound {} above upper bound {}",
                variable.name,
                variable.lower_bound,
                variable.upper_bound
            );
            self.status = OptimizationStatus::Infeasible;
            return Ok(self.status);
        }

        let kind = match self.solver {
            Some(kind) => kind,
            None => configuration::CONFIGURATION
                .read()
                .map(|config| config.solver)
                .unwrap_or(configuration::Solver::Clarabel),
        };
        let mut solver = new_solver(kind, SolverSettings::from_configuration())?;
        self.load(solver.as_mut())?;
        let solution = solver.solve()?;

        self.status = solution.status;
        match (solution.variable_values, solution.objective_value) {
            (Some(values), Some(objective_value)) if solution.status.has_solution() => {
                let values: IndexMap<Var, f64> =
                    self.variables.keys().copied().zip(values).collect();
                let duals = solution.dual_values.map(|duals| {
                    self.constraints
                        .keys()
                        .copied()
                        .zip(duals)
                        .collect::<IndexMap<Constr, f64>>()
                });
                let slacks = self
                    .constraints
                    .iter()
                    .map(|(constr, constraint)| {
                        let activity =
                            constraint.activity(|var| values.get(&var).copied().unwrap_or(0.));
                        (*constr, constraint.rhs - activity)
                    })
                    .collect();
                let reduced_costs = duals.as_ref().map(|duals| self.reduced_costs(duals));
                self.solution = Some(ModelSolution {
                    objective_value,
                    values,
                    duals,
                    slacks,
                    reduced_costs,
                    barrier: solver.interior_point(),
                });
            }
            _ => {}
        }

        if self.status == OptimizationStatus::Optimal {
            log::info!(
                "Model {} solved by {}, objective value {}",
                self.name,
                solver.name(),
                self.objective_value().unwrap_or(f64::NAN)
            );
        } else {
            log::warn!(
                "Optimization of model {} ended with status {}",
                self.name,
                self.status
            );
        }
        Ok(self.status)
    }

    /// Hand the committed variables and constraints to a backend
    fn load(&self, solver: &mut dyn Solver) -> Result<(), SolverError> {
        let mut columns: IndexMap<Var, usize> = IndexMap::with_capacity(self.variables.len());
        for (var, variable) in &self.variables {
            let (lower_bound, upper_bound) = variable.solver_bounds();
            let column = match variable.variable_type {
                VarType::Continuous => solver.add_continuous_variable(lower_bound, upper_bound)?,
                VarType::Integer => solver.add_integer_variable(lower_bound, upper_bound)?,
                VarType::Binary if (lower_bound, upper_bound) == (0., 1.) => {
                    solver.add_binary_variable()?
                }
                VarType::Binary => solver.add_integer_variable(lower_bound, upper_bound)?,
            };
            if variable.objective != 0. {
                solver.add_linear_objective_term(column, variable.objective)?;
            }
            columns.insert(*var, column);
        }
        for constraint in self.constraints.values() {
            let mut terms = Vec::with_capacity(constraint.terms.len());
            for (var, coef) in &constraint.terms {
                let column = columns
                    .get(var)
                    .ok_or(SolverError::UnknownVariable(var.id()))?;
                terms.push((*column, *coef));
            }
            match constraint.sense {
                Sense::Equal => solver.add_equality_constraint(&terms, constraint.rhs)?,
                _ => {
                    let (lower_bound, upper_bound) = constraint.row_bounds();
                    solver.add_inequality_constraint(&terms, lower_bound, upper_bound)?
                }
            };
        }
        solver.set_objective_sense(self.sense)
    }

    /// Discard the stored solution
    pub fn reset(&mut self) {
        self.solution = None;
        self.status = OptimizationStatus::Unoptimized;
    }

    /// Status of the latest optimization
    pub fn status(&self) -> OptimizationStatus {
        self.status
    }

    /// Objective value of the stored solution
    pub fn objective_value(&self) -> Result<f64, ModelError> {
        self.solution
            .as_ref()
            .map(|s| s.objective_value)
            .ok_or(ModelError::NoSolution)
    }

    /// Value of a variable in the stored solution
    pub fn value(&self, var: Var) -> Result<f64, ModelError> {
        let solution = self.solution.as_ref().ok_or(ModelError::NoSolution)?;
        solution
            .values
            .get(&var)
            .copied()
            .ok_or(ModelError::NoSolution)
    }

    /// Dual value of a constraint in the stored solution
    pub fn dual(&self, constr: Constr) -> Result<f64, ModelError> {
        let solution = self.solution.as_ref().ok_or(ModelError::NoSolution)?;
        let duals = solution
            .duals
            .as_ref()
            .ok_or(ModelError::AttributeUnavailable("Pi"))?;
        duals.get(&constr).copied().ok_or(ModelError::NoSolution)
    }

    /// Slack of a constraint in the stored solution, right hand side less activity
    ///
    /// Constraints added since the last optimization have no slack.
    pub fn slack(&self, constr: Constr) -> Result<f64, ModelError> {
        self.constr(constr)?;
        let solution = self.solution.as_ref().ok_or(ModelError::NoSolution)?;
        solution
            .slacks
            .get(&constr)
            .copied()
            .ok_or(ModelError::NoSolution)
    }

    /// Reduced cost of a variable in the stored solution
    pub fn reduced_cost(&self, var: Var) -> Result<f64, ModelError> {
        self.var(var)?;
        let solution = self.solution.as_ref().ok_or(ModelError::NoSolution)?;
        let reduced_costs = solution
            .reduced_costs
            .as_ref()
            .ok_or(ModelError::AttributeUnavailable("RC"))?;
        reduced_costs
            .get(&var)
            .copied()
            .ok_or(ModelError::NoSolution)
    }

    /// The objective coefficient of every committed variable less its dual weighted
    /// constraint coefficients
    fn reduced_costs(&self, duals: &IndexMap<Constr, f64>) -> IndexMap<Var, f64> {
        let mut reduced_costs: IndexMap<Var, f64> = self
            .variables
            .iter()
            .map(|(var, variable)| (*var, variable.objective))
            .collect();
        for (constr, constraint) in &self.constraints {
            let dual = duals.get(constr).copied().unwrap_or(0.);
            for (var, coef) in &constraint.terms {
                if let Some(rc) = reduced_costs.get_mut(var) {
                    *rc -= coef * dual;
                }
            }
        }
        reduced_costs
    }
    // endregion Solving
}

/// Errors raised by the model
#[derive(Error, Debug)]
pub enum ModelError {
    /// The variable was never added, or has been removed
    #[error("Variable {0} is not part of the model")]
    UnknownVariable(Var),
    /// The constraint was never added, or has been removed
    #[error("Constraint {0} is not part of the model")]
    UnknownConstraint(Constr),
    /// Name not found in the attribute whitelist
    #[error("Unknown {kind} attribute {attr}")]
    UnknownAttribute { attr: String, kind: EntityKind },
    /// Attempt to write an attribute which can only be read
    #[error("The {kind} attribute {attr} can't be set")]
    ReadOnlyAttribute {
        attr: &'static str,
        kind: EntityKind,
    },
    /// Attribute which is recognized, but can't be provided for this model
    #[error("The attribute {0} is not available")]
    AttributeUnavailable(&'static str),
    /// Attribute set with a value of the wrong type
    #[error("The attribute {attr} requires a {expected} value")]
    AttributeType {
        attr: &'static str,
        expected: &'static str,
    },
    #[error("Invalid constraint sense {0}, expected one of <, >, =")]
    InvalidSense(String),
    #[error("Invalid variable type {0}, expected one of C, I, B")]
    InvalidVariableType(String),
    /// Solution attribute requested before a successful optimization
    #[error("No solution available, optimize the model first")]
    NoSolution,
    #[error("Failed to build variable: {0}")]
    VariableBuilder(#[from] VariableBuilderError),
    #[error(transparent)]
    Solver(#[from] SolverError),
}
