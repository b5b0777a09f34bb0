//! Editing helpers and constraint builders
//!
//! Edits are applied to the model immediately, but none of them update or re-optimize it.
use crate::inspect::{resolve, InspectError, Scope};
use crate::model::constraint::{Constr, Sense};
use crate::model::expr::LinExpr;
use crate::model::variable::Var;
use crate::model::Model;
use crate::optimize::OptimizationStatus;

/// Process queued changes, discard the previous solution and optimize again
pub fn reoptimize(model: &mut Model) -> Result<OptimizationStatus, InspectError> {
    model.update();
    model.reset();
    Ok(model.optimize()?)
}

/// Set every objective coefficient of the model to zero
pub fn zero_all_objective_coeffs(model: &mut Model) -> Result<(), InspectError> {
    for var in model.vars() {
        model.var_mut(var)?.objective = 0.;
    }
    Ok(())
}

/// Set the bounds of every variable in scope, a bound given as None is left unchanged
///
/// # Examples
/// ```rust
/// use lpkit_core::inspect::{set_variables_bounds, Scope};
/// use lpkit_core::model::Model;
/// use lpkit_core::model::variable::VarType;
/// let mut model = Model::new("example");
/// let x = model.add_new_var("x[1]", VarType::Continuous, 0., 4., 0.).unwrap();
/// model.update();
/// set_variables_bounds(Some(1.), None, &mut model, Scope::Set("x")).unwrap();
/// assert_eq!(model.var(x).unwrap().lower_bound, 1.);
/// assert_eq!(model.var(x).unwrap().upper_bound, 4.);
/// ```
pub fn set_variables_bounds(
    lower_bound: Option<f64>,
    upper_bound: Option<f64>,
    model: &mut Model,
    scope: Scope<'_, Var>,
) -> Result<(), InspectError> {
    if lower_bound.is_none() && upper_bound.is_none() {
        return Ok(());
    }
    for var in resolve(model, scope)? {
        let variable = model.var_mut(var)?;
        if let Some(lb) = lower_bound {
            variable.lower_bound = lb;
        }
        if let Some(ub) = upper_bound {
            variable.upper_bound = ub;
        }
    }
    Ok(())
}

/// Multiply the right hand side of every constraint in scope by `factor`
///
/// A factor of 0.9 sets each right hand side to 90% of its current value.
pub fn set_constraints_rhs_as_percent(
    factor: f64,
    model: &mut Model,
    scope: Scope<'_, Constr>,
) -> Result<(), InspectError> {
    if !factor.is_finite() {
        return Err(InspectError::InvalidArgument {
            argument: "percent",
            reason: format!("{} is not a finite number", factor),
        });
    }
    for constr in resolve(model, scope)? {
        model.constr_mut(constr)?.rhs *= factor;
    }
    Ok(())
}

/// Queue the removal of every variable in scope, returns the number of variables queued
pub fn remove_variables_from_model(
    model: &mut Model,
    scope: Scope<'_, Var>,
) -> Result<usize, InspectError> {
    let variables = resolve(model, scope)?;
    for var in &variables {
        model.remove_var(*var)?;
    }
    Ok(variables.len())
}

/// Queue the removal of every constraint in scope, returns the number of constraints queued
pub fn remove_constraints_from_model(
    model: &mut Model,
    scope: Scope<'_, Constr>,
) -> Result<usize, InspectError> {
    let constraints = resolve(model, scope)?;
    for constr in &constraints {
        model.remove_constr(*constr)?;
    }
    Ok(constraints.len())
}

/// Sum of the given variables
pub fn linexp_from_variables(variables: &[Var]) -> LinExpr {
    variables.iter().copied().collect()
}

/// Constraint sense from `<`, `>` or `=`
pub fn sense_from_str(sense: &str) -> Result<Sense, InspectError> {
    Ok(sense.parse::<Sense>()?)
}

/// Sense used by [`add_constraint_constant`] callers that don't name one
pub const CONSTANT_SENSE_DEFAULT: &str = "<";
/// Sense used by [`add_constraint_variables`] callers that don't name one
pub const VARIABLES_SENSE_DEFAULT: &str = "=";

/// Add the constraint `sum(variables) sense constant`
pub fn add_constraint_constant(
    model: &mut Model,
    variables: &[Var],
    constant: f64,
    sense: &str,
    name: &str,
) -> Result<Constr, InspectError> {
    if variables.is_empty() {
        return Err(InspectError::MissingArgument("variables"));
    }
    let sense = sense_from_str(sense)?;
    Ok(model.add_constr(linexp_from_variables(variables), sense, constant, name)?)
}

/// Add the constraint `sum(variables1) sense sum(variables2)`
pub fn add_constraint_variables(
    model: &mut Model,
    variables1: &[Var],
    variables2: &[Var],
    sense: &str,
    name: &str,
) -> Result<Constr, InspectError> {
    if variables1.is_empty() || variables2.is_empty() {
        return Err(InspectError::MissingArgument("variables"));
    }
    let sense = sense_from_str(sense)?;
    Ok(model.add_constr(
        linexp_from_variables(variables1),
        sense,
        linexp_from_variables(variables2),
        name,
    )?)
}

#[cfg(test)]
mod edit_tests {
    use super::*;
    use crate::inspect::test_model::indexed_model;
    use crate::inspect::{get_constraints, get_variables, Query};
    use crate::model::ModelError;

    #[test]
    fn objective_and_bounds() {
        let mut model = indexed_model();
        zero_all_objective_coeffs(&mut model).unwrap();
        assert!(model
            .vars()
            .iter()
            .all(|v| model.var(*v).unwrap().objective == 0.));

        set_variables_bounds(None, Some(3.), &mut model, Scope::Set("y")).unwrap();
        let y = get_variables(&model, &Query::set("y")).unwrap()[0];
        assert_eq!(model.var(y).unwrap().upper_bound, 3.);
        assert_eq!(model.var(y).unwrap().lower_bound, 0.);
    }

    #[test]
    fn rhs_percent() {
        let mut model = indexed_model();
        set_constraints_rhs_as_percent(0.5, &mut model, Scope::Set("cap")).unwrap();
        let cap3 = model.constr_by_name("cap(3)").unwrap();
        assert!((model.constr(cap3).unwrap().rhs - 1.5).abs() < 1e-12);
        assert!(matches!(
            set_constraints_rhs_as_percent(f64::NAN, &mut model, Scope::All),
            Err(InspectError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn removal_waits_for_update() {
        let mut model = indexed_model();
        let removed = remove_constraints_from_model(&mut model, Scope::Set("cap")).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(model.num_constrs(), 4);
        model.update();
        assert_eq!(model.num_constrs(), 1);

        remove_variables_from_model(&mut model, Scope::Set("x")).unwrap();
        model.update();
        assert_eq!(model.num_vars(), 2);
        let link = model.constr_by_name("link(a)").unwrap();
        assert!(model.constr(link).unwrap().terms.is_empty());
    }

    #[test]
    fn constraint_builders() {
        let mut model = indexed_model();
        let x = get_variables(&model, &Query::set("x")).unwrap();
        let total = model.var_by_name("total").unwrap();
        add_constraint_constant(&mut model, &x, 4., "<", "limit").unwrap();
        add_constraint_variables(&mut model, &x, &[total], "=", "define(total)").unwrap();
        model.update();
        let define = get_constraints(&model, &Query::set("define")).unwrap()[0];
        let constraint = model.constr(define).unwrap();
        assert_eq!(constraint.terms.len(), 7);
        assert_eq!(constraint.terms[&total], -1.);
        assert_eq!(constraint.sense, Sense::Equal);

        assert!(matches!(
            add_constraint_constant(&mut model, &[], 1., "<", ""),
            Err(InspectError::MissingArgument(_))
        ));
        assert_eq!(sense_from_str(CONSTANT_SENSE_DEFAULT).unwrap(), Sense::LessEqual);
        let balance =
            add_constraint_variables(&mut model, &x[..2], &x[2..], VARIABLES_SENSE_DEFAULT, "")
                .unwrap();
        assert_eq!(model.constr(balance).unwrap().sense, Sense::Equal);
        assert!(matches!(
            sense_from_str("~"),
            Err(InspectError::Model(ModelError::InvalidSense(_)))
        ));
    }

    #[test]
    fn reoptimize_solves_edited_model() {
        let mut model = indexed_model();
        model.optimize().unwrap();
        let before = model.objective_value().unwrap();
        set_constraints_rhs_as_percent(2., &mut model, Scope::Set("cap")).unwrap();
        // the old solution is kept until the model is optimized again
        assert!((model.objective_value().unwrap() - before).abs() < 1e-12);
        let status = reoptimize(&mut model).unwrap();
        assert_eq!(status, OptimizationStatus::Optimal);
        assert!(model.objective_value().unwrap() > before + 1.);
    }
}
