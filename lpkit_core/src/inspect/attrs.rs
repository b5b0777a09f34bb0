//! Bulk access to the attributes of variables and constraints
use indexmap::IndexMap;

use crate::inspect::{report, resolve, InspectError, Scope};
use crate::model::attributes::{AttrValue, ConAttr, VarAttr};
use crate::model::constraint::Constr;
use crate::model::variable::Var;
use crate::model::Model;

/// Names of all recognized variable attributes
pub fn variable_attrs() -> Vec<&'static str> {
    VarAttr::ALL.iter().map(|attr| attr.name()).collect()
}

/// Names of all recognized constraint attributes
pub fn constraint_attrs() -> Vec<&'static str> {
    ConAttr::ALL.iter().map(|attr| attr.name()).collect()
}

/// Is `attr` a variable attribute, ignoring case
pub fn check_variable_attr(attr: &str) -> bool {
    attr.parse::<VarAttr>().is_ok()
}

/// Is `attr` a constraint attribute, ignoring case
pub fn check_constraint_attr(attr: &str) -> bool {
    attr.parse::<ConAttr>().is_ok()
}

pub(crate) fn parse_var_attr(attr: &str) -> Result<VarAttr, InspectError> {
    if attr.trim().is_empty() {
        return Err(InspectError::MissingArgument("attribute"));
    }
    Ok(attr.parse::<VarAttr>()?)
}

pub(crate) fn parse_con_attr(attr: &str) -> Result<ConAttr, InspectError> {
    if attr.trim().is_empty() {
        return Err(InspectError::MissingArgument("attribute"));
    }
    Ok(attr.parse::<ConAttr>()?)
}

/// Map of variable name to the value of `attr` for every variable in scope
///
/// # Examples
/// ```rust
/// use lpkit_core::inspect::{get_variables_attr, Scope};
/// use lpkit_core::model::attributes::AttrValue;
/// use lpkit_core::model::Model;
/// use lpkit_core::model::variable::VarType;
/// let mut model = Model::new("example");
/// model.add_new_var("x[1]", VarType::Continuous, 0., 4., 0.).unwrap();
/// model.update();
/// let bounds = get_variables_attr("ub", &model, Scope::Set("x")).unwrap();
/// assert_eq!(bounds["x[1]"], AttrValue::Float(4.));
/// ```
pub fn get_variables_attr(
    attr: &str,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<IndexMap<String, AttrValue>, InspectError> {
    let attr = parse_var_attr(attr)?;
    let mut values = IndexMap::new();
    for var in resolve(model, scope)? {
        values.insert(
            model.var_name(var)?.to_string(),
            model.var_attr(var, attr)?,
        );
    }
    Ok(values)
}

/// Map of constraint name to the value of `attr` for every constraint in scope
pub fn get_constraints_attr(
    attr: &str,
    model: &Model,
    scope: Scope<'_, Constr>,
) -> Result<IndexMap<String, AttrValue>, InspectError> {
    let attr = parse_con_attr(attr)?;
    let mut values = IndexMap::new();
    for constr in resolve(model, scope)? {
        values.insert(
            model.constr_name(constr)?.to_string(),
            model.constr_attr(constr, attr)?,
        );
    }
    Ok(values)
}

/// Set `attr` to `value` for every variable in scope
///
/// The model is not updated. Returns the number of variables changed.
pub fn set_variables_attr(
    attr: &str,
    value: AttrValue,
    model: &mut Model,
    scope: Scope<'_, Var>,
) -> Result<usize, InspectError> {
    let attr = parse_var_attr(attr)?;
    let variables = resolve(model, scope)?;
    for var in &variables {
        model.set_var_attr(*var, attr, value.clone())?;
    }
    Ok(variables.len())
}

/// Set `attr` to `value` for every constraint in scope
///
/// The model is not updated. Returns the number of constraints changed.
pub fn set_constraints_attr(
    attr: &str,
    value: AttrValue,
    model: &mut Model,
    scope: Scope<'_, Constr>,
) -> Result<usize, InspectError> {
    let attr = parse_con_attr(attr)?;
    let constraints = resolve(model, scope)?;
    for constr in &constraints {
        model.set_constr_attr(*constr, attr, value.clone())?;
    }
    Ok(constraints.len())
}

/// Print `name, value` lines for a variable attribute, sorted by name
pub fn print_variables_attr(
    attr: &str,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<(), InspectError> {
    let values = get_variables_attr(attr, model, scope)?;
    println!("{}", report::format_sorted_pairs(&values));
    Ok(())
}

/// Print `name, value` lines for a constraint attribute, sorted by name
pub fn print_constraints_attr(
    attr: &str,
    model: &Model,
    scope: Scope<'_, Constr>,
) -> Result<(), InspectError> {
    let values = get_constraints_attr(attr, model, scope)?;
    println!("{}", report::format_sorted_pairs(&values));
    Ok(())
}

#[cfg(test)]
mod attrs_tests {
    use super::*;
    use crate::inspect::test_model::indexed_model;
    use crate::model::ModelError;

    #[test]
    fn attribute_lists() {
        assert_eq!(variable_attrs().len(), 25);
        assert_eq!(constraint_attrs()[1], "RHS");
        assert!(check_variable_attr("varhintval"));
        assert!(!check_variable_attr("rhs"));
        assert!(check_constraint_attr("SLACK"));
    }

    #[test]
    fn get_and_set() {
        let mut model = indexed_model();
        let changed = set_variables_attr("UB", AttrValue::Float(2.), &mut model, Scope::Set("x"))
            .unwrap();
        assert_eq!(changed, 6);
        let bounds = get_variables_attr("ub", &model, Scope::All).unwrap();
        assert_eq!(bounds["x[2,b]"], AttrValue::Float(2.));
        assert_eq!(bounds["y[1]"], AttrValue::Float(5.));

        set_constraints_attr("rhs", AttrValue::Int(7), &mut model, Scope::Set("cap")).unwrap();
        let rhs = get_constraints_attr("RHS", &model, Scope::All).unwrap();
        assert_eq!(rhs["cap(3)"], AttrValue::Float(7.));
        assert_eq!(rhs["link(a)"], AttrValue::Float(0.5));
    }

    #[test]
    fn invalid_attributes() {
        let mut model = indexed_model();
        assert!(matches!(
            get_variables_attr("", &model, Scope::All),
            Err(InspectError::MissingArgument(_))
        ));
        assert!(matches!(
            get_variables_attr("Pi", &model, Scope::All),
            Err(InspectError::Model(ModelError::UnknownAttribute { .. }))
        ));
        assert!(matches!(
            set_constraints_attr("Slack", AttrValue::Float(1.), &mut model, Scope::All),
            Err(InspectError::Model(ModelError::ReadOnlyAttribute { .. }))
        ));
    }

    #[test]
    fn empty_scope_is_not_an_error() {
        let model = indexed_model();
        let values = get_variables_attr("LB", &model, Scope::Set("nothing")).unwrap();
        assert!(values.is_empty());
    }
}
