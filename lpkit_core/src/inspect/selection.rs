//! Lookup of variables and constraints by set name and index values
use crate::inspect::{Handle, InspectError, Query};
use crate::model::constraint::Constr;
use crate::model::variable::Var;
use crate::model::Model;
use crate::naming::{matches_filter, set_name, IndexFilter};

/// Entities matched by a query
///
/// Without a name every entity is considered. The filter, when not empty, is applied to
/// whatever the name matched.
pub(crate) fn lookup<H: Handle>(model: &Model, query: &Query) -> Result<Vec<H>, InspectError> {
    let mut handles = Vec::new();
    for handle in H::all(model) {
        let name = handle.name(model)?;
        let keep = match &query.name {
            None => true,
            Some(wanted) => {
                let set = set_name(name, H::KIND);
                if query.approx {
                    set.contains(wanted.as_str())
                } else {
                    set == wanted
                }
            }
        };
        if keep {
            handles.push(handle);
        }
    }
    if query.filter.is_empty() || handles.is_empty() {
        return Ok(handles);
    }
    filter(model, &handles, &query.filter, query.exclude)
}

/// Split entities by whether they match the filter, keeping their order
pub(crate) fn filter<H: Handle>(
    model: &Model,
    handles: &[H],
    filter: &IndexFilter,
    exclude: bool,
) -> Result<Vec<H>, InspectError> {
    if handles.is_empty() {
        return Err(InspectError::MissingArgument("entities to filter"));
    }
    if filter.is_empty() {
        return Err(InspectError::MissingArgument("index filter"));
    }
    let mut kept = Vec::with_capacity(handles.len());
    for handle in handles {
        let matches = matches_filter(handle.name(model)?, H::KIND, filter);
        if matches != exclude {
            kept.push(*handle);
        }
    }
    Ok(kept)
}

fn lookup_multiple<H: Handle>(
    model: &Model,
    names: &[&str],
    approx: bool,
) -> Result<Vec<H>, InspectError> {
    let mut handles = Vec::new();
    for name in names {
        let query = Query {
            name: Some(name.to_string()),
            approx,
            ..Query::default()
        };
        handles.extend(lookup::<H>(model, &query)?);
    }
    Ok(handles)
}

/// Variables matched by a query
///
/// # Examples
/// ```rust
/// use lpkit_core::inspect::{get_variables, Query};
/// use lpkit_core::model::Model;
/// use lpkit_core::model::variable::VarType;
/// let mut model = Model::new("example");
/// model.add_new_var("x[1]", VarType::Continuous, 0., 1., 0.).unwrap();
/// model.add_new_var("x[2]", VarType::Continuous, 0., 1., 0.).unwrap();
/// model.add_new_var("xy[1]", VarType::Continuous, 0., 1., 0.).unwrap();
/// model.update();
/// assert_eq!(get_variables(&model, &Query::set("x")).unwrap().len(), 2);
/// ```
pub fn get_variables(model: &Model, query: &Query) -> Result<Vec<Var>, InspectError> {
    lookup(model, query)
}

/// Constraints matched by a query
pub fn get_constraints(model: &Model, query: &Query) -> Result<Vec<Constr>, InspectError> {
    lookup(model, query)
}

/// Variables of several sets, concatenated in the order of `names`
pub fn get_variables_multiple(
    model: &Model,
    names: &[&str],
    approx: bool,
) -> Result<Vec<Var>, InspectError> {
    lookup_multiple(model, names, approx)
}

/// Constraints of several sets, concatenated in the order of `names`
pub fn get_constraints_multiple(
    model: &Model,
    names: &[&str],
    approx: bool,
) -> Result<Vec<Constr>, InspectError> {
    lookup_multiple(model, names, approx)
}

/// Variables whose index values match every entry of `filter`, or, with `exclude`, the
/// variables which don't
///
/// # Errors
/// [`InspectError::MissingArgument`] if `variables` or `filter` is empty
pub fn filter_variables(
    model: &Model,
    variables: &[Var],
    filter_values: &IndexFilter,
    exclude: bool,
) -> Result<Vec<Var>, InspectError> {
    filter(model, variables, filter_values, exclude)
}

/// Constraints whose index values match every entry of `filter`, or, with `exclude`, the
/// constraints which don't
pub fn filter_constraints(
    model: &Model,
    constraints: &[Constr],
    filter_values: &IndexFilter,
    exclude: bool,
) -> Result<Vec<Constr>, InspectError> {
    filter(model, constraints, filter_values, exclude)
}

/// Variables of a set, filtered by index values
///
/// An unknown set gives an empty result.
pub fn get_variables_by_index_values(
    model: &Model,
    name: &str,
    filter_values: &IndexFilter,
    exclude: bool,
) -> Result<Vec<Var>, InspectError> {
    let variables = lookup(model, &Query::set(name))?;
    if variables.is_empty() {
        return Ok(variables);
    }
    filter(model, &variables, filter_values, exclude)
}

/// Constraints of a set, filtered by index values
pub fn get_constraints_by_index_values(
    model: &Model,
    name: &str,
    filter_values: &IndexFilter,
    exclude: bool,
) -> Result<Vec<Constr>, InspectError> {
    let constraints = lookup(model, &Query::set(name))?;
    if constraints.is_empty() {
        return Ok(constraints);
    }
    filter(model, &constraints, filter_values, exclude)
}

fn is_set<H: Handle>(model: &Model, name: &str) -> bool {
    H::all(model).into_iter().any(|handle| {
        handle
            .name(model)
            .map(|full| set_name(full, H::KIND) == name)
            .unwrap_or(false)
    })
}

/// Is `name` the name of a variable set in the model
pub fn is_variable_set(model: &Model, name: &str) -> bool {
    is_set::<Var>(model, name)
}

/// Is `name` the name of a constraint set in the model
pub fn is_constraint_set(model: &Model, name: &str) -> bool {
    is_set::<Constr>(model, name)
}

#[cfg(test)]
mod selection_tests {
    use super::*;
    use crate::inspect::test_model::indexed_model;
    use crate::inspect::QueryBuilder;
    use crate::naming::IndexValue;

    fn names(model: &Model, vars: &[Var]) -> Vec<String> {
        vars.iter()
            .map(|v| model.var_name(*v).unwrap().to_string())
            .collect()
    }

    #[test]
    fn exact_and_approximate_names() {
        let model = indexed_model();
        assert_eq!(get_variables(&model, &Query::set("x")).unwrap().len(), 6);
        assert!(get_variables(&model, &Query::set("t")).unwrap().is_empty());
        let query = QueryBuilder::default()
            .name("t")
            .approx(true)
            .build()
            .unwrap();
        let approx = get_variables(&model, &query).unwrap();
        assert_eq!(names(&model, &approx), vec!["total"]);
        assert_eq!(get_variables(&model, &Query::default()).unwrap().len(), 8);
        assert_eq!(get_constraints(&model, &Query::set("cap")).unwrap().len(), 3);
    }

    #[test]
    fn multiple_sets() {
        let model = indexed_model();
        let vars = get_variables_multiple(&model, &["y", "x"], false).unwrap();
        assert_eq!(vars.len(), 7);
        assert_eq!(model.var_name(vars[0]).unwrap(), "y[1]");
        let cons = get_constraints_multiple(&model, &["link", "cap"], false).unwrap();
        assert_eq!(cons.len(), 4);
    }

    #[test]
    fn filter_include_exclude_partition() {
        let model = indexed_model();
        let x = get_variables(&model, &Query::set("x")).unwrap();
        let mut filter_values = IndexFilter::new();
        filter_values.insert(1, IndexValue::from("a"));
        let included = filter_variables(&model, &x, &filter_values, false).unwrap();
        let excluded = filter_variables(&model, &x, &filter_values, true).unwrap();
        assert_eq!(names(&model, &included), vec!["x[1,a]", "x[2,a]", "x[3,a]"]);
        assert_eq!(included.len() + excluded.len(), x.len());
        assert!(included.iter().all(|v| !excluded.contains(v)));

        // every listed position has to match
        filter_values.insert(0, IndexValue::Int(2));
        let both = filter_variables(&model, &x, &filter_values, false).unwrap();
        assert_eq!(names(&model, &both), vec!["x[2,a]"]);
    }

    #[test]
    fn filter_requires_arguments() {
        let model = indexed_model();
        let x = get_variables(&model, &Query::set("x")).unwrap();
        assert!(matches!(
            filter_variables(&model, &x, &IndexFilter::new(), false),
            Err(InspectError::MissingArgument(_))
        ));
        let mut filter_values = IndexFilter::new();
        filter_values.insert(0, IndexValue::Int(1));
        assert!(matches!(
            filter_variables(&model, &[], &filter_values, false),
            Err(InspectError::MissingArgument(_))
        ));
    }

    #[test]
    fn constraints_by_index_values() {
        let model = indexed_model();
        let mut filter_values = IndexFilter::new();
        filter_values.insert(0, IndexValue::Int(3));
        let cons = get_constraints_by_index_values(&model, "cap", &filter_values, true).unwrap();
        let names: Vec<&str> = cons
            .iter()
            .map(|c| model.constr_name(*c).unwrap())
            .collect();
        assert_eq!(names, vec!["cap(1)", "cap(2)"]);
        let vars = get_variables_by_index_values(&model, "x", &filter_values, false).unwrap();
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn set_membership() {
        let model = indexed_model();
        assert!(is_variable_set(&model, "x"));
        assert!(!is_variable_set(&model, "cap"));
        assert!(is_constraint_set(&model, "cap"));
        assert!(!is_constraint_set(&model, "ca"));
    }
}
