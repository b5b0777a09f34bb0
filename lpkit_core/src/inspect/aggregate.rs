//! Grouping of entities, and sums of their values, by index value
//!
//! Keys of the returned maps are exactly the distinct index values found at the
//! requested position, sorted with integers before strings.
use std::collections::BTreeMap;

use crate::inspect::attrs::parse_var_attr;
use crate::inspect::{resolve, Handle, InspectError, Scope};
use crate::model::attributes::VarAttr;
use crate::model::constraint::Constr;
use crate::model::expr::LinExpr;
use crate::model::variable::Var;
use crate::model::{Model, ModelError};
use crate::naming::{index_value, IndexValue};

/// Variables grouped by the value at one index position
pub type IndexGroups<H> = BTreeMap<IndexValue, Vec<H>>;

/// Values summed by the value at one index position
pub type IndexSums = BTreeMap<IndexValue, f64>;

fn group_by_index<H: Handle>(
    model: &Model,
    handles: &[H],
    index: usize,
) -> Result<IndexGroups<H>, InspectError> {
    if handles.is_empty() {
        return Err(InspectError::NoEntities(H::KIND));
    }
    let mut groups: IndexGroups<H> = BTreeMap::new();
    for handle in handles {
        let name = handle.name(model)?;
        let value =
            index_value(name, H::KIND, index).ok_or_else(|| InspectError::IndexOutOfRange {
                name: name.to_string(),
                index,
            })?;
        groups.entry(value).or_default().push(*handle);
    }
    Ok(groups)
}

/// Variables in scope grouped by their value at index position `index`
///
/// # Errors
/// - [`InspectError::NoEntities`] if the scope is empty
/// - [`InspectError::IndexOutOfRange`] if a variable has fewer than `index + 1` indices
pub fn get_variables_by_index(
    index: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<IndexGroups<Var>, InspectError> {
    let variables = resolve(model, scope)?;
    group_by_index(model, &variables, index)
}

/// Constraints in scope grouped by their value at index position `index`
pub fn get_constraints_by_index(
    index: usize,
    model: &Model,
    scope: Scope<'_, Constr>,
) -> Result<IndexGroups<Constr>, InspectError> {
    let constraints = resolve(model, scope)?;
    group_by_index(model, &constraints, index)
}

/// Variables in scope grouped by `index1`, and within each group by `index2`
pub fn get_variables_by_two_indices(
    index1: usize,
    index2: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<BTreeMap<IndexValue, IndexGroups<Var>>, InspectError> {
    let outer = get_variables_by_index(index1, model, scope)?;
    let mut nested = BTreeMap::new();
    for (key, variables) in outer {
        nested.insert(key, group_by_index(model, &variables, index2)?);
    }
    Ok(nested)
}

fn sum_attr(model: &Model, variables: &[Var], attr: VarAttr) -> Result<f64, InspectError> {
    let mut total = 0.;
    for var in variables {
        total += model
            .var_attr(*var, attr)?
            .as_f64()
            .ok_or(ModelError::AttributeType {
                attr: attr.name(),
                expected: "numeric",
            })?;
    }
    Ok(total)
}

fn sum_groups(
    model: &Model,
    groups: IndexGroups<Var>,
    attr: VarAttr,
) -> Result<IndexSums, InspectError> {
    let mut sums = BTreeMap::new();
    for (key, variables) in groups {
        sums.insert(key, sum_attr(model, &variables, attr)?);
    }
    Ok(sums)
}

/// Solution values of the variables in scope, summed by their value at `index`
///
/// # Examples
/// ```rust
/// use lpkit_core::inspect::{sum_variables_by_index, Scope};
/// use lpkit_core::model::constraint::Sense;
/// use lpkit_core::model::Model;
/// use lpkit_core::model::variable::VarType;
/// use lpkit_core::naming::IndexValue;
/// use lpkit_core::optimize::ObjectiveSense;
/// let mut model = Model::new("example");
/// model.set_sense(ObjectiveSense::Maximize);
/// for (name, ub) in [("x[1,a]", 1.), ("x[1,b]", 2.), ("x[2,a]", 4.)] {
///     model.add_new_var(name, VarType::Continuous, 0., ub, 1.).unwrap();
/// }
/// model.optimize().unwrap();
/// let sums = sum_variables_by_index(1, &model, Scope::Set("x")).unwrap();
/// assert!((sums[&IndexValue::from("a")] - 5.).abs() < 1e-5);
/// assert!((sums[&IndexValue::from("b")] - 2.).abs() < 1e-5);
/// ```
pub fn sum_variables_by_index(
    index: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<IndexSums, InspectError> {
    sum_groups(model, get_variables_by_index(index, model, scope)?, VarAttr::X)
}

/// Any numeric attribute of the variables in scope, summed by their value at `index`
pub fn sum_variables_attr_by_index(
    attr: &str,
    index: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<IndexSums, InspectError> {
    let attr = parse_var_attr(attr)?;
    if !attr.numeric() {
        return Err(ModelError::AttributeType {
            attr: attr.name(),
            expected: "numeric",
        }
        .into());
    }
    sum_groups(model, get_variables_by_index(index, model, scope)?, attr)
}

/// Solution values summed by `index2` within each group of `index1`
pub fn sum_variables_by_two_indices(
    index1: usize,
    index2: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<BTreeMap<IndexValue, IndexSums>, InspectError> {
    let nested = get_variables_by_two_indices(index1, index2, model, scope)?;
    let mut sums = BTreeMap::new();
    for (key, groups) in nested {
        sums.insert(key, sum_groups(model, groups, VarAttr::X)?);
    }
    Ok(sums)
}

/// Sum of the variables in scope as a linear expression, by their value at `index`
pub fn get_linexp_by_index(
    index: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<BTreeMap<IndexValue, LinExpr>, InspectError> {
    Ok(get_variables_by_index(index, model, scope)?
        .into_iter()
        .map(|(key, variables)| (key, variables.into_iter().collect()))
        .collect())
}

#[cfg(test)]
mod aggregate_tests {
    use super::*;
    use crate::inspect::test_model::indexed_model;

    #[test]
    fn keys_are_observed_values() {
        let model = indexed_model();
        let groups = get_variables_by_index(1, &model, Scope::Set("x")).unwrap();
        let keys: Vec<IndexValue> = groups.keys().cloned().collect();
        assert_eq!(keys, vec![IndexValue::from("a"), IndexValue::from("b")]);
        assert_eq!(groups[&IndexValue::from("a")].len(), 3);

        let by_first = get_constraints_by_index(0, &model, Scope::All).unwrap();
        let keys: Vec<IndexValue> = by_first.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                IndexValue::Int(1),
                IndexValue::Int(2),
                IndexValue::Int(3),
                IndexValue::from("a")
            ]
        );
    }

    #[test]
    fn missing_index_and_empty_scope() {
        let model = indexed_model();
        assert!(matches!(
            get_variables_by_index(1, &model, Scope::Set("y")),
            Err(InspectError::IndexOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            get_variables_by_index(0, &model, Scope::Set("nothing")),
            Err(InspectError::NoEntities(_))
        ));
    }

    #[test]
    fn two_indices() {
        let model = indexed_model();
        let nested = get_variables_by_two_indices(0, 1, &model, Scope::Set("x")).unwrap();
        assert_eq!(nested.len(), 3);
        assert_eq!(nested[&IndexValue::Int(2)].len(), 2);
    }

    #[test]
    fn sums_of_solution_values() {
        let mut model = indexed_model();
        model.optimize().unwrap();
        let sums = sum_variables_by_index(0, &model, Scope::Set("x")).unwrap();
        for (key, expected) in [(1, 1.), (2, 2.), (3, 3.)] {
            assert!((sums[&IndexValue::Int(key)] - expected).abs() < 1e-5);
        }
        let nested = sum_variables_by_two_indices(1, 0, &model, Scope::Set("x")).unwrap();
        let total: f64 = nested.values().flat_map(|m| m.values()).sum();
        assert!((total - 6.).abs() < 1e-5);

        let upper = sum_variables_attr_by_index("UB", 1, &model, Scope::Set("x")).unwrap();
        assert_eq!(upper[&IndexValue::from("b")], 30.);
        assert!(sum_variables_attr_by_index("VarName", 1, &model, Scope::Set("x")).is_err());
    }

    #[test]
    fn linear_expressions() {
        let model = indexed_model();
        let exprs = get_linexp_by_index(1, &model, Scope::Set("x")).unwrap();
        assert_eq!(exprs[&IndexValue::from("b")].size(), 3);
    }
}
