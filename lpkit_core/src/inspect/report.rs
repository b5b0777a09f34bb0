//! Listing of the sets in a model, and plain text reports of inspection results
use std::collections::BTreeMap;
use std::fmt::Display;

use indexmap::IndexMap;

use crate::inspect::aggregate::sum_variables_by_index;
use crate::inspect::{Handle, InspectError, Scope};
use crate::model::constraint::Constr;
use crate::model::variable::Var;
use crate::model::Model;
use crate::naming::set_name;

fn list_sets<H: Handle>(model: &Model) -> Result<BTreeMap<String, usize>, InspectError> {
    let mut sets = BTreeMap::new();
    for handle in H::all(model) {
        let name = set_name(handle.name(model)?, H::KIND);
        *sets.entry(name.to_string()).or_insert(0) += 1;
    }
    Ok(sets)
}

/// Number of variables in each variable set, by set name
pub fn list_variables(model: &Model) -> Result<BTreeMap<String, usize>, InspectError> {
    list_sets::<Var>(model)
}

/// Number of constraints in each constraint set, by set name
pub fn list_constraints(model: &Model) -> Result<BTreeMap<String, usize>, InspectError> {
    list_sets::<Constr>(model)
}

/// Table of the variable sets, one `name, count` line per set under a header
///
/// # Examples
/// ```rust
/// use lpkit_core::inspect::format_variable_sets;
/// use lpkit_core::model::Model;
/// use lpkit_core::model::variable::VarType;
/// let mut model = Model::new("example");
/// for name in ["x[1]", "x[2]", "age[1]"] {
///     model.add_new_var(name, VarType::Continuous, 0., 1., 0.).unwrap();
/// }
/// model.update();
/// assert_eq!(
///     format_variable_sets(&model).unwrap(),
///     "Variable set, Number of variables\nage, 1\nx, 2"
/// );
/// ```
pub fn format_variable_sets(model: &Model) -> Result<String, InspectError> {
    let sets = list_variables(model)?;
    Ok(format!(
        "Variable set, Number of variables\n{}",
        format_dict(&sets)
    ))
}

/// Table of the constraint sets, one `name, count` line per set under a header
pub fn format_constraint_sets(model: &Model) -> Result<String, InspectError> {
    let sets = list_constraints(model)?;
    Ok(format!(
        "Constraint set, Number of constraints\n{}",
        format_dict(&sets)
    ))
}

pub fn print_variable_sets(model: &Model) -> Result<(), InspectError> {
    println!("{}", format_variable_sets(model)?);
    Ok(())
}

pub fn print_constraint_sets(model: &Model) -> Result<(), InspectError> {
    println!("{}", format_constraint_sets(model)?);
    Ok(())
}

/// One `key, value` line per entry
pub fn format_dict<K: Display, V: Display>(dict: &BTreeMap<K, V>) -> String {
    dict.iter()
        .map(|(key, value)| format!("{}, {}", key, value))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn print_dict<K: Display, V: Display>(dict: &BTreeMap<K, V>) {
    println!("{}", format_dict(dict));
}

/// Each outer key on its own line, preceded by a blank line, followed by its entries
pub fn format_two_indices_dict<K1: Display, K2: Display, V: Display>(
    dict: &BTreeMap<K1, BTreeMap<K2, V>>,
) -> String {
    dict.iter()
        .map(|(key, inner)| format!("\n{}\n{}", key, format_dict(inner)))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn print_two_indices_dict<K1: Display, K2: Display, V: Display>(
    dict: &BTreeMap<K1, BTreeMap<K2, V>>,
) {
    println!("{}", format_two_indices_dict(dict));
}

/// Print the solution values of the variables in scope summed by `index`
pub fn print_variables_sum_by_index(
    index: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<(), InspectError> {
    print_dict(&sum_variables_by_index(index, model, scope)?);
    Ok(())
}

/// `name, value` lines sorted by name
pub(crate) fn format_sorted_pairs<V: Display>(pairs: &IndexMap<String, V>) -> String {
    let mut lines: Vec<(&String, &V)> = pairs.iter().collect();
    lines.sort_by(|a, b| a.0.cmp(b.0));
    lines
        .into_iter()
        .map(|(name, value)| format!("{}, {}", name, value))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod report_tests {
    use super::*;
    use crate::inspect::test_model::indexed_model;
    use crate::naming::IndexValue;

    #[test]
    fn set_counts() {
        let model = indexed_model();
        let vars = list_variables(&model).unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars["x"], 6);
        assert_eq!(vars["total"], 1);
        let cons = list_constraints(&model).unwrap();
        assert_eq!(cons["cap"], 3);
        assert_eq!(
            format_constraint_sets(&model).unwrap(),
            "Constraint set, Number of constraints\ncap, 3\nlink, 1"
        );
    }

    #[test]
    fn dict_formats() {
        let mut inner = BTreeMap::new();
        inner.insert(IndexValue::from("b"), 2.5);
        inner.insert(IndexValue::from("a"), 1.);
        assert_eq!(format_dict(&inner), "a, 1\nb, 2.5");
        let mut outer = BTreeMap::new();
        outer.insert(IndexValue::Int(1), inner);
        assert_eq!(format_two_indices_dict(&outer), "\n1\na, 1\nb, 2.5");

        let mut pairs = IndexMap::new();
        pairs.insert("z".to_string(), 1);
        pairs.insert("a".to_string(), 2);
        assert_eq!(format_sorted_pairs(&pairs), "a, 2\nz, 1");
    }
}
