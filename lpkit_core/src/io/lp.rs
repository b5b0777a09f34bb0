//! Writing of models in the CPLEX LP text format
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::model::variable::VarType;
use crate::model::Model;
use crate::optimize::ObjectiveSense;

use super::IoError;

fn format_bound(bound: f64) -> String {
    if bound == f64::INFINITY {
        "+infinity".to_string()
    } else if bound == f64::NEG_INFINITY {
        "-infinity".to_string()
    } else {
        bound.to_string()
    }
}

/// Append ` + 2 x - y` style terms
fn write_terms<'a, I>(out: &mut String, terms: I) -> std::fmt::Result
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut first = true;
    for (name, coef) in terms {
        let sign = if coef < 0. {
            " -"
        } else if first {
            ""
        } else {
            " +"
        };
        let magnitude = coef.abs();
        if magnitude == 1. {
            write!(out, "{} {}", sign, name)?;
        } else {
            write!(out, "{} {} {}", sign, magnitude, name)?;
        }
        first = false;
    }
    if first {
        out.push_str(" 0");
    }
    Ok(())
}

/// Render the committed part of a model as LP text
pub fn to_lp_string(model: &Model) -> Result<String, IoError> {
    let mut out = String::new();
    writeln!(out, "\\ Model {}", model.name())?;
    out.push_str(match model.sense() {
        ObjectiveSense::Minimize => "Minimize\n",
        ObjectiveSense::Maximize => "Maximize\n",
    });
    out.push_str(" obj:");
    let mut objective = Vec::new();
    for var in model.vars() {
        let variable = model.var(var)?;
        if variable.objective != 0. {
            objective.push((variable.name.as_str(), variable.objective));
        }
    }
    write_terms(&mut out, objective)?;
    out.push_str("\nSubject To\n");
    for constr in model.constrs() {
        let constraint = model.constr(constr)?;
        write!(out, " {}:", constraint.name)?;
        let mut terms = Vec::with_capacity(constraint.terms.len());
        for (var, coef) in &constraint.terms {
            terms.push((model.var_name(*var)?, *coef));
        }
        write_terms(&mut out, terms)?;
        writeln!(out, " {} {}", constraint.sense.operator(), constraint.rhs)?;
    }

    let mut bounds = String::new();
    let mut general = Vec::new();
    let mut binary = Vec::new();
    for var in model.vars() {
        let variable = model.var(var)?;
        match variable.variable_type {
            VarType::Binary => {
                binary.push(variable.name.as_str());
                continue;
            }
            VarType::Integer => general.push(variable.name.as_str()),
            VarType::Continuous => {}
        }
        let (lb, ub) = (variable.lower_bound, variable.upper_bound);
        if lb == 0. && ub == f64::INFINITY {
            continue;
        }
        if lb == f64::NEG_INFINITY && ub == f64::INFINITY {
            writeln!(bounds, " {} free", variable.name)?;
        } else {
            writeln!(
                bounds,
                " {} <= {} <= {}",
                format_bound(lb),
                variable.name,
                format_bound(ub)
            )?;
        }
    }
    if !bounds.is_empty() {
        out.push_str("Bounds\n");
        out.push_str(&bounds);
    }
    if !general.is_empty() {
        writeln!(out, "General\n {}", general.join(" "))?;
    }
    if !binary.is_empty() {
        writeln!(out, "Binary\n {}", binary.join(" "))?;
    }
    out.push_str("End\n");
    Ok(out)
}

/// Write a model as an LP file
pub fn write_lp<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), IoError> {
    fs::write(path, to_lp_string(model)?)?;
    Ok(())
}

#[cfg(test)]
mod lp_tests {
    use super::*;
    use crate::model::constraint::Sense;
    use crate::model::expr::LinExpr;

    #[test]
    fn small_lp() {
        let mut model = Model::new("small");
        model.set_sense(ObjectiveSense::Maximize);
        let x = model
            .add_new_var("x[1]", VarType::Continuous, 0., f64::INFINITY, 1.)
            .unwrap();
        let y = model
            .add_new_var("y", VarType::Integer, 0., 4., -2.)
            .unwrap();
        let f = model
            .add_new_var("f", VarType::Continuous, f64::NEG_INFINITY, f64::INFINITY, 0.)
            .unwrap();
        model
            .add_constr(LinExpr::from(x) + y * 3. - f, Sense::LessEqual, 6., "c(1)")
            .unwrap();
        model.update();
        let lp = to_lp_string(&model).unwrap();
        let expected = "\\ Model small
Maximize
 obj: x[1] - 2 y
Subject To
 c(1): x[1] + 3 y - f <= 6
Bounds
 0 <= y <= 4
 f free
General
 y
End
";
        assert_eq!(lp, expected);
    }
}
