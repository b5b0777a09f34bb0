//! Provides struct for representing a linear constraint in a model
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::variable::{Var, UNDEFINED};
use crate::model::ModelError;

/// Handle to a constraint in a [`crate::model::Model`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constr(pub(crate) usize);

impl Constr {
    /// Position of the constraint in the order constraints were created
    pub fn id(&self) -> usize {
        self.0
    }
}

impl Display for Constr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Sense of a linear constraint
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    /// `terms <= rhs`
    #[serde(rename = "<")]
    LessEqual,
    /// `terms >= rhs`
    #[serde(rename = ">")]
    GreaterEqual,
    /// `terms = rhs`
    #[serde(rename = "=")]
    Equal,
}

impl Sense {
    /// Single character code, `<`, `>` or `=`
    pub fn code(&self) -> char {
        match self {
            Sense::LessEqual => '<',
            Sense::GreaterEqual => '>',
            Sense::Equal => '=',
        }
    }

    /// Operator as written in LP files
    pub fn operator(&self) -> &'static str {
        match self {
            Sense::LessEqual => "<=",
            Sense::GreaterEqual => ">=",
            Sense::Equal => "=",
        }
    }
}

impl FromStr for Sense {
    type Err = ModelError;

    /// Accepts `<`, `>`, `=` as well as `<=`, `=<`, `>=`, `=>` and `==`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" | "<=" | "=<" => Ok(Sense::LessEqual),
            ">" | ">=" | "=>" => Ok(Sense::GreaterEqual),
            "=" | "==" => Ok(Sense::Equal),
            other => Err(ModelError::InvalidSense(other.to_string())),
        }
    }
}

impl Display for Sense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Represents a linear constraint `terms sense rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name of the constraint, empty names are replaced by `R<id>` when added to a model
    pub name: String,
    /// Coefficients of the variables appearing in the constraint
    pub terms: IndexMap<Var, f64>,
    /// Sense of the constraint
    pub sense: Sense,
    /// Right hand side
    pub rhs: f64,
    /// Warm start basis status
    pub basis: Option<i64>,
    /// Warm start dual value
    pub dual_start: f64,
    /// Lazy constraint flag
    pub lazy: i64,
}

impl Constraint {
    /// Create a new constraint, merging repeated variables in `terms`
    pub fn new(name: &str, terms: &[(Var, f64)], sense: Sense, rhs: f64) -> Self {
        let mut merged: IndexMap<Var, f64> = IndexMap::new();
        for (var, coef) in terms {
            *merged.entry(*var).or_insert(0.) += coef;
        }
        Constraint {
            name: name.to_string(),
            terms: merged,
            sense,
            rhs,
            basis: None,
            dual_start: UNDEFINED,
            lazy: 0,
        }
    }

    /// Value of the left hand side given a lookup of variable values
    pub fn activity<F>(&self, value: F) -> f64
    where
        F: Fn(Var) -> f64,
    {
        self.terms.iter().map(|(var, coef)| coef * value(*var)).sum()
    }

    /// Drop a variable from the terms of the constraint
    pub(crate) fn remove_variable(&mut self, var: Var) {
        self.terms.shift_remove(&var);
    }

    /// Lower and upper bound on the left hand side
    pub(crate) fn row_bounds(&self) -> (f64, f64) {
        match self.sense {
            Sense::LessEqual => (f64::NEG_INFINITY, self.rhs),
            Sense::GreaterEqual => (self.rhs, f64::INFINITY),
            Sense::Equal => (self.rhs, self.rhs),
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .terms
            .iter()
            .map(|(var, coef)| format!("{}*{}", coef, var))
            .collect::<Vec<String>>()
            .join(" + ");
        write!(f, "{}: {} {} {}", self.name, terms, self.sense.operator(), self.rhs)
    }
}

#[cfg(test)]
mod constraint_tests {
    use super::*;

    #[test]
    fn sense_parsing() {
        assert_eq!("<".parse::<Sense>().unwrap(), Sense::LessEqual);
        assert_eq!(">=".parse::<Sense>().unwrap(), Sense::GreaterEqual);
        assert_eq!("==".parse::<Sense>().unwrap(), Sense::Equal);
        assert!(matches!(
            "!".parse::<Sense>(),
            Err(ModelError::InvalidSense(_))
        ));
    }

    #[test]
    fn terms_are_merged() {
        let constraint = Constraint::new(
            "c(1)",
            &[(Var(0), 1.), (Var(1), 2.), (Var(0), 3.)],
            Sense::LessEqual,
            4.,
        );
        assert_eq!(constraint.terms.len(), 2);
        assert_eq!(constraint.terms[&Var(0)], 4.);
        let activity = constraint.activity(|v| if v == Var(0) { 1. } else { 0.5 });
        assert!((activity - 5.).abs() < 1e-12);
    }
}
