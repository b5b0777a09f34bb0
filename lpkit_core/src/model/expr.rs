//! Linear expressions over model variables
use std::ops::{Add, AddAssign, Mul, Sub};

use crate::model::variable::Var;

/// A linear expression `sum(coefficient * variable) + constant`
///
/// Repeated variables are allowed, they are merged when the expression is turned into a
/// constraint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinExpr {
    pub terms: Vec<(Var, f64)>,
    pub constant: f64,
}

impl LinExpr {
    pub fn new() -> Self {
        LinExpr::default()
    }

    /// Add `coefficient * var` to the expression
    pub fn add_term(&mut self, var: Var, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    pub fn add_constant(&mut self, constant: f64) {
        self.constant += constant;
    }

    /// Number of terms, counting repeated variables separately
    pub fn size(&self) -> usize {
        self.terms.len()
    }

    /// Evaluate the expression given a lookup of variable values
    pub fn value<F>(&self, value: F) -> f64
    where
        F: Fn(Var) -> f64,
    {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coef)| coef * value(*var))
                .sum::<f64>()
    }
}

impl From<Var> for LinExpr {
    fn from(var: Var) -> Self {
        LinExpr {
            terms: vec![(var, 1.)],
            constant: 0.,
        }
    }
}

impl From<f64> for LinExpr {
    fn from(constant: f64) -> Self {
        LinExpr {
            terms: Vec::new(),
            constant,
        }
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> Self::Output {
        let rhs: LinExpr = rhs.into();
        self += rhs;
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(mut self, rhs: T) -> Self::Output {
        let rhs: LinExpr = rhs.into();
        self.terms
            .extend(rhs.terms.into_iter().map(|(var, coef)| (var, -coef)));
        self.constant -= rhs.constant;
        self
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self.terms.iter_mut().for_each(|(_, coef)| *coef *= rhs);
        self.constant *= rhs;
        self
    }
}

impl Mul<f64> for Var {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> Self::Output {
        LinExpr {
            terms: vec![(self, rhs)],
            constant: 0.,
        }
    }
}

impl AddAssign<LinExpr> for LinExpr {
    fn add_assign(&mut self, rhs: LinExpr) {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl AddAssign<Var> for LinExpr {
    fn add_assign(&mut self, rhs: Var) {
        self.add_term(rhs, 1.);
    }
}

impl FromIterator<Var> for LinExpr {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        LinExpr {
            terms: iter.into_iter().map(|var| (var, 1.)).collect(),
            constant: 0.,
        }
    }
}
